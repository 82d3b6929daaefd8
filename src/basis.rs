// Windowed principal component basis

use log::{debug, info};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{DecorrelationError, Result};
use crate::linalg_backends::{BackendEigh, LinAlgBackendProvider};
use crate::stats::covariance;

/// A basis learned from training rows.
///
/// Holds the scalar center, the D×D component matrix (one unit eigenvector of the
/// training covariance per row, sorted by descending eigenvalue), the eigenvalues,
/// and the explained-variance ratios. Values are fixed once constructed.
///
/// Eigenvector signs are arbitrary and may differ between backends. Components whose
/// eigenvalues tie exactly keep the order the eigensolver produced them in.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedBasis {
    center: f64,
    components: Array2<f64>,
    eigenvalues: Array1<f64>,
    explained_variance_ratio: Array1<f64>,
}

impl FittedBasis {
    /// Fits a basis using the backend selected at compile time.
    pub fn fit(train: ArrayView2<f64>) -> Result<Self> {
        Self::fit_with_backend(train, &LinAlgBackendProvider::new())
    }

    /// Fits a basis to `train`, shape (n_rows, D).
    ///
    /// The center is the mean of every entry, a single value rather than a per-column
    /// mean. The covariance of the centered rows is eigendecomposed and all D
    /// components are kept, so projection is an exact change of basis.
    ///
    /// # Errors
    /// - `InvalidInput` if `train` has no columns or contains NaN/infinite entries.
    /// - `RankDeficient` if there are fewer rows than dimensions (or fewer than two rows),
    ///   or if the training data has no variance at all.
    /// - `Linalg` if the eigendecomposition fails.
    pub fn fit_with_backend<B: BackendEigh>(train: ArrayView2<f64>, backend: &B) -> Result<Self> {
        let (n_rows, dims) = train.dim();
        if dims == 0 {
            return Err(DecorrelationError::invalid_input("Training matrix has zero columns"));
        }
        if n_rows < dims.max(2) {
            return Err(DecorrelationError::rank_deficient(
                n_rows,
                dims,
                "fewer training rows than dimensions",
            ));
        }
        if train.iter().any(|v| !v.is_finite()) {
            return Err(DecorrelationError::invalid_input(
                "Training matrix contains non-finite (NaN or infinity) values",
            ));
        }

        let center = train
            .mean()
            .ok_or_else(|| DecorrelationError::invalid_input("Failed to compute training mean"))?;
        let centered = train.mapv(|v| v - center);
        let cov_matrix = covariance(centered.view())?;
        debug!("Covariance of {}x{} training rows computed (center={})", n_rows, dims, center);

        let eigh = backend
            .eigh_upper(&cov_matrix)
            .map_err(|e| DecorrelationError::linalg(format!("Eigen decomposition of covariance matrix failed: {}", e)))?;

        let mut eig_pairs: Vec<(f64, ArrayView1<f64>)> = eigh
            .eigenvalues
            .iter()
            .copied()
            .zip(eigh.eigenvectors.columns())
            .collect();
        // Stable sort: exact ties keep the solver's order.
        eig_pairs.sort_by(|(a, _), (b, _)| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

        let mut components = Array2::<f64>::zeros((dims, dims));
        let mut eigenvalues = Array1::<f64>::zeros(dims);
        for (i, (eig_val, eig_vec)) in eig_pairs.into_iter().enumerate() {
            // Round-off can push null directions slightly negative.
            eigenvalues[i] = eig_val.max(0.0);
            let norm = eig_vec.dot(&eig_vec).sqrt();
            if norm <= 1e-12 {
                return Err(DecorrelationError::linalg(format!(
                    "Eigensolver returned a null eigenvector for component {}",
                    i
                )));
            }
            components.row_mut(i).assign(&eig_vec.mapv(|x| x / norm));
        }

        let total_variance = eigenvalues.sum();
        // Relative to the centered values, so a constant offset cannot change the outcome.
        let centered_mean_square = centered.iter().map(|v| v * v).sum::<f64>() / (n_rows * dims) as f64;
        if !(total_variance > 1e-12 * centered_mean_square) {
            return Err(DecorrelationError::rank_deficient(
                n_rows,
                dims,
                "training rows have no variance",
            ));
        }
        let explained_variance_ratio = &eigenvalues / total_variance;

        info!(
            "Fitted {}-dimensional basis on {} rows; leading component explains {:.4} of the variance",
            dims, n_rows, explained_variance_ratio[0]
        );

        Ok(Self {
            center,
            components,
            eigenvalues,
            explained_variance_ratio,
        })
    }

    /// The scalar center subtracted from every entry before projection.
    pub fn center(&self) -> f64 {
        self.center
    }

    /// The center broadcast to one value per column.
    pub fn center_vector(&self) -> Array1<f64> {
        Array1::from_elem(self.n_features(), self.center)
    }

    /// Component matrix, shape (D, D); row `i` is the i-th component.
    pub fn components(&self) -> &Array2<f64> {
        &self.components
    }

    /// Variance along each component, largest first.
    pub fn eigenvalues(&self) -> &Array1<f64> {
        &self.eigenvalues
    }

    /// Fraction of the total variance along each component. Non-increasing, sums to 1.
    pub fn explained_variance_ratio(&self) -> &Array1<f64> {
        &self.explained_variance_ratio
    }

    /// Window width D the basis was fitted with.
    pub fn n_features(&self) -> usize {
        self.components.ncols()
    }

    /// Running sum of [`explained_variance_ratio`](Self::explained_variance_ratio).
    pub fn cumulative_explained_variance(&self) -> Array1<f64> {
        let mut cumulative = self.explained_variance_ratio.clone();
        cumulative.accumulate_axis_inplace(Axis(0), |&prev, curr| *curr += prev);
        cumulative
    }

    /// Smallest number of leading components whose combined ratio reaches `threshold`.
    pub fn components_for_variance(&self, threshold: f64) -> Result<usize> {
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(DecorrelationError::invalid_input(format!(
                "Variance threshold must lie in (0, 1], got {}",
                threshold
            )));
        }
        let cumulative = self.cumulative_explained_variance();
        let reached = cumulative
            .iter()
            .position(|&c| c >= threshold - 1e-12)
            .unwrap_or(cumulative.len() - 1);
        Ok(reached + 1)
    }

    /// The first `k` component rows.
    pub fn leading_components(&self, k: usize) -> Result<ArrayView2<'_, f64>> {
        if k > self.n_features() {
            return Err(DecorrelationError::invalid_input(format!(
                "Requested {} components from a {}-dimensional basis",
                k,
                self.n_features()
            )));
        }
        Ok(self.components.slice(s![..k, ..]))
    }

    /// Projects rows onto the basis: `(matrix - center) · componentsᵀ`.
    pub fn transform(&self, matrix: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.check_columns(matrix.ncols())?;
        let centered = matrix.mapv(|v| v - self.center);
        Ok(centered.dot(&self.components.t()))
    }

    /// Maps projected rows back: `projected · components + center`.
    pub fn inverse_transform(&self, projected: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.check_columns(projected.ncols())?;
        Ok(projected.dot(&self.components) + self.center)
    }

    fn check_columns(&self, actual: usize) -> Result<()> {
        if actual != self.n_features() {
            return Err(DecorrelationError::dimension_mismatch(self.n_features(), actual));
        }
        Ok(())
    }
}

/// Lifecycle of the basis: `Unfitted` until a successful [`fit`](BasisEngine::fit).
///
/// Fitting is one-way. To learn a new basis, build a new engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum BasisEngine {
    #[default]
    Unfitted,
    Fitted(FittedBasis),
}

impl BasisEngine {
    /// Creates an unfitted engine.
    ///
    /// ```
    /// use window_pca::BasisEngine;
    /// let engine = BasisEngine::new();
    /// assert!(!engine.is_fitted());
    /// ```
    pub fn new() -> Self {
        Self::Unfitted
    }

    pub fn is_fitted(&self) -> bool {
        matches!(self, Self::Fitted(_))
    }

    /// Fits the engine on training rows.
    ///
    /// On error the engine stays `Unfitted`; no partial model is kept.
    ///
    /// # Errors
    /// `InvalidState` if already fitted, plus every error of [`FittedBasis::fit`].
    pub fn fit(&mut self, train: ArrayView2<f64>) -> Result<()> {
        self.fit_with_backend(train, &LinAlgBackendProvider::new())
    }

    pub fn fit_with_backend<B: BackendEigh>(&mut self, train: ArrayView2<f64>, backend: &B) -> Result<()> {
        if self.is_fitted() {
            return Err(DecorrelationError::InvalidState(
                "basis is already fitted; construct a new engine to refit",
            ));
        }
        let fitted = FittedBasis::fit_with_backend(train, backend)?;
        *self = Self::Fitted(fitted);
        Ok(())
    }

    /// The fitted model, or `InvalidState` before `fit`.
    pub fn fitted(&self) -> Result<&FittedBasis> {
        match self {
            Self::Fitted(basis) => Ok(basis),
            Self::Unfitted => Err(DecorrelationError::InvalidState(
                "basis is not fitted; call fit first",
            )),
        }
    }

    pub fn transform(&self, matrix: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.fitted()?.transform(matrix)
    }

    pub fn inverse_transform(&self, projected: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.fitted()?.inverse_transform(projected)
    }

    pub fn explained_variance_ratio(&self) -> Result<&Array1<f64>> {
        Ok(self.fitted()?.explained_variance_ratio())
    }

    pub fn center(&self) -> Result<f64> {
        Ok(self.fitted()?.center())
    }

    pub fn components(&self) -> Result<&Array2<f64>> {
        Ok(self.fitted()?.components())
    }

    pub fn eigenvalues(&self) -> Result<&Array1<f64>> {
        Ok(self.fitted()?.eigenvalues())
    }
}

impl From<FittedBasis> for BasisEngine {
    fn from(basis: FittedBasis) -> Self {
        Self::Fitted(basis)
    }
}
