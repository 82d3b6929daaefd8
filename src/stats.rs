// Per-segment summaries in raw and projected spaces

use float_cmp::approx_eq;
use ndarray::{Array1, Array2, ArrayView, ArrayView1, ArrayView2, Axis, Dimension};
use serde::{Deserialize, Serialize};

use crate::basis::FittedBasis;
use crate::error::{DecorrelationError, Result};

/// Mean of each row, collapsing the window dimension.
pub fn row_means(matrix: ArrayView2<f64>) -> Result<Array1<f64>> {
    matrix
        .mean_axis(Axis(1))
        .ok_or_else(|| DecorrelationError::invalid_input("Cannot take row means of a matrix with zero columns"))
}

/// Row means shifted by `center`, putting projected rows back on the raw scale.
pub fn rebased_row_means(matrix: ArrayView2<f64>, center: f64) -> Result<Array1<f64>> {
    Ok(row_means(matrix)? + center)
}

/// Population standard deviation (ddof 0) of every element, whatever the shape.
pub fn std_dev<D: Dimension>(values: ArrayView<f64, D>) -> Result<f64> {
    if values.is_empty() {
        return Err(DecorrelationError::invalid_input(
            "Cannot take the standard deviation of an empty array",
        ));
    }
    Ok(values.std(0.0))
}

/// Sample covariance (n - 1 denominator) between the columns of `matrix`.
pub fn covariance(matrix: ArrayView2<f64>) -> Result<Array2<f64>> {
    let n_rows = matrix.nrows();
    if n_rows < 2 {
        return Err(DecorrelationError::insufficient_data(2, n_rows));
    }
    let column_means = matrix
        .mean_axis(Axis(0))
        .ok_or_else(|| DecorrelationError::invalid_input("Cannot take covariance of an empty matrix"))?;
    let centered = &matrix - &column_means;
    let mut cov = centered.t().dot(&centered);
    cov /= (n_rows - 1) as f64;
    Ok(cov)
}

/// Pearson correlation between the columns of `matrix`.
///
/// A column whose variance is negligible next to the largest column variance has no
/// defined correlation: its off-diagonal entries are 0 and its diagonal entry is 0.
/// Every other diagonal entry is 1. The test is relative, so rescaling the data
/// (counts to volts) leaves the result unchanged.
pub fn correlation_matrix(matrix: ArrayView2<f64>) -> Result<Array2<f64>> {
    let cov = covariance(matrix)?;
    let live = live_columns(&cov);
    let dims = cov.nrows();
    Ok(Array2::from_shape_fn((dims, dims), |(i, j)| {
        if !(live[i] && live[j]) {
            0.0
        } else if i == j {
            1.0
        } else {
            cov[[i, j]] / (cov[[i, i]] * cov[[j, j]]).sqrt()
        }
    }))
}

/// Average absolute Pearson correlation over all pairs of distinct columns.
///
/// Pairs involving a constant column are skipped. A single column, or a matrix whose
/// columns are all constant, scores 0.
pub fn mean_abs_off_diagonal_correlation(matrix: ArrayView2<f64>) -> Result<f64> {
    let corr = correlation_matrix(matrix)?;
    let live: Vec<usize> = (0..corr.nrows()).filter(|&i| corr[[i, i]] == 1.0).collect();
    let mut total = 0.0;
    let mut pairs = 0usize;
    for (k, &i) in live.iter().enumerate() {
        for &j in &live[k + 1..] {
            total += corr[[i, j]].abs();
            pairs += 1;
        }
    }
    Ok(if pairs == 0 { 0.0 } else { total / pairs as f64 })
}

fn live_columns(cov: &Array2<f64>) -> Vec<bool> {
    let diagonal = cov.diag();
    let max_variance = diagonal.iter().copied().fold(0.0f64, f64::max);
    let margin = f64::EPSILON * max_variance;
    diagonal
        .iter()
        .map(|&var| max_variance > 0.0 && !approx_eq!(f64, var, 0.0, epsilon = margin))
        .collect()
}

/// Fixed-width histogram over `[lo, hi]`; the last bin is closed on the right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub lo: f64,
    pub hi: f64,
    pub counts: Vec<usize>,
    /// Values below `lo`.
    pub underflow: usize,
    /// Values above `hi`.
    pub overflow: usize,
}

impl Histogram {
    pub fn from_values(values: ArrayView1<f64>, lo: f64, hi: f64, bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(DecorrelationError::invalid_config("Histogram needs at least one bin"));
        }
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(DecorrelationError::invalid_config(format!(
                "Histogram range [{}, {}] is not a finite increasing interval",
                lo, hi
            )));
        }
        let width = (hi - lo) / bins as f64;
        let mut counts = vec![0usize; bins];
        let mut underflow = 0;
        let mut overflow = 0;
        for &v in values.iter() {
            if v < lo {
                underflow += 1;
            } else if v > hi || v.is_nan() {
                overflow += 1;
            } else {
                let idx = (((v - lo) / width) as usize).min(bins - 1);
                counts[idx] += 1;
            }
        }
        Ok(Self { lo, hi, counts, underflow, overflow })
    }

    /// The `bins + 1` bin edges.
    pub fn edges(&self) -> Vec<f64> {
        let bins = self.counts.len();
        let width = (self.hi - self.lo) / bins as f64;
        (0..=bins).map(|i| self.lo + width * i as f64).collect()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum::<usize>() + self.underflow + self.overflow
    }

    /// Bin contents scaled so the in-range bins sum to 1. All zeros when no value fell in range.
    pub fn density(&self) -> Vec<f64> {
        let in_range: usize = self.counts.iter().sum();
        if in_range == 0 {
            return vec![0.0; self.counts.len()];
        }
        self.counts.iter().map(|&c| c as f64 / in_range as f64).collect()
    }

    /// Standard deviation of the binned values, each taken at its bin center.
    /// `None` when no value fell in range.
    pub fn rms(&self) -> Option<f64> {
        let in_range: usize = self.counts.iter().sum();
        if in_range == 0 {
            return None;
        }
        let width = (self.hi - self.lo) / self.counts.len() as f64;
        let centers = (0..self.counts.len()).map(|i| self.lo + width * (i as f64 + 0.5));
        let n = in_range as f64;
        let (sum, sum_sq) = centers
            .zip(self.counts.iter())
            .fold((0.0, 0.0), |(s, sq), (x, &c)| (s + x * c as f64, sq + x * x * c as f64));
        let mean = sum / n;
        Some((sum_sq / n - mean * mean).max(0.0).sqrt())
    }
}

/// Per-segment means and their spread in raw, training-projected and testing-projected space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecorrelationStatistics {
    /// Fitted center that projected means were re-based by.
    pub center: f64,
    pub raw_row_means: Array1<f64>,
    pub train_row_means: Array1<f64>,
    pub test_row_means: Array1<f64>,
    pub raw_std: f64,
    pub train_std: f64,
    pub test_std: f64,
}

impl DecorrelationStatistics {
    pub fn compute(
        raw: ArrayView2<f64>,
        train_projected: ArrayView2<f64>,
        test_projected: ArrayView2<f64>,
        basis: &FittedBasis,
    ) -> Result<Self> {
        let center = basis.center();
        let raw_row_means = row_means(raw)?;
        let train_row_means = rebased_row_means(train_projected, center)?;
        let test_row_means = rebased_row_means(test_projected, center)?;
        Ok(Self {
            center,
            raw_std: std_dev(raw_row_means.view())?,
            train_std: std_dev(train_row_means.view())?,
            test_std: std_dev(test_row_means.view())?,
            raw_row_means,
            train_row_means,
            test_row_means,
        })
    }
}
