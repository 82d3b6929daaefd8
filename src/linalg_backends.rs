// src/linalg_backends.rs

use ndarray::{Array1, Array2};
use ndarray_linalg::{Eigh as NdLinalgEigh, UPLO};
use std::error::Error;

/// Error type crossing the backend boundary.
pub type BackendError = Box<dyn Error + Send + Sync>;

/// Output of a symmetric eigendecomposition.
#[derive(Debug)]
pub struct EighOutput {
    /// Eigenvalues, in whatever order the backend produces them (LAPACK: ascending).
    pub eigenvalues: Array1<f64>,
    /// Eigenvectors as columns of the matrix.
    /// eigenvectors.column(i) corresponds to eigenvalues[i].
    pub eigenvectors: Array2<f64>,
}

/// Symmetric eigendecomposition reading the upper triangle of `matrix`.
pub trait BackendEigh {
    fn eigh_upper(&self, matrix: &Array2<f64>) -> Result<EighOutput, BackendError>;
}

/// LAPACK through ndarray-linalg.
#[derive(Debug, Default, Copy, Clone)]
pub struct NdarrayLinAlgBackend;

impl BackendEigh for NdarrayLinAlgBackend {
    fn eigh_upper(&self, matrix: &Array2<f64>) -> Result<EighOutput, BackendError> {
        let (eigenvalues, eigenvectors) = matrix.eigh(UPLO::Upper).map_err(|e| Box::new(e) as BackendError)?;
        Ok(EighOutput { eigenvalues, eigenvectors })
    }
}

#[cfg(feature = "backend_faer")]
mod faer_specific_code {
    use super::{BackendEigh, BackendError, EighOutput};
    use ndarray::{Array1, Array2};

    fn to_dyn_error_faer(msg: String) -> BackendError {
        Box::new(std::io::Error::new(std::io::ErrorKind::Other, msg))
    }

    #[derive(Debug, Default, Copy, Clone)]
    pub struct FaerLinAlgBackend;

    impl BackendEigh for FaerLinAlgBackend {
        fn eigh_upper(&self, matrix: &Array2<f64>) -> Result<EighOutput, BackendError> {
            let (nrows, ncols) = matrix.dim();
            if nrows != ncols {
                return Err(to_dyn_error_faer(format!(
                    "Matrix must be square for eigendecomposition, got {}x{}",
                    nrows, ncols
                )));
            }
            if matrix.is_empty() {
                return Ok(EighOutput { eigenvalues: Array1::zeros(0), eigenvectors: Array2::zeros((0, 0)) });
            }
            // faer needs contiguous memory; covariance matrices are built in standard layout,
            // anything else is copied first.
            let contiguous = matrix.as_standard_layout();
            let slice = contiguous
                .as_slice()
                .ok_or_else(|| to_dyn_error_faer("Covariance matrix is not contiguous".to_string()))?;
            let faer_view = faer::MatRef::from_row_major_slice(slice, nrows, ncols);

            let eig = faer_view
                .self_adjoint_eigen(faer::Side::Upper)
                .map_err(|e| to_dyn_error_faer(format!("faer eigendecomposition failed: {:?}", e)))?;
            let values = eig.S().column_vector();
            let vectors = eig.U();

            let eigenvalues = Array1::from_shape_fn(nrows, |i| values[i]);
            let eigenvectors = Array2::from_shape_fn((nrows, nrows), |(i, j)| vectors[(i, j)]);
            Ok(EighOutput { eigenvalues, eigenvectors })
        }
    }
}

/// Dispatches to the backend selected by compile-time features.
#[derive(Debug, Default, Copy, Clone)]
pub struct LinAlgBackendProvider;

impl LinAlgBackendProvider {
    pub fn new() -> Self {
        Self
    }
}

impl BackendEigh for LinAlgBackendProvider {
    fn eigh_upper(&self, matrix: &Array2<f64>) -> Result<EighOutput, BackendError> {
        #[cfg(feature = "backend_faer")]
        {
            faer_specific_code::FaerLinAlgBackend.eigh_upper(matrix)
        }
        #[cfg(not(feature = "backend_faer"))]
        {
            NdarrayLinAlgBackend.eigh_upper(matrix)
        }
    }
}
