// Error types for stream decorrelation

use thiserror::Error;

/// Every failure the segmenting, partitioning, fitting and projection steps can report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecorrelationError {
    /// Fewer samples than one window.
    #[error("Insufficient data: need at least {needed} samples, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// A training/testing split left one side without rows.
    #[error("Empty partition: {train_rows} training rows, {test_rows} testing rows")]
    EmptyPartition { train_rows: usize, test_rows: usize },

    /// The training rows cannot support a full D-dimensional basis.
    #[error("Rank deficient training data ({rows} rows, {dims} dimensions): {reason}")]
    RankDeficient {
        rows: usize,
        dims: usize,
        reason: String,
    },

    /// Column count differs from the fitted dimension.
    #[error("Dimension mismatch: basis was fitted with {expected} columns, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Operation called in the wrong lifecycle state.
    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The eigensolver backend failed.
    #[error("Linear algebra error: {0}")]
    Linalg(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DecorrelationError>;

impl DecorrelationError {
    #[must_use]
    pub const fn insufficient_data(needed: usize, available: usize) -> Self {
        Self::InsufficientData { needed, available }
    }

    #[must_use]
    pub const fn empty_partition(train_rows: usize, test_rows: usize) -> Self {
        Self::EmptyPartition {
            train_rows,
            test_rows,
        }
    }

    #[must_use]
    pub fn rank_deficient(rows: usize, dims: usize, reason: impl Into<String>) -> Self {
        Self::RankDeficient {
            rows,
            dims,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    #[must_use]
    pub fn linalg(msg: impl Into<String>) -> Self {
        Self::Linalg(msg.into())
    }
}
