// Windowed principal component decorrelation

#![doc = include_str!("../README.md")]

pub mod basis;
pub mod config;
pub mod error;
pub mod linalg_backends;
pub mod partition;
pub mod pipeline;
pub mod segment;
pub mod stats;
pub mod synthetic;


pub use basis::{BasisEngine, FittedBasis};
pub use config::{DecorrelationConfig, PartitionRule};
pub use error::{DecorrelationError, Result};
pub use partition::{split, split_stream, split_with_rule, Partition, SplitBounds};
pub use pipeline::{decorrelate, DecorrelationReport, StageTimings};
pub use segment::{discarded_tail, segment, segment_capped};
pub use stats::{
    correlation_matrix, covariance, mean_abs_off_diagonal_correlation, rebased_row_means, row_means,
    std_dev, DecorrelationStatistics, Histogram,
};
