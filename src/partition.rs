// Positional training/testing split

use log::{debug, warn};
use ndarray::{s, Array2, ArrayView2};

use crate::config::{validate_train_fraction, PartitionRule};
use crate::error::{DecorrelationError, Result};

/// Training rows followed, in stream order, by testing rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<T> {
    pub train: T,
    pub test: T,
}

/// Row ranges selected by a split: `[0, n_train)` and `[test_start, n_total)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitBounds {
    pub n_train: usize,
    pub test_start: usize,
    pub n_total: usize,
}

impl SplitBounds {
    /// Computes the split of `n_total` rows at fraction `train_fraction`.
    pub fn compute(n_total: usize, train_fraction: f64, rule: PartitionRule) -> Result<Self> {
        validate_train_fraction(train_fraction)?;
        let (n_train, test_start) = match rule {
            PartitionRule::Reference => (
                ((n_total + 1) as f64 * train_fraction).floor() as usize,
                (n_total as f64 * train_fraction + 1.0).floor() as usize,
            ),
            PartitionRule::Contiguous => {
                let cut = (n_total as f64 * train_fraction).floor() as usize;
                (cut, cut)
            }
        };
        let bounds = Self {
            n_train: n_train.min(n_total),
            test_start: test_start.min(n_total),
            n_total,
        };
        if bounds.n_train == 0 || bounds.n_test() == 0 {
            return Err(DecorrelationError::empty_partition(
                bounds.n_train,
                bounds.n_test(),
            ));
        }
        Ok(bounds)
    }

    pub fn n_test(&self) -> usize {
        self.n_total - self.test_start
    }

    /// Rows that belong to neither side.
    pub fn n_excluded(&self) -> usize {
        self.test_start.saturating_sub(self.n_train)
    }
}

/// Splits segment rows with the default [`PartitionRule::Reference`] rule.
///
/// A 5-row matrix split at 0.5 yields 3 training rows and 2 testing rows; a 4-row
/// matrix yields 2 and 1, with row 2 excluded from both.
///
/// # Errors
/// `InvalidConfig` for a fraction outside (0, 1), `EmptyPartition` if either side is empty.
pub fn split(matrix: ArrayView2<f64>, train_fraction: f64) -> Result<Partition<Array2<f64>>> {
    split_with_rule(matrix, train_fraction, PartitionRule::Reference)
}

pub fn split_with_rule(
    matrix: ArrayView2<f64>,
    train_fraction: f64,
    rule: PartitionRule,
) -> Result<Partition<Array2<f64>>> {
    let bounds = SplitBounds::compute(matrix.nrows(), train_fraction, rule)?;
    log_bounds(&bounds, "rows");
    Ok(Partition {
        train: matrix.slice(s![..bounds.n_train, ..]).to_owned(),
        test: matrix.slice(s![bounds.test_start.., ..]).to_owned(),
    })
}

/// Applies the same split rule to the flat sample stream.
pub fn split_stream(
    stream: &[f64],
    train_fraction: f64,
    rule: PartitionRule,
) -> Result<Partition<Vec<f64>>> {
    let bounds = SplitBounds::compute(stream.len(), train_fraction, rule)?;
    log_bounds(&bounds, "samples");
    Ok(Partition {
        train: stream[..bounds.n_train].to_vec(),
        test: stream[bounds.test_start..].to_vec(),
    })
}

fn log_bounds(bounds: &SplitBounds, unit: &str) {
    debug!(
        "Split {} {}: {} training, {} testing",
        bounds.n_total,
        unit,
        bounds.n_train,
        bounds.n_test()
    );
    if bounds.n_excluded() > 0 {
        warn!(
            "{} boundary {} excluded from both partitions",
            bounds.n_excluded(),
            unit
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn rows(n: usize) -> Array2<f64> {
        Array2::from_shape_fn((n, 2), |(i, j)| (i * 2 + j) as f64)
    }

    #[test]
    fn test_five_rows_at_half() {
        let m = rows(5);
        let p = split(m.view(), 0.5).unwrap();
        assert_eq!(p.train.nrows(), 3);
        assert_eq!(p.test.nrows(), 2);
        assert_eq!(p.train.row(2), m.row(2));
        assert_eq!(p.test.row(0), m.row(3));
    }

    #[test]
    fn test_even_rows_drop_the_boundary_row() {
        let m = rows(4);
        let p = split(m.view(), 0.5).unwrap();
        assert_eq!(p.train.nrows(), 2);
        assert_eq!(p.test.nrows(), 1);
        assert_eq!(p.test.row(0), m.row(3));
        let bounds = SplitBounds::compute(4, 0.5, PartitionRule::Reference).unwrap();
        assert_eq!(bounds.n_excluded(), 1);
    }

    #[test]
    fn test_contiguous_rule_keeps_every_row() {
        let m = rows(4);
        let p = split_with_rule(m.view(), 0.5, PartitionRule::Contiguous).unwrap();
        assert_eq!(p.train.nrows() + p.test.nrows(), 4);
        assert_eq!(p.test.row(0), m.row(2));
    }

    #[test]
    fn test_training_precedes_testing() {
        let m = rows(11);
        let p = split(m.view(), 0.3).unwrap();
        let last_train = p.train[[p.train.nrows() - 1, 0]];
        let first_test = p.test[[0, 0]];
        assert!(last_train < first_test);
    }

    #[test]
    fn test_empty_partitions_rejected() {
        // floor(3 * 0.5) = 1 training row, test starts at floor(2) = 2 -> empty.
        assert!(matches!(
            split(rows(2).view(), 0.5),
            Err(DecorrelationError::EmptyPartition { .. })
        ));
        assert!(matches!(
            split(rows(1).view(), 0.5),
            Err(DecorrelationError::EmptyPartition { .. })
        ));
        assert!(matches!(
            split_with_rule(rows(3).view(), 0.1, PartitionRule::Contiguous),
            Err(DecorrelationError::EmptyPartition { train_rows: 0, .. })
        ));
    }

    #[test]
    fn test_fraction_out_of_range() {
        assert!(matches!(
            split(rows(10).view(), 1.0),
            Err(DecorrelationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_stream_split_uses_the_same_rule() {
        let stream: Vec<f64> = (0..10).map(|v| v as f64).collect();
        let p = split_stream(&stream, 0.5, PartitionRule::Reference).unwrap();
        assert_eq!(p.train, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(p.test, vec![6.0, 7.0, 8.0, 9.0]);
    }
}
