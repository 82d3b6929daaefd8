// End-to-end decorrelation: segment, split, fit, project, summarize

use std::time::{Duration, Instant};

use log::{debug, info};
use ndarray::{s, Array2, ArrayView2};

use crate::basis::FittedBasis;
use crate::config::DecorrelationConfig;
use crate::error::Result;
use crate::partition::SplitBounds;
use crate::segment::segment_capped;
use crate::stats::{correlation_matrix, mean_abs_off_diagonal_correlation, DecorrelationStatistics};

/// Wall-clock time spent in each stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTimings {
    pub segment: Duration,
    pub split: Duration,
    pub fit: Duration,
    pub transform: Duration,
    pub statistics: Duration,
}

/// Everything a run produces, for callers that report, plot, or persist it.
#[derive(Debug, Clone)]
pub struct DecorrelationReport {
    pub config: DecorrelationConfig,
    /// Samples that ended up in a window.
    pub samples_used: usize,
    /// Samples ignored because of the cap or an incomplete final window.
    pub samples_discarded: usize,
    /// Raw segment matrix, (rows, window_width).
    pub segments: Array2<f64>,
    pub split: SplitBounds,
    pub basis: FittedBasis,
    pub train_projected: Array2<f64>,
    pub test_projected: Array2<f64>,
    pub statistics: DecorrelationStatistics,
    pub timings: StageTimings,
}

impl DecorrelationReport {
    pub fn raw_train(&self) -> ArrayView2<'_, f64> {
        self.segments.slice(s![..self.split.n_train, ..])
    }

    pub fn raw_test(&self) -> ArrayView2<'_, f64> {
        self.segments.slice(s![self.split.test_start.., ..])
    }

    /// Mean absolute off-diagonal correlation of the testing rows, before and after projection.
    ///
    /// Needs at least two testing rows.
    pub fn test_correlation(&self) -> Result<(f64, f64)> {
        Ok((
            mean_abs_off_diagonal_correlation(self.raw_test())?,
            mean_abs_off_diagonal_correlation(self.test_projected.view())?,
        ))
    }

    /// Column correlation matrices of the testing rows, before and after projection.
    pub fn test_correlation_matrices(&self) -> Result<(Array2<f64>, Array2<f64>)> {
        Ok((
            correlation_matrix(self.raw_test())?,
            correlation_matrix(self.test_projected.view())?,
        ))
    }
}

/// Runs the whole pipeline on `stream` with `config`.
///
/// The basis is fitted on the training rows only and then applied to both partitions.
///
/// # Errors
/// Any configuration, segmentation, partition or fitting error, unchanged.
pub fn decorrelate(stream: &[f64], config: &DecorrelationConfig) -> Result<DecorrelationReport> {
    config.validate()?;
    let mut timings = StageTimings::default();

    info!("Segmenting {} samples into windows of {}", stream.len(), config.window_width);
    let t0 = Instant::now();
    let segments = segment_capped(stream, config.window_width, config.max_samples)?;
    timings.segment = t0.elapsed();
    info!(
        "Segmented in {:?}: {} windows of {} samples",
        timings.segment,
        segments.nrows(),
        segments.ncols()
    );

    info!(
        "Splitting into training ({:.0}%) and testing ({:.0}%) rows",
        config.train_fraction * 100.0,
        (1.0 - config.train_fraction) * 100.0
    );
    let t1 = Instant::now();
    let split = SplitBounds::compute(segments.nrows(), config.train_fraction, config.partition_rule)?;
    let train = segments.slice(s![..split.n_train, ..]);
    let test = segments.slice(s![split.test_start.., ..]);
    timings.split = t1.elapsed();
    debug!(
        "Split in {:?}: {} training rows, {} testing rows, {} excluded",
        timings.split,
        split.n_train,
        split.n_test(),
        split.n_excluded()
    );

    info!("Fitting basis on training rows");
    let t2 = Instant::now();
    let basis = FittedBasis::fit(train)?;
    timings.fit = t2.elapsed();
    info!("Fitted in {:?}", timings.fit);

    let t3 = Instant::now();
    let train_projected = basis.transform(train)?;
    let test_projected = basis.transform(test)?;
    timings.transform = t3.elapsed();
    info!("Projected both partitions in {:?}", timings.transform);

    let t4 = Instant::now();
    let statistics = DecorrelationStatistics::compute(
        segments.view(),
        train_projected.view(),
        test_projected.view(),
        &basis,
    )?;
    timings.statistics = t4.elapsed();
    debug!(
        "Row-mean spread: raw {:.4}, training {:.4}, testing {:.4}",
        statistics.raw_std, statistics.train_std, statistics.test_std
    );

    let samples_used = segments.len();
    Ok(DecorrelationReport {
        config: config.clone(),
        samples_used,
        samples_discarded: stream.len() - samples_used,
        segments,
        split,
        basis,
        train_projected,
        test_projected,
        statistics,
        timings,
    })
}
