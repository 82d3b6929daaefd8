// Stream segmentation

use log::{debug, warn};
use ndarray::{Array2, ArrayView1};

use crate::config::validate_window_width;
use crate::error::{DecorrelationError, Result};

/// Reshapes a flat sample stream into a matrix of non-overlapping windows.
///
/// The result has `floor(len / window_width)` rows of `window_width` columns, filled
/// row-major in stream order. The trailing `len % window_width` samples do not fill a
/// complete window and are dropped, so every row is dense; at most `window_width - 1`
/// samples are lost.
///
/// # Errors
/// `InvalidConfig` if `window_width` is zero, `InsufficientData` if the stream is
/// shorter than one window.
///
/// ```
/// use window_pca::segment;
///
/// let m = segment(&[1.0, 2.0, 3.0, 4.0, 5.0], 2).unwrap();
/// assert_eq!(m.dim(), (2, 2));
/// assert_eq!(m[[1, 0]], 3.0);
/// ```
pub fn segment(stream: &[f64], window_width: usize) -> Result<Array2<f64>> {
    validate_window_width(window_width)?;
    if stream.len() < window_width {
        return Err(DecorrelationError::insufficient_data(
            window_width,
            stream.len(),
        ));
    }

    let n_rows = stream.len() / window_width;
    let dropped = discarded_tail(stream.len(), window_width);
    if dropped > 0 {
        warn!(
            "Dropping {} trailing samples that do not fill a window of {}",
            dropped, window_width
        );
    }
    debug!("Segmented {} samples into {}x{}", stream.len(), n_rows, window_width);

    Array2::from_shape_vec(
        (n_rows, window_width),
        stream[..n_rows * window_width].to_vec(),
    )
    .map_err(|e| DecorrelationError::invalid_input(format!("Failed to reshape stream: {}", e)))
}

/// Like [`segment`], but only the first `max_samples` samples are considered.
pub fn segment_capped(
    stream: &[f64],
    window_width: usize,
    max_samples: Option<usize>,
) -> Result<Array2<f64>> {
    match max_samples {
        Some(cap) if cap < stream.len() => segment(&stream[..cap], window_width),
        _ => segment(stream, window_width),
    }
}

/// Same as [`segment`] for a stream already held in an ndarray vector.
pub fn segment_view(stream: ArrayView1<f64>, window_width: usize) -> Result<Array2<f64>> {
    match stream.as_slice() {
        Some(slice) => segment(slice, window_width),
        None => segment(&stream.to_vec(), window_width),
    }
}

/// Number of samples [`segment`] leaves out for a stream of `len` samples.
pub fn discarded_tail(len: usize, window_width: usize) -> usize {
    if window_width == 0 {
        return len;
    }
    len % window_width
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, s, Array1};

    #[test]
    fn test_exact_fit_reshapes_row_major() {
        let stream = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let m = segment(&stream, 2).unwrap();
        assert_eq!(m, array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0], [7.0, 8.0]]);
    }

    #[test]
    fn test_remainder_is_dropped() {
        let stream: Vec<f64> = (0..23).map(|v| v as f64).collect();
        let m = segment(&stream, 5).unwrap();
        assert_eq!(m.dim(), (4, 5));
        assert_eq!(discarded_tail(stream.len(), 5), 3);
        // Last kept sample is index 19.
        assert_eq!(m[[3, 4]], 19.0);
        assert_eq!(m.iter().count() + discarded_tail(23, 5), stream.len());
    }

    #[test]
    fn test_insufficient_data() {
        let err = segment(&[1.0, 2.0, 3.0], 5).unwrap_err();
        assert_eq!(err, DecorrelationError::insufficient_data(5, 3));
    }

    #[test]
    fn test_zero_width_is_config_error() {
        assert!(matches!(
            segment(&[1.0, 2.0], 0),
            Err(DecorrelationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_single_window() {
        let m = segment(&[4.0, 5.0, 6.0], 3).unwrap();
        assert_eq!(m.dim(), (1, 3));
    }

    #[test]
    fn test_segmentation_is_deterministic() {
        let stream: Vec<f64> = (0..101).map(|v| (v as f64).sin()).collect();
        assert_eq!(segment(&stream, 7).unwrap(), segment(&stream, 7).unwrap());
    }

    #[test]
    fn test_cap_limits_samples() {
        let stream: Vec<f64> = (0..100).map(|v| v as f64).collect();
        let m = segment_capped(&stream, 10, Some(35)).unwrap();
        assert_eq!(m.dim(), (3, 10));
        let m = segment_capped(&stream, 10, Some(1_000)).unwrap();
        assert_eq!(m.dim(), (10, 10));
        let m = segment_capped(&stream, 10, None).unwrap();
        assert_eq!(m.dim(), (10, 10));
    }

    #[test]
    fn test_strided_view_is_segmented_in_logical_order() {
        let base = Array1::from_iter((0..12).map(|v| v as f64));
        let every_other = base.slice(s![..;2]);
        let m = segment_view(every_other, 3).unwrap();
        assert_eq!(m, array![[0.0, 2.0, 4.0], [6.0, 8.0, 10.0]]);
    }
}
