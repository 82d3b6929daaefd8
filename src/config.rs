// Configuration for windowed decorrelation

use serde::{Deserialize, Serialize};

use crate::error::{DecorrelationError, Result};

/// Default window width, in samples.
pub const DEFAULT_WINDOW_WIDTH: usize = 1000;

/// Default fraction of rows used to fit the basis.
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.5;

/// How the boundary between training and testing rows is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PartitionRule {
    /// `train = [0, floor((N+1)f))`, `test = [floor(N f + 1), N)`.
    ///
    /// When `N f` is an integer the row at index `N f` belongs to neither side.
    /// For `f = 0.5` that means every even `N` loses its middle row while odd
    /// `N` loses nothing.
    #[default]
    Reference,
    /// `train = [0, floor(N f))`, `test = [floor(N f), N)`. Every row is kept.
    Contiguous,
}

/// Parameters of the decorrelation pipeline.
///
/// Window width and training fraction travel explicitly into every operation.
///
/// ```
/// use window_pca::{DecorrelationConfig, PartitionRule};
///
/// let config = DecorrelationConfig::default()
///     .with_window_width(250)
///     .with_train_fraction(0.6)
///     .with_partition_rule(PartitionRule::Contiguous);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorrelationConfig {
    /// Segment length D. Each window becomes one D-dimensional observation.
    pub window_width: usize,

    /// Fraction of rows, taken from the start of the stream, used to fit the basis.
    /// Must lie strictly between 0 and 1.
    pub train_fraction: f64,

    /// Placement of the training/testing boundary.
    pub partition_rule: PartitionRule,

    /// Upper bound on the number of stream samples considered. `None` reads everything.
    pub max_samples: Option<usize>,
}

impl Default for DecorrelationConfig {
    fn default() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            train_fraction: DEFAULT_TRAIN_FRACTION,
            partition_rule: PartitionRule::default(),
            max_samples: None,
        }
    }
}

impl DecorrelationConfig {
    /// Creates a configuration with the given window width and training fraction.
    #[must_use]
    pub fn new(window_width: usize, train_fraction: f64) -> Self {
        Self {
            window_width,
            train_fraction,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_window_width(mut self, window_width: usize) -> Self {
        self.window_width = window_width;
        self
    }

    #[must_use]
    pub fn with_train_fraction(mut self, train_fraction: f64) -> Self {
        self.train_fraction = train_fraction;
        self
    }

    #[must_use]
    pub fn with_partition_rule(mut self, partition_rule: PartitionRule) -> Self {
        self.partition_rule = partition_rule;
        self
    }

    #[must_use]
    pub fn with_max_samples(mut self, max_samples: Option<usize>) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Checks every field, returning the first violation found.
    pub fn validate(&self) -> Result<()> {
        validate_window_width(self.window_width)?;
        validate_train_fraction(self.train_fraction)?;
        if let Some(cap) = self.max_samples {
            if cap < self.window_width {
                return Err(DecorrelationError::invalid_config(format!(
                    "max_samples ({}) is smaller than one window ({})",
                    cap, self.window_width
                )));
            }
        }
        Ok(())
    }
}

pub(crate) fn validate_window_width(window_width: usize) -> Result<()> {
    if window_width == 0 {
        return Err(DecorrelationError::invalid_config(
            "window_width must be positive",
        ));
    }
    Ok(())
}

pub(crate) fn validate_train_fraction(train_fraction: f64) -> Result<()> {
    if !(train_fraction.is_finite() && train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(DecorrelationError::invalid_config(format!(
            "train_fraction must lie in (0, 1), got {}",
            train_fraction
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_reference_constants() {
        let config = DecorrelationConfig::default();
        assert_eq!(config.window_width, 1000);
        assert_eq!(config.train_fraction, 0.5);
        assert_eq!(config.partition_rule, PartitionRule::Reference);
        assert!(config.max_samples.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_fraction_rejected() {
        for f in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            let config = DecorrelationConfig::new(10, f);
            assert!(
                matches!(config.validate(), Err(DecorrelationError::InvalidConfig(_))),
                "fraction {} should be rejected",
                f
            );
        }
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = DecorrelationConfig::default().with_window_width(0);
        assert!(matches!(
            config.validate(),
            Err(DecorrelationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_cap_below_window_rejected() {
        let config = DecorrelationConfig::new(100, 0.5).with_max_samples(Some(99));
        assert!(config.validate().is_err());
        let config = config.with_max_samples(Some(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serde_fills_missing_fields_with_defaults() {
        let config: DecorrelationConfig =
            serde_json::from_str(r#"{"window_width": 64}"#).expect("valid json");
        assert_eq!(config.window_width, 64);
        assert_eq!(config.train_fraction, DEFAULT_TRAIN_FRACTION);
        assert_eq!(config.partition_rule, PartitionRule::Reference);

        let round: DecorrelationConfig =
            serde_json::from_str(&serde_json::to_string(&config).expect("serializes"))
                .expect("deserializes");
        assert_eq!(round, config);
    }
}
