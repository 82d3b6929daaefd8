// Seeded sample streams for exercising the pipeline without instrument data

use ndarray::Array1;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::{DecorrelationError, Result};

/// Integer ADC counts drawn uniformly from `[low, high)`.
///
/// Used in place of real readings when checking that uncorrelated input stays
/// uncorrelated. A typical ADC pedestal range is `[450, 500)`.
pub fn white_noise(len: usize, low: i64, high: i64, seed: u64) -> Result<Vec<f64>> {
    if low >= high {
        return Err(DecorrelationError::invalid_config(format!(
            "White-noise range [{}, {}) is empty",
            low, high
        )));
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let counts = Array1::random_using(len, Uniform::new(low, high), &mut rng);
    Ok(counts.mapv(|c| c as f64).to_vec())
}

/// A baseline with slow AR(1) drift plus white read-out noise.
///
/// `drift_memory` close to 1 makes neighbouring samples strongly correlated, which is
/// the low-frequency structure windowed PCA is meant to remove.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftingStream {
    pub baseline: f64,
    pub drift_sigma: f64,
    pub drift_memory: f64,
    pub noise_sigma: f64,
    pub seed: u64,
}

impl Default for DriftingStream {
    fn default() -> Self {
        Self {
            baseline: 550.0,
            drift_sigma: 1.0,
            drift_memory: 0.99,
            noise_sigma: 2.0,
            seed: 0,
        }
    }
}

impl DriftingStream {
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn generate(&self, len: usize) -> Result<Vec<f64>> {
        if !(self.drift_memory.abs() < 1.0) {
            return Err(DecorrelationError::invalid_config(format!(
                "drift_memory must lie in (-1, 1), got {}",
                self.drift_memory
            )));
        }
        let drift = Normal::new(0.0, self.drift_sigma)
            .map_err(|e| DecorrelationError::invalid_config(format!("drift_sigma: {}", e)))?;
        let noise = Normal::new(0.0, self.noise_sigma)
            .map_err(|e| DecorrelationError::invalid_config(format!("noise_sigma: {}", e)))?;

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut level = 0.0;
        Ok((0..len)
            .map(|_| {
                level = self.drift_memory * level + drift.sample(&mut rng);
                self.baseline + level + noise.sample(&mut rng)
            })
            .collect())
    }
}
