use std::num::NonZeroUsize;

use crate::error::{Result, TrainError};

/// Reference sample size of the demo.
pub const DEFAULT_SAMPLE_SIZE: NonZeroUsize = NonZeroUsize::new(50).unwrap();

/// Milliseconds between epochs in the reference configuration.
pub const DEFAULT_EPOCH_DELAY_MS: u64 = 50;

/// Knobs for one training run, parsed and validated by the front end before
/// anything is scheduled.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub epochs: usize,
    pub true_weight: f64,
    pub true_bias: f64,
    pub learning_rate: f64,
    pub sample_size: NonZeroUsize,
    pub seed: Option<u64>,
    pub epoch_delay_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            epochs: 200,
            true_weight: 2.0,
            true_bias: 1.0,
            learning_rate: 0.05,
            sample_size: DEFAULT_SAMPLE_SIZE,
            seed: None,
            epoch_delay_ms: DEFAULT_EPOCH_DELAY_MS,
        }
    }
}

impl RunConfig {
    /// Checks the caller-supplied values the trainer itself accepts
    /// mechanically.
    ///
    /// # Errors
    /// `TrainError::InvalidConfig` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(TrainError::InvalidConfig {
                field: "epochs",
                reason: "must be at least 1",
            });
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(TrainError::InvalidConfig {
                field: "learning_rate",
                reason: "must be positive and finite",
            });
        }
        if !self.true_weight.is_finite() {
            return Err(TrainError::InvalidConfig {
                field: "true_weight",
                reason: "must be finite",
            });
        }
        if !self.true_bias.is_finite() {
            return Err(TrainError::InvalidConfig {
                field: "true_bias",
                reason: "must be finite",
            });
        }
        Ok(())
    }
}
