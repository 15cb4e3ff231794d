use std::num::NonZeroUsize;

use descent_lab::RunConfig;

use super::model::LabDraft;

/// Converts a [`LabDraft`] into a validated [`RunConfig`].
///
/// # Errors
/// Returns a human-readable error if any value is invalid.
pub fn build(draft: &LabDraft) -> Result<RunConfig, String> {
    let sample_size = NonZeroUsize::new(draft.sample_size)
        .ok_or_else(|| "sample_size must be greater than zero".to_string())?;

    let config = RunConfig {
        epochs: draft.epochs,
        true_weight: draft.true_weight,
        true_bias: draft.true_bias,
        learning_rate: draft.learning_rate,
        sample_size,
        seed: draft.seed,
        epoch_delay_ms: draft.epoch_delay_ms,
    };
    config.validate().map_err(|e| e.to_string())?;

    Ok(config)
}
