use descent_lab::RunConfig;

/// Run settings gathered by the setup screen, before validation.
#[derive(Debug, Clone)]
pub struct LabDraft {
    pub epochs: usize,
    pub true_weight: f64,
    pub true_bias: f64,
    pub learning_rate: f64,
    pub sample_size: usize,
    pub seed: Option<u64>,
    pub epoch_delay_ms: u64,
}

impl Default for LabDraft {
    fn default() -> Self {
        let reference = RunConfig::default();
        Self {
            epochs: reference.epochs,
            true_weight: reference.true_weight,
            true_bias: reference.true_bias,
            learning_rate: reference.learning_rate,
            sample_size: reference.sample_size.get(),
            seed: reference.seed,
            epoch_delay_ms: reference.epoch_delay_ms,
        }
    }
}
