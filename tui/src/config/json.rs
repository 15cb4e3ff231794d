use super::model::LabDraft;

/// Loads a [`LabDraft`] from a JSON file, falling back to the built-in
/// defaults for any missing field.
///
/// # Errors
/// Returns a human-readable string if the file cannot be read or parsed.
pub fn load_draft(path: &str) -> Result<LabDraft, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("cannot read '{path}': {e}"))?;

    let val: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| format!("invalid JSON: {e}"))?;

    let defaults = LabDraft::default();

    Ok(LabDraft {
        epochs: val["epochs"].as_u64().unwrap_or(defaults.epochs as u64) as usize,
        true_weight: val["true_weight"].as_f64().unwrap_or(defaults.true_weight),
        true_bias: val["true_bias"].as_f64().unwrap_or(defaults.true_bias),
        learning_rate: val["learning_rate"]
            .as_f64()
            .unwrap_or(defaults.learning_rate),
        sample_size: val["sample_size"]
            .as_u64()
            .unwrap_or(defaults.sample_size as u64) as usize,
        seed: val["seed"].as_u64(),
        epoch_delay_ms: val["epoch_delay_ms"]
            .as_u64()
            .unwrap_or(defaults.epoch_delay_ms),
    })
}
