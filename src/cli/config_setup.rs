//! First-run and on-demand interactive configuration.

use std::error::Error;
use tracing::debug;

use crate::core::config::{ConfigDocument, ConfigStore, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::utils::input::read_line_with_default;

#[derive(Debug, PartialEq)]
pub enum SetupOutcome {
    Saved,
    Cancelled,
}

/// Walk the user through the three config values, showing current values
/// (or first-run suggestions) as defaults. Cancelling any prompt aborts
/// without persisting anything.
pub fn run_config_setup(store: &ConfigStore) -> Result<SetupOutcome, Box<dyn Error>> {
    println!("🛠️  Setting up your configuration");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let current = store.load_document()?;
    debug!("editing config at {}", store.path().display());

    let model_default = current
        .model_name
        .clone()
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let Some(model_name) = read_line_with_default("Model name", Some(&model_default))? else {
        return Ok(SetupOutcome::Cancelled);
    };

    let temperature_default = current.temperature.unwrap_or(DEFAULT_TEMPERATURE).to_string();
    let Some(temperature_entry) =
        read_line_with_default("Sampling temperature (0-1)", Some(&temperature_default))?
    else {
        return Ok(SetupOutcome::Cancelled);
    };
    let temperature: f64 = temperature_entry
        .parse()
        .map_err(|_| format!("Invalid temperature: {temperature_entry}"))?;

    let Some(api_key) =
        read_line_with_default("OpenAI API key (sk-...)", current.api_key.as_deref())?
    else {
        return Ok(SetupOutcome::Cancelled);
    };

    store.save(ConfigDocument {
        temperature: Some(temperature),
        model_name: Some(model_name),
        api_key: Some(api_key),
    })?;

    println!("✅ Config updated!");
    Ok(SetupOutcome::Saved)
}
