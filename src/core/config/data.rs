use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Model suggested during first-run setup.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Temperature suggested during first-run setup.
pub const DEFAULT_TEMPERATURE: f64 = 0.8;

/// Raw persisted configuration document.
///
/// Every field is optional so that a freshly created `{}` file, a partial
/// CLI update, and a fully populated config all share one shape. Field
/// names match the JSON keys on disk.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct ConfigDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(rename = "modelName", skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(rename = "openAIApiKey", skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// A validated configuration. Only produced by [`ConfigDocument::validate`],
/// so holders can rely on every field being present and in range.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub temperature: f64,
    pub model_name: String,
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    MissingModelName,
    MissingApiKey,
    MissingTemperature,
    TemperatureOutOfRange(f64),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingModelName => {
                write!(f, "modelName is missing or empty")
            }
            ValidationError::MissingApiKey => {
                write!(f, "openAIApiKey is missing or empty")
            }
            ValidationError::MissingTemperature => {
                write!(f, "temperature is missing")
            }
            ValidationError::TemperatureOutOfRange(value) => {
                write!(f, "temperature {value} is outside the range 0-1")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl ConfigDocument {
    /// Overlay `patch` on top of this document. Fields the patch leaves
    /// unset keep their current values.
    pub fn merge(&mut self, patch: ConfigDocument) {
        if patch.temperature.is_some() {
            self.temperature = patch.temperature;
        }
        if patch.model_name.is_some() {
            self.model_name = patch.model_name;
        }
        if patch.api_key.is_some() {
            self.api_key = patch.api_key;
        }
    }

    pub fn validate(&self) -> Result<Config, ValidationError> {
        let model_name = match self.model_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(ValidationError::MissingModelName),
        };
        let api_key = match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => return Err(ValidationError::MissingApiKey),
        };
        let temperature = self
            .temperature
            .ok_or(ValidationError::MissingTemperature)?;
        if !(0.0..=1.0).contains(&temperature) {
            return Err(ValidationError::TemperatureOutOfRange(temperature));
        }

        Ok(Config {
            temperature,
            model_name,
            api_key,
        })
    }
}

/// Get a user-friendly display string for a path, using ~ notation on
/// Unix-like systems when the path sits under the home directory.
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
