use crate::core::config::data::{path_display, Config, ConfigDocument, ValidationError};
use directories::ProjectDirs;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Errors that can occur when loading or saving configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write the configuration file to disk.
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The document parsed but does not satisfy the config schema.
    Validation(ValidationError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Failed to read config at {}: {}", path_display(path), source)
            }
            ConfigError::Write { path, source } => {
                write!(f, "Failed to write config at {}: {}", path_display(path), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Failed to parse config at {}: {}", path_display(path), source)
            }
            ConfigError::Validation(reason) => {
                write!(f, "Invalid configuration: {reason}")
            }
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Write { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Validation(source) => Some(source),
        }
    }
}

/// Reads and writes the persisted configuration document at one fixed path.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store bound to the per-user config path, e.g.
    /// `~/.config/plume/config.json` on Linux.
    pub fn from_default_path() -> Self {
        Self {
            path: default_config_path(),
        }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate the persisted configuration. The file (and its
    /// parent directory) are created with an empty document on first use;
    /// no default values are invented.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let document = self.load_document()?;
        document.validate().map_err(ConfigError::Validation)
    }

    /// Load the raw document without validating it. Used by the interactive
    /// setup flow to show current values as defaults.
    pub fn load_document(&self) -> Result<ConfigDocument, ConfigError> {
        self.ensure_exists()?;
        debug!("loading config from {}", self.path.display());
        let contents = fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Merge `patch` over the persisted document, validate the result, and
    /// persist it as pretty-printed JSON. Nothing is written unless the
    /// merged document validates.
    pub fn save(&self, patch: ConfigDocument) -> Result<Config, ConfigError> {
        let mut document = self.load_document()?;
        document.merge(patch);
        let config = document.validate().map_err(ConfigError::Validation)?;
        self.write_document(&document)?;
        debug!("saved config to {}", self.path.display());
        Ok(config)
    }

    fn ensure_exists(&self) -> Result<(), ConfigError> {
        if self.path.exists() {
            return Ok(());
        }
        self.write_document(&ConfigDocument::default())
    }

    fn write_document(&self, document: &ConfigDocument) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };

        let parent = self.path.parent().filter(|dir| !dir.as_os_str().is_empty());
        if let Some(dir) = parent {
            fs::create_dir_all(dir).map_err(write_err)?;
        }

        let contents = serde_json::to_string_pretty(document).map_err(|source| {
            ConfigError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;

        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .map_err(write_err)?;

        temp_file.write_all(contents.as_bytes()).map_err(write_err)?;
        temp_file.as_file_mut().sync_all().map_err(write_err)?;
        temp_file
            .persist(&self.path)
            .map_err(|err| ConfigError::Write {
                path: self.path.clone(),
                source: err.error,
            })?;
        Ok(())
    }
}

fn default_config_path() -> PathBuf {
    let proj_dirs = ProjectDirs::from("org", "permacommons", "plume")
        .expect("Failed to determine config directory");
    proj_dirs.config_dir().join("config.json")
}
