//! Demo configuration via `grub.toml`.
//!
//! Every key is optional. Command-line flags override whatever the file sets.

use std::io;
use std::path::{Path, PathBuf};

use grub_types::{ConfigError, SearchConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "grub.toml";

/// Errors reading the config file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid [search] settings: {0}")]
    Invalid(#[from] ConfigError),
}

/// Settings for the `grub` binary.
///
/// # Example
///
/// ```toml
/// data_dir = "data/sr28"
/// snapshot = "foods.grub"
/// log_filter = "grub_core=debug,info"
///
/// [search]
/// min_similarity = 0.7
/// max_results = 50
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Directory holding the SR `*.txt` files.
    pub data_dir: PathBuf,
    /// Snapshot file written by `build` and preferred by every other command.
    pub snapshot: Option<PathBuf>,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    pub search: SearchConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            snapshot: None,
            log_filter: "info".to_string(),
            search: SearchConfig::default(),
        }
    }
}

impl DemoConfig {
    /// Reads and validates a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigFileError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            ConfigFileError::Parse { source, .. } => ConfigFileError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Resolves the config for a run.
    ///
    /// An explicit path must exist. Without one, `grub.toml` in the working
    /// directory is used if present and defaults apply otherwise.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigFileError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(CONFIG_FILE_NAME);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_toml(content: &str) -> Result<Self, ConfigFileError> {
        let config: DemoConfig =
            toml::from_str(content).map_err(|source| ConfigFileError::Parse {
                path: PathBuf::new(),
                source,
            })?;
        config.search.validate()?;
        Ok(config)
    }
}
