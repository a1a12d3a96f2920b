//! CLI configuration
//!
//! Read from YAML: an explicit `--config` path, else `./paychan.yml` when
//! present, else built-in defaults.

use anyhow::{Context, Result};
use paychan_pipeline::ApplyConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Project-local configuration file name
pub const LOCAL_CONFIG: &str = "paychan.yml";

/// Top-level keys are those of [`ApplyConfig`]: `transform` and
/// `response_namespaces`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Batch apply and transform engine settings
    #[serde(flatten)]
    pub apply: ApplyConfig,
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must exist and parse. A local file that fails to
    /// parse is reported and ignored.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()));
        }

        let local_config = PathBuf::from(LOCAL_CONFIG);
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {:#}", local_config.display(), e);
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        tracing::debug!("Loaded config from: {}", path.display());
        Ok(config)
    }
}
