//! Configuration file loading.
//!
//! ```json
//! {
//!   "server": { "host": "0.0.0.0", "port": 5000, "cors_origins": [] },
//!   "seed_dir": "./_data",
//!   "log_format": "pretty",
//!   "log_filter": "info"
//! }
//! ```
//!
//! Every field is optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::http_server::HttpServerConfig;
use crate::observability::{LogFormat, DEFAULT_LOG_FILTER};

use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub server: HttpServerConfig,

    /// Directory of `<collection>.json` seed files
    #[serde(default)]
    pub seed_dir: Option<PathBuf>,

    #[serde(default)]
    pub log_format: LogFormat,

    /// `tracing` filter directives, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: HttpServerConfig::default(),
            seed_dir: None,
            log_format: LogFormat::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if let Some(dir) = &self.seed_dir {
            if !dir.is_dir() {
                return Err(CliError::config_error(format!(
                    "seed_dir is not a directory: {}",
                    dir.display()
                )));
            }
        }

        EnvFilter::try_new(&self.log_filter).map_err(|e| {
            CliError::config_error(format!("Invalid log_filter '{}': {}", self.log_filter, e))
        })?;

        Ok(())
    }
}
