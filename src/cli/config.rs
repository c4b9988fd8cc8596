//! Configuration file for the CLI
//!
//! A single JSON object. Every key is optional:
//!
//! ```json
//! {
//!   "codec": "deflate",
//!   "block_size": 64000,
//!   "deflate_level": 6,
//!   "on_mismatch": "skip",
//!   "log_level": "info",
//!   "schema_dir": "./schemas"
//! }
//! ```
//!
//! Command line flags override values from the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::container::{Codec, ContainerConfig, DEFAULT_BLOCK_SIZE, DEFAULT_DEFLATE_LEVEL};
use crate::observability::Severity;

use super::errors::{CliError, CliResult};

/// What `encode` does with a record the schema rejects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    /// Log the record and keep going
    #[default]
    Skip,
    /// Stop at the first rejected record
    Fail,
}

impl FromStr for MismatchPolicy {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(Self::Skip),
            "fail" => Ok(Self::Fail),
            other => Err(CliError::config_error(format!(
                "Invalid on_mismatch: '{}'. Must be 'skip' or 'fail'.",
                other
            ))),
        }
    }
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Block codec (default "null")
    #[serde(default)]
    pub codec: Codec,

    /// Uncompressed block flush threshold in bytes (default 64000)
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// DEFLATE level 0-9 (default 6)
    #[serde(default = "default_deflate_level")]
    pub deflate_level: u32,

    #[serde(default)]
    pub on_mismatch: MismatchPolicy,

    /// Minimum log severity written to stderr (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: Severity,

    /// Directory of `.avsc` files; lets `--schema` name a type by full name
    #[serde(default)]
    pub schema_dir: Option<PathBuf>,
}

fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}
fn default_deflate_level() -> u32 {
    DEFAULT_DEFLATE_LEVEL
}
fn default_log_level() -> Severity {
    Severity::Info
}

impl Default for Config {
    fn default() -> Self {
        Self {
            codec: Codec::default(),
            block_size: default_block_size(),
            deflate_level: default_deflate_level(),
            on_mismatch: MismatchPolicy::default(),
            log_level: default_log_level(),
            schema_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        Self::from_json_str(&content)
    }

    /// Parse and validate configuration text
    pub fn from_json_str(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load the file if one was given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> CliResult<()> {
        self.container_config()
            .validate()
            .map_err(|e| CliError::config_error(e.to_string()))
    }

    /// Settings for the container writer
    pub fn container_config(&self) -> ContainerConfig {
        ContainerConfig {
            codec: self.codec,
            block_size: self.block_size,
            deflate_level: self.deflate_level,
        }
    }
}
