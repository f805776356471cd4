//! Configuration module
//!
//! This module handles configuration of the verification tool, including loading from
//! different sources (defaults, a JSON file, environment variables, command line
//! arguments) and validating the result.

mod defaults;
mod error;
mod loader;
mod validator;

pub use self::defaults::{ENV_PREFIX, LOG_LEVEL_STR};
pub use self::error::ConfigError;
pub use self::loader::load_config;
pub use self::validator::validate_config;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How verification results are printed
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// A single JSON document
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidValue(
                "output".to_string(),
                format!("Invalid output format: {}. Valid values are: text, json", s),
            )),
        }
    }
}

/// Settings for one verification run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VerifyConfig {
    /// PEM bundle of trust anchors added to the store
    pub ca_file: Option<PathBuf>,

    /// Certificate to verify
    pub cert: Option<PathBuf>,

    /// PEM bundle of untrusted intermediates used for path building
    pub chain: Option<PathBuf>,

    /// PEM bundle installed as an explicit trusted set, bypassing the store
    pub trusted: Option<PathBuf>,

    /// Also trust the library's default certificate locations
    pub default_paths: bool,

    /// Log level
    pub log_level: String,

    /// Output format
    pub output: OutputFormat,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            ca_file: None,
            cert: None,
            chain: None,
            trusted: None,
            default_paths: false,
            log_level: defaults::log_level(),
            output: OutputFormat::default(),
        }
    }
}

/// Values given on the command line, which take precedence over every other source
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub ca_file: Option<PathBuf>,
    pub cert: Option<PathBuf>,
    pub chain: Option<PathBuf>,
    pub trusted: Option<PathBuf>,
    pub default_paths: bool,
    pub log_level: Option<String>,
    pub output: Option<OutputFormat>,
}

impl VerifyConfig {
    /// Apply command line overrides
    ///
    /// `default_paths` can only be switched on from the command line, never off.
    pub fn apply(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(ca_file) = overrides.ca_file {
            self.ca_file = Some(ca_file);
        }
        if let Some(cert) = overrides.cert {
            self.cert = Some(cert);
        }
        if let Some(chain) = overrides.chain {
            self.chain = Some(chain);
        }
        if let Some(trusted) = overrides.trusted {
            self.trusted = Some(trusted);
        }
        if overrides.default_paths {
            self.default_paths = true;
        }
        if let Some(log_level) = overrides.log_level {
            self.log_level = log_level;
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }

        self
    }

    /// Whether any trust source is configured
    pub fn has_trust_source(&self) -> bool {
        self.ca_file.is_some() || self.trusted.is_some() || self.default_paths
    }
}
