//! Configuration loading
//!
//! Sources are layered with the `config` crate, lowest priority first:
//!
//! 1. Default values
//! 2. Configuration file (JSON), if given
//! 3. Environment variables prefixed with `CERTWRAP_`
//!
//! Command line arguments are applied afterwards with [`VerifyConfig::apply`].

use std::path::Path;

use ::config::{Config, Environment, File, FileFormat};
use log::debug;

use super::defaults::{ENV_PREFIX, LOG_LEVEL_STR, OUTPUT_STR};
use super::error::{ConfigError, Result};
use super::VerifyConfig;

/// Load configuration from defaults, an optional JSON file and the environment
pub fn load_config(config_file: Option<&Path>) -> Result<VerifyConfig> {
    let mut builder = Config::builder()
        .set_default("log_level", LOG_LEVEL_STR)?
        .set_default("output", OUTPUT_STR)?
        .set_default("default_paths", false)?;

    if let Some(path) = config_file {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        debug!("Loading configuration from {}", path.display());
        builder = builder.add_source(File::from(path).format(FileFormat::Json).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

    let config: VerifyConfig = builder.build()?.try_deserialize()?;
    debug!("Loaded configuration: {:?}", config);

    Ok(config)
}
