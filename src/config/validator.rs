//! Configuration validator

use std::path::Path;

use log::warn;

use super::defaults::LOG_LEVELS;
use super::error::{ConfigError, Result};
use super::VerifyConfig;

/// Validate the configuration before any file is loaded
pub fn validate_config(config: &VerifyConfig) -> Result<()> {
    let cert = config
        .cert
        .as_deref()
        .ok_or_else(|| ConfigError::MissingRequiredValue("cert".to_string()))?;
    validate_file_exists(cert)?;

    if !config.has_trust_source() {
        return Err(ConfigError::InvalidCombination(
            "At least one of ca_file, trusted or default_paths must be set".to_string(),
        ));
    }

    for path in [&config.ca_file, &config.chain, &config.trusted].into_iter().flatten() {
        validate_file_exists(path)?;
    }

    if !LOG_LEVELS.contains(&config.log_level.to_lowercase().as_str()) {
        warn!("Invalid log level: {}. Using default: info", config.log_level);
    }

    Ok(())
}

fn validate_file_exists(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ConfigError::FileNotFound(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_cert() {
        let config = VerifyConfig {
            default_paths: true,
            ..VerifyConfig::default()
        };

        assert!(matches!(validate_config(&config), Err(ConfigError::MissingRequiredValue(_))));
    }

    #[test]
    fn test_missing_file() {
        let config = VerifyConfig {
            cert: Some(PathBuf::from("/nonexistent/leaf.pem")),
            default_paths: true,
            ..VerifyConfig::default()
        };

        assert!(matches!(validate_config(&config), Err(ConfigError::FileNotFound(_))));
    }
}
