//! Default configuration values
//!
//! Single source of truth for defaults shared by the loader and the command line.

/// Environment variable prefix for all configuration options (`CERTWRAP_CA_FILE`, ...)
pub const ENV_PREFIX: &str = "CERTWRAP";

/// Default log level as string
pub const LOG_LEVEL_STR: &str = "info";

/// Default output format as string
pub const OUTPUT_STR: &str = "text";

/// Log levels understood by `env_logger`
pub const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Default log level
pub fn log_level() -> String {
    LOG_LEVEL_STR.to_string()
}
