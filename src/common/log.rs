//! Logging utilities
//!
//! Thin setup around `env_logger`; `RUST_LOG` takes precedence over the given level.

/// Initialize the logging system
///
/// # Parameters
///
/// * `level` - Default log level used when `RUST_LOG` is not set
pub fn init_logger(level: &str) {
    let env = env_logger::Env::default()
        .filter_or("RUST_LOG", level);

    // A second initialization (tests, embedding applications) is not an error
    let _ = env_logger::try_init_from_env(env);
}
