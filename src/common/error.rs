//! Error handling module
//!
//! This module defines the error types and result type aliases used by the wrappers,
//! and the helpers that turn OpenSSL's status codes and error queue into them.

use std::io;
use std::os::raw::c_int;

use log::warn;
use openssl::error::ErrorStack;
use thiserror::Error;

use crate::sys;

/// certwrap error type
#[derive(Error, Debug)]
pub enum WrapError {
    /// A resource-creation call returned a null handle
    #[error("Allocation error: could not obtain {resource}: {stack}")]
    Allocation {
        resource: &'static str,
        stack: ErrorStack,
    },

    /// A setup call reported failure through its status code
    #[error("Initialization error: {resource} rejected its inputs: {stack}")]
    Initialization {
        resource: &'static str,
        stack: ErrorStack,
    },

    /// A native call left errors on the OpenSSL error queue or reported an internal failure
    #[error("Native error: {operation} on {resource} failed: {stack}")]
    Native {
        resource: &'static str,
        operation: &'static str,
        stack: ErrorStack,
    },

    /// The wrapper holds no handle
    #[error("Null handle: {0} is empty")]
    NullHandle(&'static str),

    /// The operation is not valid in the current state
    #[error("Invalid state: {0}")]
    State(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// OpenSSL error
    #[error("OpenSSL error: {0}")]
    Ssl(#[from] ErrorStack),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias
///
/// This is a `Result` type alias that uses our custom `WrapError`.
pub type Result<T> = std::result::Result<T, WrapError>;

impl WrapError {
    /// Build an `Allocation` error from the current thread's error queue
    pub(crate) fn allocation(resource: &'static str) -> Self {
        WrapError::Allocation { resource, stack: ErrorStack::get() }
    }

    /// Build an `Initialization` error from the current thread's error queue
    pub(crate) fn initialization(resource: &'static str) -> Self {
        WrapError::Initialization { resource, stack: ErrorStack::get() }
    }

    /// Build a `Native` error from the current thread's error queue
    pub(crate) fn native(resource: &'static str, operation: &'static str) -> Self {
        WrapError::Native { resource, operation, stack: ErrorStack::get() }
    }
}

/// Map a native `1 on success` status code to a `Native` error
pub(crate) fn check_status(ret: c_int, resource: &'static str, operation: &'static str) -> Result<()> {
    if ret > 0 {
        Ok(())
    } else {
        Err(WrapError::native(resource, operation))
    }
}

/// Run a void-returning native call and surface whatever it left on the error queue
///
/// The queue is cleared first so that only errors raised by `call` are reported.
pub(crate) fn check_queue_after<F>(resource: &'static str, operation: &'static str, call: F) -> Result<()>
where
    F: FnOnce(),
{
    unsafe { openssl_sys::ERR_clear_error() };

    call();

    if unsafe { sys::ERR_peek_error() } != 0 {
        let err = WrapError::native(resource, operation);
        warn!("{}", err);
        Err(err)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let wrap_err: WrapError = io_err.into();

        match wrap_err {
            WrapError::Io(_) => {}
            _ => panic!("Should convert to IO error"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = WrapError::NullHandle("X509_STORE_CTX");
        assert_eq!(err.to_string(), "Null handle: X509_STORE_CTX is empty");

        let err = WrapError::Config("Invalid configuration".to_string());
        assert!(err.to_string().contains("Invalid configuration"));
    }

    #[test]
    fn test_check_status() {
        assert!(check_status(1, "X509_STORE", "add certificate").is_ok());

        match check_status(0, "X509_STORE", "add certificate") {
            Err(WrapError::Native { resource, operation, .. }) => {
                assert_eq!(resource, "X509_STORE");
                assert_eq!(operation, "add certificate");
            }
            other => panic!("Expected native error, got {:?}", other),
        }
    }

    #[test]
    fn test_check_queue_after_clean_call() {
        let mut called = false;
        let result = check_queue_after("X509_STORE_CTX", "cleanup", || called = true);

        assert!(called);
        assert!(result.is_ok());
    }
}
