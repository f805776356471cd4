//! certwrap: ownership-aware wrappers for OpenSSL X.509 structures
//!
//! This library wraps OpenSSL's certificate (`X509`), certificate store (`X509_STORE`) and
//! verification context (`X509_STORE_CTX`) structures. Chain building and signature
//! checking stay in OpenSSL; the wrappers decide who frees each native handle, turn
//! OpenSSL's status codes and error queue into [`WrapError`]s, and release everything
//! they own on drop.
//!
//! Every wrapper is built on [`pointer::PointerWrapper`], which is either owning,
//! borrowing or empty. Wrappers hold raw pointers and are neither `Send` nor `Sync`.
//!
//! # Example
//!
//! ```no_run
//! use certwrap::x509::{Certificate, Store, StoreContext};
//! use certwrap::Result;
//! use std::path::Path;
//!
//! fn main() -> Result<()> {
//!     let mut store = Store::create()?;
//!     store.load_pem_file(Path::new("certs/ca.pem"))?;
//!
//!     let cert = Certificate::load_pem_file(Path::new("certs/server.pem"))?;
//!
//!     let mut ctx: StoreContext = StoreContext::create()?;
//!     ctx.initialize(Some(&store), Some(&cert), &[])?;
//!
//!     let outcome = ctx.verify()?;
//!     println!("{}", outcome.error_string());
//!
//!     // The context can be reused after cleanup
//!     ctx.cleanup()?;
//!
//!     Ok(())
//! }
//! ```

// Public modules
pub mod common;
pub mod config;
pub mod pointer;
pub mod verifier;
pub mod x509;

mod sys;

// Re-export commonly used structures and functions for convenience
pub use common::{WrapError, Result};
pub use pointer::{Alias, Ownership, PointerWrapper};
pub use verifier::{verify_with_config, VerifyReport};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
