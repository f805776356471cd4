//! X.509 wrappers
//!
//! Owning and borrowing wrappers for OpenSSL's certificate (`X509`), certificate store
//! (`X509_STORE`) and verification context (`X509_STORE_CTX`) structures.

mod certificate;
mod store;
pub mod store_context;

pub use certificate::Certificate;
pub use store::Store;
pub use store_context::{ContextApi, OpenSslContextApi, StoreContext, VerifyOutcome};
