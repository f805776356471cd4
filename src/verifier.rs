//! One-shot certificate verification driven by a [`VerifyConfig`]

use std::fmt;

use log::{debug, info};
use serde::Serialize;

use crate::common::Result;
use crate::config::{validate_config, ConfigError, VerifyConfig};
use crate::x509::{Certificate, Store, StoreContext, VerifyOutcome};

/// Summary of a verification run
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VerifyReport {
    /// Subject of the verified certificate
    pub subject: String,

    /// SHA-256 fingerprint of the verified certificate
    pub fingerprint: String,

    /// Whether the chain verified
    pub valid: bool,

    /// Raw verification code, `0` when valid
    pub code: i32,

    /// Description of the verification code
    pub message: String,

    /// Chain depth at which verification stopped
    pub depth: u32,
}

impl VerifyReport {
    fn new(cert: &Certificate, outcome: VerifyOutcome) -> Result<Self> {
        Ok(Self {
            subject: cert.subject_name()?,
            fingerprint: cert.fingerprint()?,
            valid: outcome.is_valid(),
            code: outcome.code(),
            message: outcome.error_string().to_string(),
            depth: outcome.depth(),
        })
    }
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Subject:     {}", self.subject)?;
        writeln!(f, "Fingerprint: {}", self.fingerprint)?;
        if self.valid {
            write!(f, "Result:      OK")
        } else {
            write!(f, "Result:      FAILED ({}) at depth {}: {}", self.code, self.depth, self.message)
        }
    }
}

/// Build the trust store described by `config`
pub fn build_store(config: &VerifyConfig) -> Result<Store> {
    let mut store = Store::create()?;

    if let Some(ca_file) = &config.ca_file {
        store.load_pem_file(ca_file)?;
    }

    if config.default_paths {
        debug!("Adding default certificate locations to the store");
        store.set_default_paths()?;
    }

    Ok(store)
}

/// Validate `config`, then run one verification pass over the configured certificate
pub fn verify_with_config(config: &VerifyConfig) -> Result<VerifyReport> {
    validate_config(config)?;

    let store = build_store(config)?;

    let cert_path = config
        .cert
        .as_deref()
        .ok_or_else(|| ConfigError::MissingRequiredValue("cert".to_string()))?;
    let cert = Certificate::load_pem_file(cert_path)?;

    let chain = match &config.chain {
        Some(path) => Certificate::load_pem_bundle(path)?,
        None => Vec::new(),
    };

    let mut ctx: StoreContext = StoreContext::create()?;
    ctx.initialize(Some(&store), Some(&cert), &chain)?;

    if let Some(path) = &config.trusted {
        let trusted = Certificate::load_pem_bundle(path)?;
        ctx.set_trusted_certificates(&trusted)?;
    }

    let outcome = ctx.verify()?;
    ctx.cleanup()?;

    let report = VerifyReport::new(&cert, outcome)?;
    if report.valid {
        info!("Certificate {} verified", report.subject);
    } else {
        info!("Certificate {} failed verification: {}", report.subject, report.message);
    }

    Ok(report)
}
