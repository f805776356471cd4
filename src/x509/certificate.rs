//! X.509 certificate wrapper

use std::fmt;
use std::fs;
use std::mem::ManuallyDrop;
use std::path::Path;
use std::ptr::NonNull;

use foreign_types_shared::{ForeignType, ForeignTypeRef};
use log::debug;
use openssl::hash::MessageDigest;
use openssl::x509::{X509, X509Ref};
use openssl_sys as ffi;

use crate::common::error::check_status;
use crate::common::Result;
use crate::pointer::{Alias, PointerWrapper};

const RESOURCE: &str = "X509";

unsafe fn free_x509(ptr: *mut ffi::X509) {
    ffi::X509_free(ptr)
}

/// An X.509 certificate
///
/// Owning certificates release one native reference when dropped. [`Certificate::share`]
/// takes another reference on the same certificate, so both owners can be dropped in any
/// order.
pub struct Certificate {
    handle: PointerWrapper<ffi::X509>,
}

impl Certificate {
    /// Allocate a new, blank certificate
    pub fn create() -> Result<Self> {
        ffi::init();

        unsafe { Self::take_ownership(ffi::X509_new()) }
    }

    /// Take ownership of an `X509*`
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a valid certificate whose reference is transferred to the wrapper.
    pub unsafe fn take_ownership(ptr: *mut ffi::X509) -> Result<Self> {
        Ok(Self {
            handle: PointerWrapper::owning(ptr, free_x509, RESOURCE)?,
        })
    }

    /// Reference an `X509*` owned elsewhere
    ///
    /// # Safety
    ///
    /// `ptr` must outlive the returned wrapper.
    pub unsafe fn borrow(ptr: *mut ffi::X509) -> Result<Self> {
        Ok(Self {
            handle: PointerWrapper::borrowing(ptr, RESOURCE)?,
        })
    }

    /// A certificate wrapper holding no handle
    pub fn empty() -> Self {
        Self {
            handle: PointerWrapper::empty(RESOURCE),
        }
    }

    /// Parse a PEM-encoded certificate
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        Ok(X509::from_pem(pem)?.into())
    }

    /// Parse a DER-encoded certificate
    pub fn from_der(der: &[u8]) -> Result<Self> {
        Ok(X509::from_der(der)?.into())
    }

    /// Parse every certificate of a PEM bundle, in file order
    pub fn stack_from_pem(pem: &[u8]) -> Result<Vec<Self>> {
        Ok(X509::stack_from_pem(pem)?
            .into_iter()
            .map(Self::from)
            .collect())
    }

    /// Load the first certificate of a PEM file
    pub fn load_pem_file(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        debug!("Loading certificate from {}", path.display());
        Self::from_pem(&data)
    }

    /// Load every certificate of a PEM bundle file
    pub fn load_pem_bundle(path: &Path) -> Result<Vec<Self>> {
        let data = fs::read(path)?;
        let certs = Self::stack_from_pem(&data)?;
        debug!("Loaded {} certificate(s) from {}", certs.len(), path.display());
        Ok(certs)
    }

    /// Take an additional native reference to the same certificate
    pub fn share(&self) -> Result<Self> {
        let ptr = self.handle.get()?;
        check_status(unsafe { ffi::X509_up_ref(ptr.as_ptr()) }, RESOURCE, "up-ref")?;

        Ok(Self {
            handle: unsafe { PointerWrapper::from_non_null(ptr, free_x509, RESOURCE) },
        })
    }

    /// Borrow as an `openssl` crate reference
    pub fn as_x509_ref(&self) -> Result<&X509Ref> {
        let ptr = self.handle.get()?;
        Ok(unsafe { X509Ref::from_ptr(ptr.as_ptr()) })
    }

    /// Convert into an owned `openssl` crate certificate sharing the same native object
    pub fn to_x509(&self) -> Result<X509> {
        Ok(self.as_x509_ref()?.to_owned())
    }

    /// Subject name in one-line `SN=value, ...` form
    pub fn subject_name(&self) -> Result<String> {
        let mut parts = Vec::new();

        for entry in self.as_x509_ref()?.subject_name().entries() {
            let key = entry.object().nid().short_name()?;
            let value = String::from_utf8_lossy(entry.data().as_slice());
            parts.push(format!("{}={}", key, value));
        }

        Ok(parts.join(", "))
    }

    /// SHA-256 fingerprint as colon-separated upper-case hex
    pub fn fingerprint(&self) -> Result<String> {
        let digest = self.as_x509_ref()?.digest(MessageDigest::sha256())?;

        Ok(digest
            .iter()
            .map(|byte| format!("{:02X}", byte))
            .collect::<Vec<_>>()
            .join(":"))
    }

    /// The raw `X509*`, null for an empty wrapper
    pub fn raw(&self) -> *mut ffi::X509 {
        self.handle.raw()
    }

    /// Whether the wrapper holds no handle
    pub fn is_null(&self) -> bool {
        self.handle.is_null()
    }

    /// Whether dropping this wrapper releases a native reference
    pub fn is_owning(&self) -> bool {
        self.handle.is_owning()
    }

    /// A non-owning view of the handle
    pub fn alias(&self) -> Alias<'_, ffi::X509> {
        self.handle.alias()
    }

    pub(crate) fn handle(&self) -> &PointerWrapper<ffi::X509> {
        &self.handle
    }
}

impl From<X509> for Certificate {
    fn from(cert: X509) -> Self {
        let cert = ManuallyDrop::new(cert);

        match NonNull::new(cert.as_ptr()) {
            Some(ptr) => Self {
                handle: unsafe { PointerWrapper::from_non_null(ptr, free_x509, RESOURCE) },
            },
            None => Self::empty(),
        }
    }
}

impl Default for Certificate {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Certificate {}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate").field("handle", &self.handle).finish()
    }
}
