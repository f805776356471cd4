//! X.509 certificate store wrapper

use std::fmt;
use std::mem::ManuallyDrop;
use std::path::Path;
use std::ptr::NonNull;

use foreign_types_shared::ForeignType;
use log::debug;
use openssl::x509::store::X509Store;
use openssl_sys as ffi;

use crate::common::error::check_status;
use crate::common::Result;
use crate::pointer::{Alias, PointerWrapper};
use crate::sys;

use super::Certificate;

const RESOURCE: &str = "X509_STORE";

unsafe fn free_store(ptr: *mut ffi::X509_STORE) {
    ffi::X509_STORE_free(ptr)
}

/// A certificate store holding trust anchors
pub struct Store {
    handle: PointerWrapper<ffi::X509_STORE>,
}

impl Store {
    /// Allocate a new, empty store
    pub fn create() -> Result<Self> {
        ffi::init();

        unsafe { Self::take_ownership(ffi::X509_STORE_new()) }
    }

    /// Take ownership of an `X509_STORE*`
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a valid store whose reference is transferred to the wrapper.
    pub unsafe fn take_ownership(ptr: *mut ffi::X509_STORE) -> Result<Self> {
        Ok(Self {
            handle: PointerWrapper::owning(ptr, free_store, RESOURCE)?,
        })
    }

    /// Reference an `X509_STORE*` owned elsewhere
    ///
    /// # Safety
    ///
    /// `ptr` must outlive the returned wrapper.
    pub unsafe fn borrow(ptr: *mut ffi::X509_STORE) -> Result<Self> {
        Ok(Self {
            handle: PointerWrapper::borrowing(ptr, RESOURCE)?,
        })
    }

    /// A store wrapper holding no handle
    pub fn empty() -> Self {
        Self {
            handle: PointerWrapper::empty(RESOURCE),
        }
    }

    /// Add a trusted certificate
    ///
    /// The store takes its own reference to the certificate.
    pub fn add_certificate(&mut self, cert: &Certificate) -> Result<()> {
        let store = self.handle.get()?;
        let cert = cert.handle().get()?;

        check_status(
            unsafe { ffi::X509_STORE_add_cert(store.as_ptr(), cert.as_ptr()) },
            RESOURCE,
            "add certificate",
        )
    }

    /// Add every certificate of a PEM bundle file, returning how many were added
    pub fn load_pem_file(&mut self, path: &Path) -> Result<usize> {
        let certs = Certificate::load_pem_bundle(path)?;

        for cert in &certs {
            self.add_certificate(cert)?;
        }

        debug!("Added {} trusted certificate(s) from {}", certs.len(), path.display());
        Ok(certs.len())
    }

    /// Use the library's default certificate locations
    pub fn set_default_paths(&mut self) -> Result<()> {
        let store = self.handle.get()?;

        check_status(
            unsafe { ffi::X509_STORE_set_default_paths(store.as_ptr()) },
            RESOURCE,
            "set default paths",
        )
    }

    /// Take an additional native reference to the same store
    pub fn share(&self) -> Result<Self> {
        let ptr = self.handle.get()?;
        check_status(unsafe { sys::X509_STORE_up_ref(ptr.as_ptr()) }, RESOURCE, "up-ref")?;

        Ok(Self {
            handle: unsafe { PointerWrapper::from_non_null(ptr, free_store, RESOURCE) },
        })
    }

    /// The raw `X509_STORE*`, null for an empty wrapper
    pub fn raw(&self) -> *mut ffi::X509_STORE {
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
    pub fn alias(&self) -> Alias<'_, ffi::X509_STORE> {
        self.handle.alias()
    }
}

impl From<X509Store> for Store {
    fn from(store: X509Store) -> Self {
        let store = ManuallyDrop::new(store);

        match NonNull::new(store.as_ptr()) {
            Some(ptr) => Self {
                handle: unsafe { PointerWrapper::from_non_null(ptr, free_store, RESOURCE) },
            },
            None => Self::empty(),
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Store {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Store {}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store").field("handle", &self.handle).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::WrapError;
    use openssl::x509::store::X509StoreBuilder;
    use std::ptr;

    #[test]
    fn test_create_store() {
        let store = Store::create().expect("X509_STORE_new should succeed");

        assert!(!store.is_null());
        assert!(store.is_owning());
    }

    #[test]
    fn test_take_ownership_of_null() {
        let result = unsafe { Store::take_ownership(ptr::null_mut()) };
        assert!(matches!(result, Err(WrapError::Allocation { resource: "X509_STORE", .. })));
    }

    #[test]
    fn test_borrowed_store_equals_owner() {
        let store = Store::create().unwrap();
        let borrowed = unsafe { Store::borrow(store.raw()) }.unwrap();

        assert_eq!(store, borrowed);
        assert!(!borrowed.is_owning());
    }

    #[test]
    fn test_share_survives_original() {
        let store = Store::create().unwrap();
        let shared = store.share().unwrap();
        assert_eq!(store, shared);

        drop(store);
        let mut shared = shared;
        assert!(shared.set_default_paths().is_ok());
    }

    #[test]
    fn test_from_openssl_store() {
        let store: Store = X509StoreBuilder::new().unwrap().build().into();

        assert!(store.is_owning());
        assert!(!store.is_null());
    }

    #[test]
    fn test_empty_store_operations() {
        let mut store = Store::default();

        assert!(store.raw().is_null());
        assert!(matches!(store.set_default_paths(), Err(WrapError::NullHandle("X509_STORE"))));
        assert!(matches!(
            store.add_certificate(&Certificate::empty()),
            Err(WrapError::NullHandle("X509_STORE"))
        ));
    }
}
