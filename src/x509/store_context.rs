//! X.509 store verification context wrapper
//!
//! A [`StoreContext`] holds the working state of one certificate chain validation pass.
//! It moves through two states:
//!
//! ```text
//! uninitialized --initialize()--> initialized --cleanup()--> uninitialized
//! ```
//!
//! While initialized, the context keeps its own references to the store, the subject
//! certificate and copies of the chain stacks it was given, because the native context
//! only borrows them. Callers are free to drop their inputs after `initialize()`.

use std::fmt;
use std::marker::PhantomData;
use std::os::raw::c_int;
use std::ptr;

use foreign_types_shared::ForeignType;
use log::debug;
use openssl::stack::Stack;
use openssl::x509::{X509, X509VerifyResult};
use openssl_sys as ffi;

use crate::common::error::check_queue_after;
use crate::common::{Result, WrapError};
use crate::pointer::{Alias, PointerWrapper};
use crate::sys;

use super::{Certificate, Store};

const RESOURCE: &str = "X509_STORE_CTX";

/// Native calls made by a [`StoreContext`]
///
/// The default methods forward to libcrypto. A strategy only needs to override the calls
/// it wants to change.
pub trait ContextApi {
    /// Allocate a context, null on failure
    unsafe fn new() -> *mut ffi::X509_STORE_CTX {
        ffi::X509_STORE_CTX_new()
    }

    /// Release a context
    unsafe fn free(ctx: *mut ffi::X509_STORE_CTX) {
        ffi::X509_STORE_CTX_free(ctx)
    }

    /// Bind store, subject and untrusted chain; `1` on success
    unsafe fn init(
        ctx: *mut ffi::X509_STORE_CTX,
        store: *mut ffi::X509_STORE,
        cert: *mut ffi::X509,
        chain: *mut ffi::stack_st_X509,
    ) -> c_int {
        ffi::X509_STORE_CTX_init(ctx, store, cert, chain)
    }

    /// Install an explicit trusted stack
    unsafe fn set_trusted_stack(ctx: *mut ffi::X509_STORE_CTX, certs: *mut ffi::stack_st_X509) {
        sys::X509_STORE_CTX_set0_trusted_stack(ctx, certs)
    }

    /// Reset the verification state
    unsafe fn cleanup(ctx: *mut ffi::X509_STORE_CTX) {
        ffi::X509_STORE_CTX_cleanup(ctx)
    }

    /// Build and verify the chain; `1` valid, `0` invalid, negative on internal error
    unsafe fn verify(ctx: *mut ffi::X509_STORE_CTX) -> c_int {
        ffi::X509_verify_cert(ctx)
    }
}

/// [`ContextApi`] backed directly by libcrypto
#[derive(Debug)]
pub enum OpenSslContextApi {}

impl ContextApi for OpenSslContextApi {}

unsafe fn error_depth_of(ctx: *mut ffi::X509_STORE_CTX) -> Result<u32> {
    depth_from_raw(ffi::X509_STORE_CTX_get_error_depth(ctx))
}

fn depth_from_raw(raw: c_int) -> Result<u32> {
    u32::try_from(raw).map_err(|_| WrapError::State(format!("native error depth {} is negative", raw)))
}

/// Inputs the native context points into while initialized
struct Binding {
    store: Option<Store>,
    cert: Option<Certificate>,
    chain: Option<Stack<X509>>,
    trusted: Option<Stack<X509>>,
}

/// Outcome of a verification pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyOutcome {
    valid: bool,
    code: c_int,
    depth: u32,
}

impl VerifyOutcome {
    /// Whether the chain was verified
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Raw `X509_V_*` verification code, `0` when valid
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Depth in the chain at which verification stopped
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// The verification code as an `openssl` crate value
    pub fn result(&self) -> X509VerifyResult {
        unsafe { X509VerifyResult::from_raw(self.code) }
    }

    /// Human-readable description of the verification code
    pub fn error_string(&self) -> &'static str {
        self.result().error_string()
    }
}

/// A certificate verification context
///
/// `A` selects the native calls; everything but tests uses the libcrypto default.
pub struct StoreContext<A: ContextApi = OpenSslContextApi> {
    // Declared before `binding` so the native context goes before the inputs it borrows
    handle: PointerWrapper<ffi::X509_STORE_CTX>,
    binding: Option<Binding>,
    _api: PhantomData<A>,
}

impl<A: ContextApi> StoreContext<A> {
    /// Allocate a new context
    pub fn create() -> Result<Self> {
        ffi::init();

        let ptr = unsafe { A::new() };
        let ctx = unsafe { Self::take_ownership(ptr) }?;
        debug!("Allocated verification context at {:p}", ctx.raw());

        Ok(ctx)
    }

    /// Take ownership of an `X509_STORE_CTX*`
    ///
    /// A null pointer is reported as an allocation error.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a valid context that nothing else will free.
    pub unsafe fn take_ownership(ptr: *mut ffi::X509_STORE_CTX) -> Result<Self> {
        Ok(Self::with_handle(PointerWrapper::owning(ptr, A::free, RESOURCE)?))
    }

    /// Reference an `X509_STORE_CTX*` owned elsewhere
    ///
    /// # Safety
    ///
    /// `ptr` must outlive the returned wrapper; its owner remains responsible for freeing it.
    pub unsafe fn borrow(ptr: *mut ffi::X509_STORE_CTX) -> Result<Self> {
        Ok(Self::with_handle(PointerWrapper::borrowing(ptr, RESOURCE)?))
    }

    /// A context wrapper holding no handle
    pub fn empty() -> Self {
        Self::with_handle(PointerWrapper::empty(RESOURCE))
    }

    fn with_handle(handle: PointerWrapper<ffi::X509_STORE_CTX>) -> Self {
        Self {
            handle,
            binding: None,
            _api: PhantomData,
        }
    }

    /// Bind the context to a trust store, a subject certificate and untrusted chain certificates
    ///
    /// `store` and `cert` may be omitted. An initialized context is cleaned up first. On
    /// failure the context stays allocated and uninitialized.
    pub fn initialize(&mut self, store: Option<&Store>, cert: Option<&Certificate>, chain: &[Certificate]) -> Result<()> {
        let ctx = self.handle.get()?;

        if self.binding.is_some() {
            self.cleanup()?;
        }

        let binding = Binding {
            store: store.map(Store::share).transpose()?,
            cert: cert.map(Certificate::share).transpose()?,
            chain: if chain.is_empty() { None } else { Some(copy_stack(chain)?) },
            trusted: None,
        };

        let store_ptr = binding.store.as_ref().map_or(ptr::null_mut(), Store::raw);
        let cert_ptr = binding.cert.as_ref().map_or(ptr::null_mut(), Certificate::raw);
        let chain_ptr = binding.chain.as_ref().map_or(ptr::null_mut(), |stack| stack.as_ptr());

        unsafe { ffi::ERR_clear_error() };

        if unsafe { A::init(ctx.as_ptr(), store_ptr, cert_ptr, chain_ptr) } == 0 {
            return Err(WrapError::initialization(RESOURCE));
        }

        debug!(
            "Initialized verification context at {:p} ({} untrusted chain certificate(s))",
            ctx.as_ptr(),
            chain.len()
        );
        self.binding = Some(binding);

        Ok(())
    }

    /// Install an explicit set of trusted certificates for this pass, bypassing the store
    ///
    /// Must be called after [`StoreContext::initialize`].
    pub fn set_trusted_certificates(&mut self, certs: &[Certificate]) -> Result<()> {
        let ctx = self.handle.get()?;
        let binding = self.binding.as_mut().ok_or_else(|| {
            WrapError::State("trusted certificates require an initialized context".to_string())
        })?;

        let stack = copy_stack(certs)?;
        let stack_ptr = stack.as_ptr();
        // Keep the previous stack alive until the context points at the new one
        let previous = binding.trusted.replace(stack);

        let result = check_queue_after(RESOURCE, "set trusted certificates", || unsafe {
            A::set_trusted_stack(ctx.as_ptr(), stack_ptr)
        });
        drop(previous);

        debug!("Installed {} trusted certificate(s)", certs.len());
        result
    }

    /// Reset the verification state so the context can be initialized again
    pub fn cleanup(&mut self) -> Result<()> {
        let ctx = self.handle.get()?;

        let result = check_queue_after(RESOURCE, "cleanup", || unsafe {
            A::cleanup(ctx.as_ptr())
        });
        // The native context no longer references the inputs
        self.binding = None;

        result
    }

    /// Run one verification pass
    pub fn verify(&mut self) -> Result<VerifyOutcome> {
        let ctx = self.handle.get()?;
        if self.binding.is_none() {
            return Err(WrapError::State("verification requires an initialized context".to_string()));
        }

        unsafe { ffi::ERR_clear_error() };

        let ret = unsafe { A::verify(ctx.as_ptr()) };
        if ret < 0 {
            return Err(WrapError::native(RESOURCE, "verify"));
        }

        let outcome = VerifyOutcome {
            valid: ret == 1,
            code: unsafe { ffi::X509_STORE_CTX_get_error(ctx.as_ptr()) },
            depth: unsafe { error_depth_of(ctx.as_ptr()) }?,
        };
        debug!("Verification finished: {} (depth {})", outcome.error_string(), outcome.depth);

        Ok(outcome)
    }

    /// Verification error code of the last pass
    pub fn error(&self) -> Result<X509VerifyResult> {
        let ctx = self.handle.get()?;
        Ok(unsafe { X509VerifyResult::from_raw(ffi::X509_STORE_CTX_get_error(ctx.as_ptr())) })
    }

    /// Depth of the certificate the last error refers to
    pub fn error_depth(&self) -> Result<u32> {
        let ctx = self.handle.get()?;
        unsafe { error_depth_of(ctx.as_ptr()) }
    }

    /// An owning reference to the certificate being examined when verification stopped
    pub fn current_certificate(&self) -> Result<Option<Certificate>> {
        let ctx = self.handle.get()?;
        let ptr = unsafe { ffi::X509_STORE_CTX_get_current_cert(ctx.as_ptr()) };

        if ptr.is_null() {
            return Ok(None);
        }

        // The context keeps its own reference; borrow it just long enough to share
        let borrowed = unsafe { Certificate::borrow(ptr) }?;
        borrowed.share().map(Some)
    }

    /// Whether `initialize()` has succeeded since the last cleanup
    pub fn is_initialized(&self) -> bool {
        self.binding.is_some()
    }

    /// The raw `X509_STORE_CTX*`, null for an empty wrapper
    pub fn raw(&self) -> *mut ffi::X509_STORE_CTX {
        self.handle.raw()
    }

    /// Whether the wrapper holds no handle
    pub fn is_null(&self) -> bool {
        self.handle.is_null()
    }

    /// Whether dropping this wrapper frees the context
    pub fn is_owning(&self) -> bool {
        self.handle.is_owning()
    }

    /// A non-owning view of the handle
    pub fn alias(&self) -> Alias<'_, ffi::X509_STORE_CTX> {
        self.handle.alias()
    }
}

/// Copy certificates into a fresh native stack, taking a reference to each
fn copy_stack(certs: &[Certificate]) -> Result<Stack<X509>> {
    let mut stack = Stack::new()?;

    for cert in certs {
        stack.push(cert.to_x509()?)?;
    }

    Ok(stack)
}

impl<A: ContextApi> Drop for StoreContext<A> {
    fn drop(&mut self) {
        // A borrowed native context outlives this wrapper and must stop pointing at our inputs
        if self.binding.is_some() && !self.handle.is_owning() {
            if let Ok(ctx) = self.handle.get() {
                unsafe { A::cleanup(ctx.as_ptr()) };
            }
        }
    }
}

impl<A: ContextApi> Default for StoreContext<A> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<A: ContextApi> PartialEq for StoreContext<A> {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl<A: ContextApi> Eq for StoreContext<A> {}

impl<A: ContextApi> fmt::Debug for StoreContext<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreContext")
            .field("handle", &self.handle)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_context() {
        let ctx = StoreContext::<OpenSslContextApi>::create().expect("X509_STORE_CTX_new should succeed");

        assert!(!ctx.is_null());
        assert!(ctx.is_owning());
        assert!(!ctx.is_initialized());
    }

    #[test]
    fn test_empty_context_reports_null_handle() {
        let mut ctx: StoreContext = StoreContext::empty();

        assert!(ctx.raw().is_null());
        assert!(matches!(ctx.cleanup(), Err(WrapError::NullHandle(RESOURCE))));
        assert!(matches!(ctx.verify(), Err(WrapError::NullHandle(RESOURCE))));
        assert!(matches!(ctx.initialize(None, None, &[]), Err(WrapError::NullHandle(RESOURCE))));
    }

    #[test]
    fn test_verify_requires_initialization() {
        let mut ctx: StoreContext = StoreContext::create().unwrap();
        assert!(matches!(ctx.verify(), Err(WrapError::State(_))));
        assert!(matches!(ctx.set_trusted_certificates(&[]), Err(WrapError::State(_))));
    }

    #[test]
    fn test_initialize_without_inputs() {
        let mut ctx: StoreContext = StoreContext::create().unwrap();

        ctx.initialize(None, None, &[]).expect("init with no inputs should succeed");
        assert!(ctx.is_initialized());

        ctx.cleanup().unwrap();
        assert!(!ctx.is_initialized());
    }

    #[test]
    fn test_outcome_accessors() {
        let outcome = VerifyOutcome { valid: true, code: 0, depth: 0 };

        assert!(outcome.is_valid());
        assert_eq!(outcome.result(), X509VerifyResult::OK);
        assert_eq!(outcome.error_string(), "ok");
    }

    #[test]
    fn test_negative_depth_is_rejected() {
        assert_eq!(depth_from_raw(2).unwrap(), 2);
        assert!(matches!(depth_from_raw(-1), Err(WrapError::State(_))));
    }
}
