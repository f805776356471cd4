//! libcrypto declarations not provided by `openssl-sys`
//!
//! All symbols exist since OpenSSL 1.1.0.

use std::os::raw::{c_int, c_ulong};

use openssl_sys::{stack_st_X509, X509_STORE, X509_STORE_CTX};

extern "C" {
    pub fn X509_STORE_up_ref(store: *mut X509_STORE) -> c_int;

    pub fn X509_STORE_CTX_set0_trusted_stack(ctx: *mut X509_STORE_CTX, sk: *mut stack_st_X509);

    pub fn ERR_peek_error() -> c_ulong;
}
