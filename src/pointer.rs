//! Ownership-aware wrapper around raw native handles
//!
//! A [`PointerWrapper`] is in one of three modes:
//!
//! - **owning**: it was handed a freshly allocated (or up-referenced) handle and runs its
//!   deleter exactly once when dropped,
//! - **borrowing**: it references a handle owned elsewhere and never releases it,
//! - **empty**: it holds a null handle.
//!
//! Owning wrappers are deliberately not `Clone`. Additional views of the same handle are
//! obtained with [`PointerWrapper::alias`], which the borrow checker keeps from outliving
//! the owner. Additional *owners* can only come from the native library's own reference
//! counting, so the question of who frees a handle always has a single answer.

use std::fmt;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};

use crate::common::{Result, WrapError};

/// Release operation run on an owned handle at end of life
pub type Deleter<T> = unsafe fn(*mut T);

/// Ownership mode of a non-empty wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The wrapper releases the handle when dropped
    Owning,

    /// The handle belongs to someone else
    Borrowing,
}

/// A raw native handle together with its release strategy
pub struct PointerWrapper<T> {
    ptr: *mut T,
    deleter: Option<Deleter<T>>,
    resource: &'static str,
}

impl<T> PointerWrapper<T> {
    /// Create an empty wrapper holding a null handle
    pub const fn empty(resource: &'static str) -> Self {
        Self {
            ptr: ptr::null_mut(),
            deleter: None,
            resource,
        }
    }

    /// Take ownership of `ptr`, releasing it with `deleter` on drop
    ///
    /// A null `ptr` is reported as an allocation failure, together with whatever the native
    /// library left on its error queue.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a valid handle that nothing else will release, and `deleter`
    /// must be the matching release function.
    pub unsafe fn owning(ptr: *mut T, deleter: Deleter<T>, resource: &'static str) -> Result<Self> {
        if ptr.is_null() {
            return Err(WrapError::allocation(resource));
        }

        Ok(Self {
            ptr,
            deleter: Some(deleter),
            resource,
        })
    }

    /// Take ownership of a handle already known to be non-null
    ///
    /// # Safety
    ///
    /// Same contract as [`PointerWrapper::owning`].
    pub unsafe fn from_non_null(ptr: NonNull<T>, deleter: Deleter<T>, resource: &'static str) -> Self {
        Self {
            ptr: ptr.as_ptr(),
            deleter: Some(deleter),
            resource,
        }
    }

    /// Reference `ptr` without taking ownership
    ///
    /// A null `ptr` is rejected; use [`PointerWrapper::empty`] for the empty state.
    ///
    /// # Safety
    ///
    /// `ptr` must stay valid for as long as the wrapper is used. Its true owner remains
    /// responsible for releasing it.
    pub unsafe fn borrowing(ptr: *mut T, resource: &'static str) -> Result<Self> {
        if ptr.is_null() {
            return Err(WrapError::NullHandle(resource));
        }

        Ok(Self {
            ptr,
            deleter: None,
            resource,
        })
    }

    /// The raw handle, null for an empty wrapper
    pub fn raw(&self) -> *mut T {
        self.ptr
    }

    /// The raw handle, or `NullHandle` for an empty wrapper
    pub fn get(&self) -> Result<NonNull<T>> {
        NonNull::new(self.ptr).ok_or(WrapError::NullHandle(self.resource))
    }

    /// Whether the wrapper holds no handle
    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }

    /// Ownership mode, `None` for an empty wrapper
    pub fn ownership(&self) -> Option<Ownership> {
        if self.ptr.is_null() {
            None
        } else if self.deleter.is_some() {
            Some(Ownership::Owning)
        } else {
            Some(Ownership::Borrowing)
        }
    }

    /// Whether dropping this wrapper releases the handle
    pub fn is_owning(&self) -> bool {
        self.ownership() == Some(Ownership::Owning)
    }

    /// Name of the native resource, used in error messages
    pub fn resource(&self) -> &'static str {
        self.resource
    }

    /// A non-owning view of the handle bounded by this wrapper's lifetime
    pub fn alias(&self) -> Alias<'_, T> {
        Alias {
            ptr: self.ptr,
            _owner: PhantomData,
        }
    }

    /// Give up the handle without releasing it
    pub fn into_raw(mut self) -> *mut T {
        self.deleter = None;
        self.ptr
    }
}

impl<T> Drop for PointerWrapper<T> {
    fn drop(&mut self) {
        if let Some(deleter) = self.deleter.take() {
            if !self.ptr.is_null() {
                unsafe { deleter(self.ptr) };
            }
        }
    }
}

impl<T> PartialEq for PointerWrapper<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}

impl<T> Eq for PointerWrapper<T> {}

impl<T> PartialEq<Alias<'_, T>> for PointerWrapper<T> {
    fn eq(&self, other: &Alias<'_, T>) -> bool {
        self.ptr == other.ptr
    }
}

impl<T> fmt::Debug for PointerWrapper<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerWrapper")
            .field("resource", &self.resource)
            .field("ptr", &self.ptr)
            .field("ownership", &self.ownership())
            .finish()
    }
}

/// A non-owning view of a wrapper's handle
///
/// Ties the lifetime of the raw handle to the lifetime of the wrapper it came from.
pub struct Alias<'a, T> {
    ptr: *mut T,
    _owner: PhantomData<&'a PointerWrapper<T>>,
}

impl<T> Alias<'_, T> {
    /// The raw handle, null if the owner is empty
    pub fn raw(&self) -> *mut T {
        self.ptr
    }

    /// Whether the viewed handle is null
    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }
}

impl<T> Clone for Alias<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Alias<'_, T> {}

impl<T> PartialEq for Alias<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}

impl<T> Eq for Alias<'_, T> {}

impl<T> PartialEq<PointerWrapper<T>> for Alias<'_, T> {
    fn eq(&self, other: &PointerWrapper<T>) -> bool {
        self.ptr == other.ptr
    }
}

impl<T> fmt::Debug for Alias<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Alias").field(&self.ptr).finish()
    }
}
