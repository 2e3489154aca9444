//! Handles that decode once.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ptr;

use tracing::trace;

use super::marshal::{FreeFn, Marshaler};
use crate::error::Result;

/// The address of a native string plus its value decoded at construction.
///
/// [`read`](Self::read) returns the cached value and never touches native
/// memory again, so later native writes are not observed. Releasing frees
/// the memory, nulls the address and clears the cached value.
///
/// # Example
///
/// ```
/// use nativebuf::{CachedStringHandle, Marshaler};
///
/// let mut handle = CachedStringHandle::new("cached", &Marshaler::UTF8)?;
/// assert_eq!(handle.read(), "cached");
/// handle.release();
/// assert_eq!(handle.read(), "");
/// # Ok::<(), nativebuf::BufferError>(())
/// ```
#[must_use = "a CachedStringHandle leaks its memory unless released"]
pub struct CachedStringHandle {
    ptr: *mut u8,
    value: String,
    free: Option<FreeFn>,
}

impl CachedStringHandle {
    /// Encodes `value` into native memory and caches it.
    pub fn new(value: &str, marshaler: &Marshaler) -> Result<Self> {
        let ptr = marshaler.encode(value)?;
        trace!(address = ?ptr, marshaler = marshaler.label(), "cached string handle created");
        Ok(Self {
            ptr: ptr.as_ptr(),
            value: value.to_owned(),
            free: marshaler.freer(),
        })
    }

    /// Wraps an address produced by native code, decoding it once.
    ///
    /// # Safety
    ///
    /// Same contract as [`StringHandle::from_raw`](super::StringHandle::from_raw).
    pub unsafe fn from_raw(ptr: *mut u8, marshaler: &Marshaler) -> Self {
        // SAFETY: forwarded contract.
        let value = unsafe { marshaler.decode(ptr) };
        Self {
            ptr,
            value,
            free: marshaler.freer(),
        }
    }

    /// The cached value.
    pub fn read(&self) -> &str {
        &self.value
    }

    /// The address, null once released.
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr
    }

    /// Returns true once [`release`](Self::release) has run.
    pub fn is_released(&self) -> bool {
        self.ptr.is_null()
    }

    /// Frees the memory, sets the address to null and clears the cache.
    pub fn release(&mut self) {
        trace!(address = ?self.ptr, "cached string handle released");
        if let Some(free) = self.free {
            // SAFETY: see `StringHandle::release`.
            unsafe { free(self.ptr) };
        }
        self.ptr = ptr::null_mut();
        self.value.clear();
    }

    /// Gives up the address without freeing it.
    pub fn into_raw(self) -> *mut u8 {
        self.ptr
    }
}

impl PartialEq for CachedStringHandle {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.ptr, other.ptr)
    }
}

impl Eq for CachedStringHandle {}

impl Hash for CachedStringHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ptr.hash(state);
    }
}

impl fmt::Debug for CachedStringHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedStringHandle")
            .field("address", &self.ptr)
            .field("value", &self.value)
            .finish()
    }
}

impl fmt::Display for CachedStringHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

// SAFETY: as for `StringHandle`.
unsafe impl Send for CachedStringHandle {}
