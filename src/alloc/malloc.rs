//! The platform heap as an allocation strategy.

use std::ptr::NonNull;

use tracing::trace;

use super::RawAllocator;
use crate::error::{BufferError, Result};

/// Allocates from the C heap with `malloc`/`calloc` and releases with `free`.
///
/// Memory from this strategy can be handed to native code that frees it with
/// `free`, and memory that native code obtained from `malloc` can be released
/// through it. Zero-byte requests are rounded up to one byte so a successful
/// allocation never returns null.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Malloc;

impl RawAllocator for Malloc {
    fn allocate(&self, byte_count: usize) -> Result<NonNull<u8>> {
        // SAFETY: malloc has no preconditions.
        let ptr = unsafe { libc::malloc(byte_count.max(1)) };
        trace!(bytes = byte_count, address = ?ptr, "malloc");
        NonNull::new(ptr.cast()).ok_or(BufferError::AllocationFailed { bytes: byte_count })
    }

    fn allocate_zeroed(&self, byte_count: usize) -> Result<NonNull<u8>> {
        // SAFETY: calloc has no preconditions.
        let ptr = unsafe { libc::calloc(byte_count.max(1), 1) };
        trace!(bytes = byte_count, address = ?ptr, "calloc");
        NonNull::new(ptr.cast()).ok_or(BufferError::AllocationFailed { bytes: byte_count })
    }

    unsafe fn free(&self, address: *mut u8) {
        trace!(address = ?address, "free");
        // SAFETY: caller guarantees `address` is null or a live malloc block.
        unsafe { libc::free(address.cast()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_free() {
        let ptr = Malloc.allocate(64).unwrap();
        unsafe {
            ptr.as_ptr().write_bytes(0xAB, 64);
            assert_eq!(*ptr.as_ptr().add(63), 0xAB);
            Malloc.free(ptr.as_ptr());
        }
    }

    #[test]
    fn test_allocate_zeroed() {
        let ptr = Malloc.allocate_zeroed(32).unwrap();
        let bytes = unsafe { std::slice::from_raw_parts(ptr.as_ptr(), 32) };
        assert!(bytes.iter().all(|&b| b == 0));
        unsafe { Malloc.free(ptr.as_ptr()) };
    }

    #[test]
    fn test_zero_byte_request_is_non_null() {
        let ptr = Malloc.allocate(0).unwrap();
        unsafe { Malloc.free(ptr.as_ptr()) };
    }

    #[test]
    fn test_free_null_is_noop() {
        unsafe { Malloc.free(std::ptr::null_mut()) };
    }
}
