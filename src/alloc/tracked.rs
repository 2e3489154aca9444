//! Allocation counting wrapper.

use std::cell::Cell;
use std::ptr::NonNull;

use super::RawAllocator;
use crate::error::Result;

/// Counters reported by [`Tracked`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AllocStats {
    /// Successful allocations, zeroed or not.
    pub allocations: usize,
    /// Frees of non-null addresses.
    pub frees: usize,
}

impl AllocStats {
    /// Allocations not yet freed.
    pub fn live(&self) -> usize {
        self.allocations.saturating_sub(self.frees)
    }
}

/// Wraps a strategy and counts what passes through it.
///
/// Useful to assert that every handle was released exactly once. Counters
/// are `Cell`s, so a `Tracked` is not `Sync`.
///
/// # Example
///
/// ```
/// use nativebuf::{Malloc, RawBuffer, Tracked};
///
/// let alloc = Tracked::new(Malloc);
/// let buf = RawBuffer::<u32>::allocate_in(&alloc, 4)?;
/// assert_eq!(alloc.stats().live(), 1);
///
/// unsafe { buf.release_in(&alloc) };
/// assert_eq!(alloc.stats().live(), 0);
/// # Ok::<(), nativebuf::BufferError>(())
/// ```
#[derive(Debug, Default)]
pub struct Tracked<A> {
    inner: A,
    allocations: Cell<usize>,
    frees: Cell<usize>,
}

impl<A: RawAllocator> Tracked<A> {
    /// Wraps `inner` with zeroed counters.
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            allocations: Cell::new(0),
            frees: Cell::new(0),
        }
    }

    /// Returns a snapshot of the counters.
    pub fn stats(&self) -> AllocStats {
        AllocStats {
            allocations: self.allocations.get(),
            frees: self.frees.get(),
        }
    }

    /// Returns the wrapped strategy.
    pub fn inner(&self) -> &A {
        &self.inner
    }

    fn record(&self, result: Result<NonNull<u8>>) -> Result<NonNull<u8>> {
        if result.is_ok() {
            self.allocations.set(self.allocations.get() + 1);
        }
        result
    }
}

impl<A: RawAllocator> RawAllocator for Tracked<A> {
    fn allocate(&self, byte_count: usize) -> Result<NonNull<u8>> {
        self.record(self.inner.allocate(byte_count))
    }

    fn allocate_zeroed(&self, byte_count: usize) -> Result<NonNull<u8>> {
        self.record(self.inner.allocate_zeroed(byte_count))
    }

    unsafe fn free(&self, address: *mut u8) {
        if !address.is_null() {
            self.frees.set(self.frees.get() + 1);
        }
        // SAFETY: forwarded contract.
        unsafe { self.inner.free(address) }
    }
}
