//! Allocation strategies.
//!
//! Every allocating entry point in this crate takes a [`RawAllocator`] value
//! instead of calling a process-wide allocator, so arenas, pools or
//! platform-specific heaps can be swapped in without touching handle code.
//!
//! - [`Malloc`] - The platform heap (`malloc`/`calloc`/`free`)
//! - [`BlockPool`] - Fixed-size blocks recycled through a free list
//! - [`Tracked`] - Wraps another strategy and counts live allocations

mod malloc;
mod pool;
mod tracked;

use std::ptr::NonNull;

use crate::error::{BufferError, Result};

pub use malloc::Malloc;
pub use pool::BlockPool;
pub use tracked::{AllocStats, Tracked};

/// A source of raw, unmanaged memory.
///
/// Implementations are assumed not to relocate memory they have handed out.
/// `free` receives only the address, so strategies that need a size must
/// derive it themselves (see [`BlockPool`]).
///
/// Requests carry no alignment. Typed allocation checks the address it gets
/// back and fails with [`BufferError::Misaligned`] when it does not suit the
/// element type, freeing the block first. [`Malloc`] guarantees only the
/// platform's fundamental alignment (16 bytes on common 64-bit targets), so
/// over-aligned types such as `#[repr(align(64))]` structs need a strategy
/// that aligns its blocks.
pub trait RawAllocator {
    /// Allocates `byte_count` bytes of uninitialized memory.
    ///
    /// Failure is reported as [`BufferError::AllocationFailed`] and is passed
    /// through unmodified by every caller in this crate.
    fn allocate(&self, byte_count: usize) -> Result<NonNull<u8>>;

    /// Allocates `byte_count` zero-filled bytes.
    fn allocate_zeroed(&self, byte_count: usize) -> Result<NonNull<u8>> {
        let ptr = self.allocate(byte_count)?;
        // SAFETY: `allocate` returned a block of at least `byte_count` bytes.
        unsafe { ptr.as_ptr().write_bytes(0, byte_count) };
        Ok(ptr)
    }

    /// Returns memory to the strategy.
    ///
    /// Freeing the null address is a no-op for every strategy in this crate.
    ///
    /// # Safety
    ///
    /// `address` must be null or have been returned by this strategy and not
    /// freed since. Nothing may access the memory afterwards.
    unsafe fn free(&self, address: *mut u8);
}

impl<A: RawAllocator + ?Sized> RawAllocator for &A {
    fn allocate(&self, byte_count: usize) -> Result<NonNull<u8>> {
        (**self).allocate(byte_count)
    }

    fn allocate_zeroed(&self, byte_count: usize) -> Result<NonNull<u8>> {
        (**self).allocate_zeroed(byte_count)
    }

    unsafe fn free(&self, address: *mut u8) {
        // SAFETY: forwarded contract.
        unsafe { (**self).free(address) }
    }
}

/// Computes `length * size_of::<T>()`, reporting overflow.
pub(crate) fn byte_size<T>(length: usize) -> Result<usize> {
    let element_size = size_of::<T>();
    length
        .checked_mul(element_size)
        .ok_or(BufferError::SizeOverflow {
            length,
            element_size,
        })
}

/// Allocates room for `length` values of `T`, checking the alignment the
/// strategy delivered. A misaligned block is freed before the error returns.
pub(crate) fn allocate_elements<T, A: RawAllocator + ?Sized>(
    alloc: &A,
    length: usize,
    zeroed: bool,
) -> Result<NonNull<T>> {
    let bytes = byte_size::<T>(length)?;
    let ptr = if zeroed {
        alloc.allocate_zeroed(bytes)?
    } else {
        alloc.allocate(bytes)?
    };

    let align = align_of::<T>();
    if (ptr.as_ptr() as usize) % align != 0 {
        // SAFETY: the block came from `alloc` a moment ago and was never shared.
        unsafe { alloc.free(ptr.as_ptr()) };
        return Err(BufferError::Misaligned {
            address: ptr.as_ptr() as usize,
            align,
        });
    }

    Ok(ptr.cast())
}
