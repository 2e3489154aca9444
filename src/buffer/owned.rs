//! Owning buffers whose slices borrow from them.

use std::any::type_name;
use std::fmt;
use std::hash::{Hash, Hasher};

use bytes::Bytes;
use tracing::trace;

use super::{Plain, RawBuffer, ReadOnlyBuffer};
use crate::alloc::{Malloc, RawAllocator};
use crate::config::BoundsPolicy;
use crate::error::Result;

/// Zero-initialized unmanaged memory for `len` values of `T`, plus the
/// strategy that allocated it.
///
/// Where [`RawBuffer`] leaves lifetimes to the caller, `OwnedBuffer` lets the
/// compiler check them: slices are ordinary `&[T]`/`&mut [T]` borrowed from
/// the owner, and [`release`](Self::release) consumes it, so releasing while
/// a slice is alive does not compile and a released buffer cannot be used
/// again.
///
/// There is no `Drop` impl. A buffer that is never released leaks its
/// memory, the same as the raw form.
///
/// ```compile_fail
/// use nativebuf::{Malloc, OwnedBuffer};
///
/// let buf = OwnedBuffer::<u8>::allocate_in(Malloc, 4).unwrap();
/// let slice = buf.as_slice();
/// buf.release();
/// assert_eq!(slice.len(), 4);
/// ```
///
/// # Example
///
/// ```
/// use nativebuf::{Malloc, OwnedBuffer};
///
/// let mut buf = OwnedBuffer::<u32>::allocate_in(Malloc, 4)?;
/// buf.as_mut_slice().copy_from_slice(&[1, 2, 3, 4]);
/// assert_eq!(buf.as_slice()[2], 3);
/// buf.release();
/// # Ok::<(), nativebuf::BufferError>(())
/// ```
#[must_use = "an OwnedBuffer leaks its memory unless released"]
pub struct OwnedBuffer<T: Plain, A: RawAllocator = Malloc> {
    raw: RawBuffer<T>,
    alloc: A,
}

impl<T: Plain, A: RawAllocator> OwnedBuffer<T, A> {
    /// Allocates `length` zeroed elements from `alloc`.
    pub fn allocate_in(alloc: A, length: usize) -> Result<Self> {
        let raw = RawBuffer::allocate_zeroed_in(&alloc, length)?;
        trace!(address = ?raw.as_ptr(), len = length, "owned buffer allocated");
        Ok(Self { raw, alloc })
    }

    /// Allocates a buffer from `alloc` holding a copy of `values`.
    pub fn from_slice_in(alloc: A, values: &[T]) -> Result<Self> {
        let mut buf = Self::allocate_in(alloc, values.len())?;
        buf.as_mut_slice().copy_from_slice(values);
        Ok(buf)
    }

    /// Takes ownership of memory described by `raw`.
    ///
    /// # Safety
    ///
    /// `raw` must cover exactly one unreleased, initialized block obtained
    /// from `alloc`, and nothing else may free it.
    pub unsafe fn from_raw_in(raw: RawBuffer<T>, alloc: A) -> Self {
        Self { raw, alloc }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns true if the buffer has no elements.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Number of bytes owned.
    pub fn byte_len(&self) -> usize {
        self.raw.byte_len()
    }

    /// The base address.
    pub fn as_ptr(&self) -> *const T {
        self.raw.as_ptr().cast_const()
    }

    /// The base address, for handing to native code that writes.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.raw.as_ptr()
    }

    /// Returns the allocation strategy.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Borrows the contents.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the memory is owned, zero-initialized and `T: Plain`.
        unsafe { self.raw.as_slice() }
    }

    /// Borrows the contents mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as `as_slice`, and `&mut self` rules out other borrows.
        unsafe { self.raw.as_mut_slice() }
    }

    /// Checked slice of `length` elements at `start` under `policy`.
    pub fn try_slice_with(
        &self,
        policy: BoundsPolicy,
        start: usize,
        length: usize,
    ) -> Result<&[T]> {
        let raw = self.raw.try_slice_with(policy, start, length)?;
        // SAFETY: `raw` lies within owned memory and borrows `self`.
        Ok(unsafe { raw.as_slice() })
    }

    /// Checked mutable slice of `length` elements at `start` under `policy`.
    pub fn try_slice_mut_with(
        &mut self,
        policy: BoundsPolicy,
        start: usize,
        length: usize,
    ) -> Result<&mut [T]> {
        let raw = self.raw.try_slice_with(policy, start, length)?;
        // SAFETY: `raw` lies within owned memory and borrows `self` mutably.
        Ok(unsafe { raw.as_mut_slice() })
    }

    /// Copies the contents into `dest`, failing if it is shorter.
    pub fn copy_to(&self, dest: &mut [T]) -> Result<()> {
        super::raw::check_destination(self.len(), dest.len())?;
        dest[..self.len()].copy_from_slice(self.as_slice());
        Ok(())
    }

    /// The underlying raw view, for passing to native routines.
    ///
    /// The view is only valid until the buffer is released; the compiler does
    /// not track it.
    pub fn as_raw(&mut self) -> RawBuffer<T> {
        self.raw
    }

    /// A read-only view of the contents, untracked like [`as_raw`](Self::as_raw).
    pub fn read_only(&self) -> ReadOnlyBuffer<T> {
        self.raw.read_only()
    }

    /// Copies the contents into a new [`Bytes`].
    pub fn to_bytes(&self) -> Bytes {
        // SAFETY: owned, initialized memory.
        unsafe { self.read_only().to_bytes() }
    }

    /// BLAKE3 hash of the contents.
    #[cfg(feature = "hash-blake3")]
    pub fn content_hash(&self) -> crate::ContentHash {
        // SAFETY: owned, initialized memory.
        unsafe { self.read_only().content_hash() }
    }

    /// Gives up ownership without freeing.
    ///
    /// The caller becomes responsible for releasing the returned view with
    /// the returned strategy.
    pub fn into_raw(self) -> (RawBuffer<T>, A) {
        (self.raw, self.alloc)
    }

    /// Frees the memory.
    pub fn release(self) {
        trace!(address = ?self.raw.as_ptr(), "owned buffer released");
        // SAFETY: the buffer owns exactly this block from `alloc`, and
        // consuming `self` ends every borrow of it.
        unsafe { self.raw.release_in(&self.alloc) }
    }
}

impl<T: Plain, A: RawAllocator> PartialEq for OwnedBuffer<T, A> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T: Plain, A: RawAllocator> Eq for OwnedBuffer<T, A> {}

impl<T: Plain, A: RawAllocator> Hash for OwnedBuffer<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T: Plain, A: RawAllocator> fmt::Debug for OwnedBuffer<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedBuffer")
            .field("type", &type_name::<T>())
            .field("address", &self.raw.as_ptr())
            .field("len", &self.raw.len())
            .finish()
    }
}

// SAFETY: the buffer is the sole owner of its memory.
unsafe impl<T: Plain + Send, A: RawAllocator + Send> Send for OwnedBuffer<T, A> {}

// SAFETY: shared access only hands out `&[T]`.
unsafe impl<T: Plain + Sync, A: RawAllocator + Sync> Sync for OwnedBuffer<T, A> {}
