//! Mutable `{address, length}` views over unmanaged memory.

use std::any::type_name;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ptr::{self, NonNull};

use super::ReadOnlyBuffer;
use crate::alloc::{RawAllocator, allocate_elements, byte_size};
use crate::config::BoundsPolicy;
use crate::error::{BufferError, Result};

/// A mutable view of `len` values of `T` starting at a raw address.
///
/// `RawBuffer` never owns what it describes: copying the view is free, and
/// nothing is freed when it goes out of scope. Memory obtained through
/// [`allocate_in`](Self::allocate_in) must be handed back with
/// [`release_in`](Self::release_in). `RawBuffer<u8>` is the byte-oriented
/// variant; any other `T` gives the element-typed variant, where lengths
/// count elements and [`byte_len`](Self::byte_len) counts bytes.
///
/// The address is null only when the length is zero; `RawBuffer::empty()`
/// is the canonical empty view.
///
/// Slices share the parent's memory and carry no lifetime. Releasing the
/// parent while a slice, a reference from [`as_ref`](Self::as_ref) or a
/// `&[T]` from [`as_slice`](Self::as_slice) is still in use is a
/// use-after-free the compiler cannot see. Use
/// [`OwnedBuffer`](crate::OwnedBuffer) when that should be checked.
///
/// Equality compares address and length only, never content.
///
/// # Example
///
/// ```
/// use nativebuf::{Malloc, RawBuffer};
///
/// let buf = RawBuffer::<u8>::allocate_zeroed_in(&Malloc, 16)?;
/// let words = buf.cast::<u32>();
/// assert_eq!(words.len(), 4);
///
/// unsafe {
///     words.set_unchecked(1, 0xDEAD_BEEF);
///     assert_eq!(words.get_unchecked(1), 0xDEAD_BEEF);
///     buf.release_in(&Malloc);
/// }
/// # Ok::<(), nativebuf::BufferError>(())
/// ```
pub struct RawBuffer<T = u8> {
    ptr: *mut T,
    len: usize,
}

impl<T> RawBuffer<T> {
    /// The empty view: null address, zero length.
    pub const fn empty() -> Self {
        Self {
            ptr: ptr::null_mut(),
            len: 0,
        }
    }

    /// Allocates uninitialized room for `length` elements from `alloc`.
    ///
    /// The caller owns the memory and must release it with
    /// [`release_in`](Self::release_in) on the same strategy. A zero length
    /// returns the empty view without touching the allocator.
    ///
    /// # Errors
    ///
    /// [`BufferError::SizeOverflow`] if the byte size does not fit in
    /// `usize`, [`BufferError::Misaligned`] if the strategy returned memory
    /// unsuitable for `T`, or whatever the strategy itself reports.
    pub fn allocate_in<A: RawAllocator + ?Sized>(alloc: &A, length: usize) -> Result<Self> {
        Self::allocate_with(alloc, length, false)
    }

    /// Like [`allocate_in`](Self::allocate_in), with the memory zero-filled.
    pub fn allocate_zeroed_in<A: RawAllocator + ?Sized>(alloc: &A, length: usize) -> Result<Self> {
        Self::allocate_with(alloc, length, true)
    }

    fn allocate_with<A: RawAllocator + ?Sized>(
        alloc: &A,
        length: usize,
        zeroed: bool,
    ) -> Result<Self> {
        if length == 0 {
            return Ok(Self::empty());
        }

        let ptr = allocate_elements::<T, A>(alloc, length, zeroed)?;
        Ok(Self {
            ptr: ptr.as_ptr(),
            len: length,
        })
    }

    /// Hands the described memory back to `alloc`.
    ///
    /// Releasing the empty view frees the null address, which every strategy
    /// in this crate ignores.
    ///
    /// # Safety
    ///
    /// The view must cover exactly a block returned by `alloc` (the value
    /// from `allocate_in`, not a slice of it) that has not been released.
    /// Every copy, slice and reference derived from it dangles afterwards.
    pub unsafe fn release_in<A: RawAllocator + ?Sized>(self, alloc: &A) {
        // SAFETY: upheld by the caller.
        unsafe { alloc.free(self.ptr.cast()) }
    }

    /// Describes `length` elements at `ptr`.
    ///
    /// Creating a view never dereferences it; every access is a separate
    /// `unsafe` call.
    ///
    /// # Errors
    ///
    /// [`BufferError::NullAddress`] if `ptr` is null and `length > 0`,
    /// [`BufferError::SizeOverflow`] if the byte size does not fit in `usize`.
    /// A null `ptr` with zero length yields the empty view.
    pub fn wrap(ptr: *mut T, length: usize) -> Result<Self> {
        if ptr.is_null() && length > 0 {
            return Err(BufferError::NullAddress { length });
        }
        byte_size::<T>(length)?;

        Ok(Self { ptr, len: length })
    }

    /// Describes `length` elements at `ptr` without validation.
    ///
    /// # Safety
    ///
    /// `ptr` may be null only if `length == 0`, and `length * size_of::<T>()`
    /// must not overflow. Checked with `debug_assert!` only.
    pub unsafe fn wrap_unchecked(ptr: *mut T, length: usize) -> Self {
        debug_assert!(!ptr.is_null() || length == 0, "null address with non-zero length");
        Self { ptr, len: length }
    }

    /// Views the memory of a Rust slice.
    ///
    /// The view does not borrow `slice`; it must not be used once the slice's
    /// storage is gone.
    pub fn from_slice(slice: &mut [T]) -> Self {
        Self {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
        }
    }

    /// Number of elements.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the view has no elements.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of one element in bytes.
    pub const fn element_size(&self) -> usize {
        size_of::<T>()
    }

    /// Number of bytes described: `len() * size_of::<T>()`.
    pub const fn byte_len(&self) -> usize {
        self.len * size_of::<T>()
    }

    /// The base address.
    pub const fn as_ptr(&self) -> *mut T {
        self.ptr
    }

    /// The base address as an integer.
    pub fn address(&self) -> usize {
        self.ptr as usize
    }

    /// Projects to a read-only view of the same memory.
    pub const fn read_only(self) -> ReadOnlyBuffer<T> {
        ReadOnlyBuffer::from_raw(self)
    }

    /// Reinterprets the element type.
    ///
    /// The new length is `byte_len() / size_of::<U>()`; trailing bytes that do
    /// not fill a whole `U` are dropped from the view. Alignment is not
    /// checked.
    pub const fn cast<U>(self) -> RawBuffer<U> {
        const { assert!(size_of::<U>() != 0, "cannot cast to a zero-sized type") };
        RawBuffer {
            ptr: self.ptr.cast(),
            len: self.byte_len() / size_of::<U>(),
        }
    }

    /// Checked slice of `length` elements at `start` under
    /// [`BoundsPolicy::Strict`].
    pub fn try_slice(self, start: usize, length: usize) -> Result<Self> {
        self.try_slice_with(BoundsPolicy::Strict, start, length)
    }

    /// Checked slice from `start` to the end under [`BoundsPolicy::Strict`].
    pub fn try_slice_from(self, start: usize) -> Result<Self> {
        self.try_slice_with(BoundsPolicy::Strict, start, self.len.saturating_sub(start))
    }

    /// Checked slice of `length` elements at `start` under `policy`.
    ///
    /// The result starts at `address + start * size_of::<T>()`.
    pub fn try_slice_with(self, policy: BoundsPolicy, start: usize, length: usize) -> Result<Self> {
        policy.check(start, length, self.len)?;
        Ok(Self {
            ptr: self.ptr.wrapping_add(start),
            len: length,
        })
    }

    /// Slice of `length` elements at `start` without bounds checking.
    ///
    /// # Safety
    ///
    /// `start <= len()` and `length <= len() - start`. Checked with
    /// `debug_assert!` only.
    pub unsafe fn slice_unchecked(self, start: usize, length: usize) -> Self {
        debug_assert!(
            BoundsPolicy::InclusiveEnd.accepts(start, length, self.len),
            "slice out of range"
        );
        Self {
            ptr: self.ptr.wrapping_add(start),
            len: length,
        }
    }

    /// Slice from `start` to the end without bounds checking.
    ///
    /// # Safety
    ///
    /// `start <= len()`. Checked with `debug_assert!` only.
    pub unsafe fn slice_from_unchecked(self, start: usize) -> Self {
        debug_assert!(start <= self.len, "slice start out of range");
        Self {
            ptr: self.ptr.wrapping_add(start),
            len: self.len - start,
        }
    }

    /// Splits into `[0, mid)` and `[mid, len)`.
    ///
    /// The halves never overlap, so each may be handed to a different thread.
    pub fn split_at(self, mid: usize) -> Result<(Self, Self)> {
        if mid > self.len {
            return Err(BufferError::SliceOutOfRange {
                start: mid,
                length: 0,
                available: self.len,
            });
        }

        let tail = Self {
            ptr: self.ptr.wrapping_add(mid),
            len: self.len - mid,
        };
        Ok((Self { ptr: self.ptr, len: mid }, tail))
    }

    /// Copies every element into `dest`, assuming the ranges do not overlap.
    ///
    /// # Safety
    ///
    /// Both views must describe live memory, `dest.len() >= self.len()`
    /// (checked with `debug_assert!` only) and the ranges must not overlap.
    /// Use [`copy_to_safe`](Self::copy_to_safe) when they might.
    pub unsafe fn copy_to(&self, dest: RawBuffer<T>) {
        debug_assert!(dest.len >= self.len, "destination too small");
        if self.len == 0 {
            return;
        }
        // SAFETY: upheld by the caller; both pointers are non-null here.
        unsafe { ptr::copy_nonoverlapping(self.ptr, dest.ptr, self.len) }
    }

    /// Copies every element into `dest`, correct even when the ranges overlap.
    ///
    /// # Safety
    ///
    /// Both views must describe live memory and `dest.len() >= self.len()`
    /// (checked with `debug_assert!` only).
    pub unsafe fn copy_to_safe(&self, dest: RawBuffer<T>) {
        debug_assert!(dest.len >= self.len, "destination too small");
        if self.len == 0 {
            return;
        }
        // SAFETY: upheld by the caller; `ptr::copy` tolerates overlap.
        unsafe { ptr::copy(self.ptr, dest.ptr, self.len) }
    }

    /// [`copy_to`](Self::copy_to) with the length precondition checked.
    ///
    /// # Safety
    ///
    /// Both views must describe live memory and must not overlap.
    pub unsafe fn try_copy_to(&self, dest: RawBuffer<T>) -> Result<()> {
        check_destination(self.len, dest.len)?;
        // SAFETY: length checked above, the rest is upheld by the caller.
        unsafe { self.copy_to(dest) };
        Ok(())
    }

    /// [`copy_to_safe`](Self::copy_to_safe) with the length precondition
    /// checked.
    ///
    /// # Safety
    ///
    /// Both views must describe live memory.
    pub unsafe fn try_copy_to_safe(&self, dest: RawBuffer<T>) -> Result<()> {
        check_destination(self.len, dest.len)?;
        // SAFETY: length checked above, the rest is upheld by the caller.
        unsafe { self.copy_to_safe(dest) };
        Ok(())
    }

    /// Reinterprets the base address as a `&U`.
    ///
    /// Neither size nor alignment is validated.
    ///
    /// # Safety
    ///
    /// The memory must hold a valid, properly aligned `U` within
    /// `byte_len()` bytes, live for `'a`, and not be mutated through another
    /// path while the reference exists.
    pub unsafe fn as_ref<'a, U>(&self) -> &'a U {
        // SAFETY: upheld by the caller.
        unsafe { &*self.ptr.cast::<U>() }
    }

    /// Reinterprets the base address as a `&mut U`.
    ///
    /// # Safety
    ///
    /// As [`as_ref`](Self::as_ref), and no other reference to the memory may
    /// exist while this one does.
    pub unsafe fn as_mut<'a, U>(&self) -> &'a mut U {
        // SAFETY: upheld by the caller.
        unsafe { &mut *self.ptr.cast::<U>() }
    }

    /// [`as_ref`](Self::as_ref) with size and alignment checked.
    ///
    /// # Safety
    ///
    /// The memory must be live for `'a` and hold a valid `U`.
    pub unsafe fn try_as_ref<'a, U>(&self) -> Result<&'a U> {
        check_layout::<U>(self.ptr as usize, self.byte_len())?;
        // SAFETY: size and alignment checked, the rest is upheld by the caller.
        Ok(unsafe { self.as_ref() })
    }

    /// Reads element `index`.
    ///
    /// # Safety
    ///
    /// `index < len()` (checked with `debug_assert!` only) and the element
    /// must be initialized.
    pub unsafe fn get_unchecked(&self, index: usize) -> T
    where
        T: Copy,
    {
        debug_assert!(index < self.len, "index out of range");
        // SAFETY: upheld by the caller.
        unsafe { self.ptr.add(index).read() }
    }

    /// Writes element `index` without dropping the previous value.
    ///
    /// # Safety
    ///
    /// `index < len()` (checked with `debug_assert!` only) and the memory must
    /// be live and writable.
    pub unsafe fn set_unchecked(&self, index: usize, value: T) {
        debug_assert!(index < self.len, "index out of range");
        // SAFETY: upheld by the caller.
        unsafe { self.ptr.add(index).write(value) }
    }

    /// [`get_unchecked`](Self::get_unchecked) with the index checked.
    ///
    /// # Safety
    ///
    /// The memory must be live and the element initialized.
    pub unsafe fn try_get(&self, index: usize) -> Result<T>
    where
        T: Copy,
    {
        check_index(index, self.len)?;
        // SAFETY: index checked, the rest is upheld by the caller.
        Ok(unsafe { self.get_unchecked(index) })
    }

    /// [`set_unchecked`](Self::set_unchecked) with the index checked.
    ///
    /// # Safety
    ///
    /// The memory must be live and writable.
    pub unsafe fn try_set(&self, index: usize, value: T) -> Result<()> {
        check_index(index, self.len)?;
        // SAFETY: index checked, the rest is upheld by the caller.
        unsafe { self.set_unchecked(index, value) };
        Ok(())
    }

    /// Writes `value` into every element.
    ///
    /// # Safety
    ///
    /// The memory must be live and writable.
    pub unsafe fn fill(&self, value: T)
    where
        T: Copy,
    {
        for index in 0..self.len {
            // SAFETY: `index < len`, the rest is upheld by the caller.
            unsafe { self.ptr.add(index).write(value) };
        }
    }

    /// Borrows the described memory as a slice.
    ///
    /// # Safety
    ///
    /// Every element must be initialized, live for `'a`, and not mutated
    /// through another path while the slice exists.
    pub unsafe fn as_slice<'a>(&self) -> &'a [T] {
        // SAFETY: upheld by the caller; the empty view uses a dangling pointer.
        unsafe { std::slice::from_raw_parts(data_ptr(self.ptr), self.len) }
    }

    /// Borrows the described memory as a mutable slice.
    ///
    /// # Safety
    ///
    /// As [`as_slice`](Self::as_slice), and no other reference to the memory
    /// may exist while this one does.
    pub unsafe fn as_mut_slice<'a>(&self) -> &'a mut [T] {
        // SAFETY: upheld by the caller; the empty view uses a dangling pointer.
        unsafe { std::slice::from_raw_parts_mut(data_ptr(self.ptr), self.len) }
    }
}

/// Substitutes a dangling, aligned pointer for null so zero-length slices
/// can be formed from the empty view.
pub(crate) fn data_ptr<T>(ptr: *mut T) -> *mut T {
    if ptr.is_null() {
        NonNull::<T>::dangling().as_ptr()
    } else {
        ptr
    }
}

pub(crate) fn check_destination(required: usize, available: usize) -> Result<()> {
    if available < required {
        return Err(BufferError::DestinationTooSmall {
            required,
            available,
        });
    }
    Ok(())
}

pub(crate) fn check_index(index: usize, length: usize) -> Result<()> {
    if index >= length {
        return Err(BufferError::IndexOutOfRange { index, length });
    }
    Ok(())
}

pub(crate) fn check_layout<U>(address: usize, available: usize) -> Result<()> {
    let required = size_of::<U>();
    if address == 0 || available < required {
        return Err(BufferError::TooSmallForType {
            required,
            available,
        });
    }

    let align = align_of::<U>();
    if address % align != 0 {
        return Err(BufferError::Misaligned { address, align });
    }
    Ok(())
}

impl<T> Clone for RawBuffer<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RawBuffer<T> {}

impl<T> Default for RawBuffer<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> PartialEq for RawBuffer<T> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.ptr, other.ptr) && self.len == other.len
    }
}

impl<T> Eq for RawBuffer<T> {}

impl<T> Hash for RawBuffer<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
        self.len.hash(state);
    }
}

impl<T> fmt::Debug for RawBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawBuffer")
            .field("type", &type_name::<T>())
            .field("address", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}

impl<T> fmt::Display for RawBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RawBuffer<{}>({:p}, {} elements, {} bytes)",
            type_name::<T>(),
            self.ptr,
            self.len,
            self.byte_len()
        )
    }
}

// SAFETY: the view is an address and a length; moving it to another thread
// moves no data. Access stays `unsafe` and disjoint views touch disjoint memory.
unsafe impl<T: Send> Send for RawBuffer<T> {}

// SAFETY: a shared `&RawBuffer` only allows copying the view.
unsafe impl<T: Sync> Sync for RawBuffer<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::{Malloc, Tracked};

    #[test]
    fn test_empty() {
        let buf = RawBuffer::<u32>::empty();
        assert!(buf.is_empty());
        assert!(buf.as_ptr().is_null());
        assert_eq!(buf, RawBuffer::default());
        assert_eq!(unsafe { buf.as_slice() }, &[] as &[u32]);
    }

    #[test]
    fn test_wrap_null_with_length_fails() {
        assert_eq!(
            RawBuffer::<u8>::wrap(ptr::null_mut(), 3).unwrap_err(),
            BufferError::NullAddress { length: 3 }
        );
    }

    #[test]
    fn test_wrap_null_empty_is_empty() {
        let buf = RawBuffer::<u8>::wrap(ptr::null_mut(), 0).unwrap();
        assert_eq!(buf, RawBuffer::empty());
    }

    #[test]
    fn test_wrap_size_overflow() {
        let mut value = 0u64;
        let err = RawBuffer::wrap(&mut value as *mut u64, usize::MAX).unwrap_err();
        assert!(matches!(err, BufferError::SizeOverflow { .. }));
    }

    #[test]
    fn test_allocate_zero_length_skips_allocator() {
        let alloc = Tracked::new(Malloc);
        let buf = RawBuffer::<u64>::allocate_in(&alloc, 0).unwrap();
        assert_eq!(buf, RawBuffer::empty());
        assert_eq!(alloc.stats().allocations, 0);
        unsafe { buf.release_in(&alloc) };
        assert_eq!(alloc.stats().frees, 0);
    }

    #[test]
    fn test_allocate_and_release() {
        let alloc = Tracked::new(Malloc);
        let buf = RawBuffer::<u16>::allocate_zeroed_in(&alloc, 8).unwrap();
        assert_eq!(buf.len(), 8);
        assert_eq!(buf.byte_len(), 16);
        assert_eq!(unsafe { buf.as_slice() }, &[0u16; 8]);

        unsafe { buf.release_in(&alloc) };
        assert_eq!(alloc.stats().live(), 0);
    }

    #[test]
    fn test_slice_address_and_length() {
        let mut data = [0u32; 8];
        let buf = RawBuffer::from_slice(&mut data);
        let slice = buf.try_slice(2, 3).unwrap();
        assert_eq!(slice.len(), 3);
        assert_eq!(slice.address(), buf.address() + 2 * size_of::<u32>());
    }

    #[test]
    fn test_full_slice_equals_parent() {
        let mut data = [1u8; 5];
        let buf = RawBuffer::from_slice(&mut data);
        assert_eq!(buf.try_slice(0, buf.len()).unwrap(), buf);
    }

    #[test]
    fn test_strict_rejects_zero_length_tail() {
        let mut data = [0u8; 4];
        let buf = RawBuffer::from_slice(&mut data);
        assert!(buf.try_slice(4, 0).is_err());
        assert!(buf.try_slice_from(4).is_err());
    }

    #[test]
    fn test_inclusive_accepts_zero_length_tail() {
        let mut data = [0u8; 4];
        let buf = RawBuffer::from_slice(&mut data);
        let tail = buf.try_slice_with(BoundsPolicy::InclusiveEnd, 4, 0).unwrap();
        assert!(tail.is_empty());
        assert_eq!(tail.address(), buf.address() + 4);
    }

    #[test]
    fn test_slice_unchecked_matches_checked() {
        let mut data = [0u8; 10];
        let buf = RawBuffer::from_slice(&mut data);
        let checked = buf.try_slice(3, 4).unwrap();
        let unchecked = unsafe { buf.slice_unchecked(3, 4) };
        assert_eq!(checked, unchecked);
        assert_eq!(unsafe { buf.slice_from_unchecked(3) }.len(), 7);
    }

    #[test]
    fn test_split_at() {
        let mut data = [0u8; 6];
        let buf = RawBuffer::from_slice(&mut data);
        let (head, tail) = buf.split_at(2).unwrap();
        assert_eq!(head.len(), 2);
        assert_eq!(tail.len(), 4);
        assert_eq!(tail.address(), buf.address() + 2);
        assert!(buf.split_at(7).is_err());
    }

    #[test]
    fn test_copy_to() {
        let mut src = [1u32, 2, 3];
        let mut dst = [0u32; 4];
        let source = RawBuffer::from_slice(&mut src);
        let dest = RawBuffer::from_slice(&mut dst);
        unsafe { source.copy_to(dest) };
        assert_eq!(dst, [1, 2, 3, 0]);
    }

    #[test]
    fn test_copy_to_safe_overlapping_forward() {
        let mut data = [1u8, 2, 3, 4, 5, 6];
        let buf = RawBuffer::from_slice(&mut data);
        let source = buf.try_slice(0, 4).unwrap();
        let dest = buf.try_slice(2, 4).unwrap();
        unsafe { source.copy_to_safe(dest) };
        assert_eq!(data, [1, 2, 1, 2, 3, 4]);
    }

    #[test]
    fn test_copy_to_safe_overlapping_backward() {
        let mut data = [1u8, 2, 3, 4, 5, 6];
        let buf = RawBuffer::from_slice(&mut data);
        let source = buf.try_slice(2, 4).unwrap();
        let dest = buf.try_slice(0, 4).unwrap();
        unsafe { source.copy_to_safe(dest) };
        assert_eq!(data, [3, 4, 5, 6, 5, 6]);
    }

    #[test]
    fn test_try_copy_to_destination_too_small() {
        let mut src = [0u8; 4];
        let mut dst = [0u8; 3];
        let source = RawBuffer::from_slice(&mut src);
        let dest = RawBuffer::from_slice(&mut dst);
        let err = unsafe { source.try_copy_to(dest) }.unwrap_err();
        assert_eq!(
            err,
            BufferError::DestinationTooSmall {
                required: 4,
                available: 3
            }
        );
        assert!(unsafe { source.try_copy_to_safe(dest) }.is_err());
    }

    #[test]
    fn test_copy_empty_to_empty() {
        let empty = RawBuffer::<u8>::empty();
        unsafe {
            empty.copy_to(empty);
            empty.copy_to_safe(empty);
        }
    }

    #[test]
    fn test_cast_drops_trailing_bytes() {
        let mut data = [0u8; 10];
        let buf = RawBuffer::from_slice(&mut data);
        let words = buf.cast::<u32>();
        assert_eq!(words.len(), 2);
        assert_eq!(words.address(), buf.address());
    }

    #[test]
    fn test_as_ref_reads_struct() {
        #[repr(C)]
        struct Header {
            tag: u32,
            size: u32,
        }

        let mut words = [7u32, 64];
        let buf = RawBuffer::from_slice(&mut words).cast::<u8>();
        let header: &Header = unsafe { buf.as_ref() };
        assert_eq!(header.tag, 7);
        assert_eq!(header.size, 64);

        let header: &mut Header = unsafe { buf.as_mut() };
        header.size = 128;
        assert_eq!(words[1], 128);
    }

    #[test]
    fn test_try_as_ref_checks_size_and_alignment() {
        let mut words = [0u64; 2];
        let buf = RawBuffer::from_slice(&mut words).cast::<u8>();

        assert!(unsafe { buf.try_as_ref::<u64>() }.is_ok());
        assert!(matches!(
            unsafe { buf.try_slice(0, 4).unwrap().try_as_ref::<u64>() },
            Err(BufferError::TooSmallForType { required: 8, available: 4 })
        ));
        assert!(matches!(
            unsafe { buf.try_slice(1, 8).unwrap().try_as_ref::<u64>() },
            Err(BufferError::Misaligned { align: 8, .. })
        ));
        assert!(unsafe { RawBuffer::<u8>::empty().try_as_ref::<u8>() }.is_err());
    }

    #[test]
    fn test_get_set() {
        let mut data = [0i32; 3];
        let buf = RawBuffer::from_slice(&mut data);
        unsafe {
            buf.set_unchecked(0, -1);
            buf.try_set(2, 9).unwrap();
            assert_eq!(buf.get_unchecked(0), -1);
            assert_eq!(buf.try_get(2).unwrap(), 9);
            assert_eq!(
                buf.try_get(3).unwrap_err(),
                BufferError::IndexOutOfRange { index: 3, length: 3 }
            );
            assert!(buf.try_set(3, 0).is_err());
        }
        assert_eq!(data, [-1, 0, 9]);
    }

    #[test]
    fn test_fill() {
        let mut data = [0u16; 4];
        let buf = RawBuffer::from_slice(&mut data);
        unsafe { buf.try_slice(1, 2).unwrap().fill(5) };
        assert_eq!(data, [0, 5, 5, 0]);
    }

    #[test]
    fn test_equality_is_identity() {
        let mut a = [1u8, 2, 3];
        let mut b = [1u8, 2, 3];
        let va = RawBuffer::from_slice(&mut a);
        let vb = RawBuffer::from_slice(&mut b);
        assert_ne!(va, vb);
        let copy = va;
        assert_eq!(va, copy);
        assert_ne!(va, va.try_slice(0, 2).unwrap());
    }

    #[test]
    fn test_display_and_debug() {
        let mut data = [0u32; 2];
        let buf = RawBuffer::from_slice(&mut data);
        let shown = buf.to_string();
        assert!(shown.starts_with("RawBuffer<u32>("));
        assert!(shown.contains("2 elements, 8 bytes"));
        assert!(format!("{:?}", buf).contains("len: 2"));
    }
}
