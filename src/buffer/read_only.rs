//! Read-only views: the write-free projection of [`RawBuffer`].

use std::any::type_name;
use std::fmt;
use std::hash::{Hash, Hasher};

use bytes::Bytes;

use super::raw::data_ptr;
use super::{Plain, RawBuffer};
use crate::config::BoundsPolicy;
use crate::error::Result;

/// A read-only view of `len` values of `T` starting at a raw address.
///
/// Obtained from [`RawBuffer::read_only`] at no cost (same address, same
/// length) or by wrapping a `*const T`. There is no way back to a
/// `RawBuffer`, so code holding only a `ReadOnlyBuffer` cannot write.
/// Ownership, slicing and equality follow [`RawBuffer`].
///
/// # Example
///
/// ```
/// use nativebuf::ReadOnlyBuffer;
///
/// let data = [10u16, 20, 30];
/// let view = ReadOnlyBuffer::from_slice(&data);
/// let tail = view.try_slice_from(1)?;
/// assert_eq!(unsafe { tail.as_slice() }, &[20, 30]);
/// # Ok::<(), nativebuf::BufferError>(())
/// ```
pub struct ReadOnlyBuffer<T = u8> {
    inner: RawBuffer<T>,
}

impl<T> ReadOnlyBuffer<T> {
    pub(crate) const fn from_raw(inner: RawBuffer<T>) -> Self {
        Self { inner }
    }

    /// The empty view: null address, zero length.
    pub const fn empty() -> Self {
        Self::from_raw(RawBuffer::empty())
    }

    /// Describes `length` elements at `ptr`.
    ///
    /// # Errors
    ///
    /// As [`RawBuffer::wrap`].
    pub fn wrap(ptr: *const T, length: usize) -> Result<Self> {
        RawBuffer::wrap(ptr.cast_mut(), length).map(Self::from_raw)
    }

    /// Describes `length` elements at `ptr` without validation.
    ///
    /// # Safety
    ///
    /// As [`RawBuffer::wrap_unchecked`].
    pub unsafe fn wrap_unchecked(ptr: *const T, length: usize) -> Self {
        // SAFETY: forwarded contract.
        Self::from_raw(unsafe { RawBuffer::wrap_unchecked(ptr.cast_mut(), length) })
    }

    /// Views the memory of a Rust slice without borrowing it.
    pub fn from_slice(slice: &[T]) -> Self {
        // SAFETY: slice pointers are never null.
        Self::from_raw(unsafe { RawBuffer::wrap_unchecked(slice.as_ptr().cast_mut(), slice.len()) })
    }

    /// Number of elements.
    pub const fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if the view has no elements.
    pub const fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Size of one element in bytes.
    pub const fn element_size(&self) -> usize {
        size_of::<T>()
    }

    /// Number of bytes described.
    pub const fn byte_len(&self) -> usize {
        self.inner.byte_len()
    }

    /// The base address.
    pub const fn as_ptr(&self) -> *const T {
        self.inner.as_ptr().cast_const()
    }

    /// The base address as an integer.
    pub fn address(&self) -> usize {
        self.inner.address()
    }

    /// Reinterprets the element type; see [`RawBuffer::cast`].
    pub const fn cast<U>(self) -> ReadOnlyBuffer<U> {
        ReadOnlyBuffer::from_raw(self.inner.cast())
    }

    /// Checked slice under [`BoundsPolicy::Strict`].
    pub fn try_slice(self, start: usize, length: usize) -> Result<Self> {
        self.inner.try_slice(start, length).map(Self::from_raw)
    }

    /// Checked slice from `start` to the end under [`BoundsPolicy::Strict`].
    pub fn try_slice_from(self, start: usize) -> Result<Self> {
        self.inner.try_slice_from(start).map(Self::from_raw)
    }

    /// Checked slice under `policy`.
    pub fn try_slice_with(self, policy: BoundsPolicy, start: usize, length: usize) -> Result<Self> {
        self.inner
            .try_slice_with(policy, start, length)
            .map(Self::from_raw)
    }

    /// Slice without bounds checking.
    ///
    /// # Safety
    ///
    /// As [`RawBuffer::slice_unchecked`].
    pub unsafe fn slice_unchecked(self, start: usize, length: usize) -> Self {
        // SAFETY: forwarded contract.
        Self::from_raw(unsafe { self.inner.slice_unchecked(start, length) })
    }

    /// Slice from `start` to the end without bounds checking.
    ///
    /// # Safety
    ///
    /// As [`RawBuffer::slice_from_unchecked`].
    pub unsafe fn slice_from_unchecked(self, start: usize) -> Self {
        // SAFETY: forwarded contract.
        Self::from_raw(unsafe { self.inner.slice_from_unchecked(start) })
    }

    /// Splits into `[0, mid)` and `[mid, len)`.
    pub fn split_at(self, mid: usize) -> Result<(Self, Self)> {
        let (head, tail) = self.inner.split_at(mid)?;
        Ok((Self::from_raw(head), Self::from_raw(tail)))
    }

    /// Copies every element into `dest`, assuming no overlap.
    ///
    /// # Safety
    ///
    /// As [`RawBuffer::copy_to`].
    pub unsafe fn copy_to(&self, dest: RawBuffer<T>) {
        // SAFETY: forwarded contract.
        unsafe { self.inner.copy_to(dest) }
    }

    /// Copies every element into `dest`, correct under overlap.
    ///
    /// # Safety
    ///
    /// As [`RawBuffer::copy_to_safe`].
    pub unsafe fn copy_to_safe(&self, dest: RawBuffer<T>) {
        // SAFETY: forwarded contract.
        unsafe { self.inner.copy_to_safe(dest) }
    }

    /// [`copy_to`](Self::copy_to) with the length checked.
    ///
    /// # Safety
    ///
    /// As [`RawBuffer::try_copy_to`].
    pub unsafe fn try_copy_to(&self, dest: RawBuffer<T>) -> Result<()> {
        // SAFETY: forwarded contract.
        unsafe { self.inner.try_copy_to(dest) }
    }

    /// [`copy_to_safe`](Self::copy_to_safe) with the length checked.
    ///
    /// # Safety
    ///
    /// As [`RawBuffer::try_copy_to_safe`].
    pub unsafe fn try_copy_to_safe(&self, dest: RawBuffer<T>) -> Result<()> {
        // SAFETY: forwarded contract.
        unsafe { self.inner.try_copy_to_safe(dest) }
    }

    /// Reinterprets the base address as a `&U` without validation.
    ///
    /// # Safety
    ///
    /// As [`RawBuffer::as_ref`].
    pub unsafe fn as_ref<'a, U>(&self) -> &'a U {
        // SAFETY: forwarded contract.
        unsafe { self.inner.as_ref() }
    }

    /// [`as_ref`](Self::as_ref) with size and alignment checked.
    ///
    /// # Safety
    ///
    /// As [`RawBuffer::try_as_ref`].
    pub unsafe fn try_as_ref<'a, U>(&self) -> Result<&'a U> {
        // SAFETY: forwarded contract.
        unsafe { self.inner.try_as_ref() }
    }

    /// Reads element `index`.
    ///
    /// # Safety
    ///
    /// As [`RawBuffer::get_unchecked`].
    pub unsafe fn get_unchecked(&self, index: usize) -> T
    where
        T: Copy,
    {
        // SAFETY: forwarded contract.
        unsafe { self.inner.get_unchecked(index) }
    }

    /// Reads element `index` with the index checked.
    ///
    /// # Safety
    ///
    /// As [`RawBuffer::try_get`].
    pub unsafe fn try_get(&self, index: usize) -> Result<T>
    where
        T: Copy,
    {
        // SAFETY: forwarded contract.
        unsafe { self.inner.try_get(index) }
    }

    /// Borrows the described memory as a slice.
    ///
    /// # Safety
    ///
    /// As [`RawBuffer::as_slice`].
    pub unsafe fn as_slice<'a>(&self) -> &'a [T] {
        // SAFETY: forwarded contract.
        unsafe { self.inner.as_slice() }
    }
}

impl<T: Plain> ReadOnlyBuffer<T> {
    /// Borrows the described memory as raw bytes.
    ///
    /// # Safety
    ///
    /// The memory must be initialized and live for `'a`.
    pub unsafe fn as_bytes<'a>(&self) -> &'a [u8] {
        let ptr = data_ptr(self.inner.as_ptr()).cast::<u8>();
        // SAFETY: `T: Plain` has no padding; liveness is upheld by the caller.
        unsafe { std::slice::from_raw_parts(ptr, self.byte_len()) }
    }

    /// Copies the described bytes into a new [`Bytes`].
    ///
    /// # Safety
    ///
    /// The memory must be initialized and live for the duration of the call.
    pub unsafe fn to_bytes(&self) -> Bytes {
        // SAFETY: forwarded contract.
        Bytes::copy_from_slice(unsafe { self.as_bytes() })
    }

    /// BLAKE3 hash of the described bytes.
    ///
    /// Views compare by identity; this is the way to compare content.
    ///
    /// # Safety
    ///
    /// The memory must be initialized and live for the duration of the call.
    #[cfg(feature = "hash-blake3")]
    pub unsafe fn content_hash(&self) -> crate::ContentHash {
        // SAFETY: forwarded contract.
        crate::hash::Blake3Hasher::hash(unsafe { self.as_bytes() })
    }
}

impl ReadOnlyBuffer<u8> {
    /// Views the contents of a [`Bytes`] without copying.
    ///
    /// The view does not keep `bytes` alive; it dangles once the last clone
    /// of that `Bytes` is dropped.
    pub fn from_bytes(bytes: &Bytes) -> Self {
        Self::from_slice(bytes.as_ref())
    }
}

impl<T> Clone for ReadOnlyBuffer<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ReadOnlyBuffer<T> {}

impl<T> Default for ReadOnlyBuffer<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> PartialEq for ReadOnlyBuffer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Eq for ReadOnlyBuffer<T> {}

impl<T> Hash for ReadOnlyBuffer<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl<T> From<RawBuffer<T>> for ReadOnlyBuffer<T> {
    fn from(buffer: RawBuffer<T>) -> Self {
        buffer.read_only()
    }
}

impl<T> fmt::Debug for ReadOnlyBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOnlyBuffer")
            .field("type", &type_name::<T>())
            .field("address", &self.as_ptr())
            .field("len", &self.len())
            .finish()
    }
}

impl<T> fmt::Display for ReadOnlyBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReadOnlyBuffer<{}>({:p}, {} elements, {} bytes)",
            type_name::<T>(),
            self.as_ptr(),
            self.len(),
            self.byte_len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_keeps_address_and_length() {
        let mut data = [1u32, 2, 3];
        let raw = RawBuffer::from_slice(&mut data);
        let view = raw.read_only();
        assert_eq!(view.address(), raw.address());
        assert_eq!(view.len(), raw.len());
        assert_eq!(ReadOnlyBuffer::from(raw), view);
    }

    #[test]
    fn test_wrap_null() {
        assert!(ReadOnlyBuffer::<u8>::wrap(std::ptr::null(), 1).is_err());
        assert_eq!(
            ReadOnlyBuffer::<u8>::wrap(std::ptr::null(), 0).unwrap(),
            ReadOnlyBuffer::empty()
        );
    }

    #[test]
    fn test_slices() {
        let data = [0u8, 1, 2, 3, 4];
        let view = ReadOnlyBuffer::from_slice(&data);
        assert_eq!(unsafe { view.try_slice(1, 3).unwrap().as_slice() }, &[1, 2, 3]);
        assert!(view.try_slice(5, 0).is_err());
        assert!(view.try_slice_with(BoundsPolicy::InclusiveEnd, 5, 0).is_ok());

        let (head, tail) = view.split_at(2).unwrap();
        assert_eq!(unsafe { head.as_slice() }, &[0, 1]);
        assert_eq!(unsafe { tail.as_slice() }, &[2, 3, 4]);
    }

    #[test]
    fn test_copy_into_raw_buffer() {
        let src = [9u16, 8, 7];
        let mut dst = [0u16; 3];
        let view = ReadOnlyBuffer::from_slice(&src);
        unsafe { view.try_copy_to(RawBuffer::from_slice(&mut dst)).unwrap() };
        assert_eq!(dst, src);
    }

    #[test]
    fn test_bytes_round_trip() {
        let bytes = Bytes::from_static(b"native");
        let view = ReadOnlyBuffer::from_bytes(&bytes);
        assert_eq!(view.address(), bytes.as_ptr() as usize);
        assert_eq!(unsafe { view.to_bytes() }, bytes);
    }

    #[test]
    fn test_as_bytes_of_words() {
        let words = [0x0102_0304u32.to_le(); 2];
        let view = ReadOnlyBuffer::from_slice(&words);
        let bytes = unsafe { view.as_bytes() };
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[..4], &0x0102_0304u32.to_le().to_ne_bytes());
    }

    #[cfg(feature = "hash-blake3")]
    #[test]
    fn test_content_hash_ignores_identity() {
        let a = [1u8, 2, 3];
        let b = [1u8, 2, 3];
        let va = ReadOnlyBuffer::from_slice(&a);
        let vb = ReadOnlyBuffer::from_slice(&b);
        assert_ne!(va, vb);
        assert_eq!(unsafe { va.content_hash() }, unsafe { vb.content_hash() });
    }

    #[test]
    fn test_display() {
        let data = [0u8; 3];
        let view = ReadOnlyBuffer::from_slice(&data);
        assert!(view.to_string().starts_with("ReadOnlyBuffer<u8>("));
    }
}
