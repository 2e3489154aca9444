//! Tables of raw pointers.
//!
//! - [`PointerTable`] - `len` slots of `*mut T` in unmanaged memory

use std::any::type_name;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ptr;

use crate::alloc::RawAllocator;
use crate::buffer::{RawBuffer, check_index};
use crate::config::BoundsPolicy;
use crate::error::Result;

/// An array of raw addresses-to-`T` in unmanaged memory.
///
/// The table manages the pointer storage only. It never allocates, frees or
/// validates the pointees, and slots from [`allocate_in`](Self::allocate_in)
/// hold indeterminate values until written. Slicing, copying and equality
/// behave like [`RawBuffer`], which the table is built on.
///
/// # Example
///
/// ```
/// use nativebuf::{Malloc, PointerTable};
///
/// let mut values = [10i32, 20];
/// let table = PointerTable::<i32>::allocate_null_in(&Malloc, 2)?;
///
/// unsafe {
///     table.set(0, &mut values[0]);
///     table.set(1, &mut values[1]);
///     *table.deref_mut(1) += 1;
///     assert_eq!(*table.deref(1), 21);
///     table.release_in(&Malloc);
/// }
/// # Ok::<(), nativebuf::BufferError>(())
/// ```
pub struct PointerTable<T> {
    slots: RawBuffer<*mut T>,
}

impl<T> PointerTable<T> {
    /// The empty table.
    pub const fn empty() -> Self {
        Self {
            slots: RawBuffer::empty(),
        }
    }

    /// Reserves `length` uninitialized slots from `alloc`.
    ///
    /// The caller owns the storage and must release it with
    /// [`release_in`](Self::release_in).
    pub fn allocate_in<A: RawAllocator + ?Sized>(alloc: &A, length: usize) -> Result<Self> {
        RawBuffer::allocate_in(alloc, length).map(|slots| Self { slots })
    }

    /// Reserves `length` slots from `alloc`, each set to null.
    pub fn allocate_null_in<A: RawAllocator + ?Sized>(alloc: &A, length: usize) -> Result<Self> {
        let table = Self::allocate_in(alloc, length)?;
        // SAFETY: freshly allocated, writable storage for `length` slots.
        unsafe { table.slots.fill(ptr::null_mut()) };
        Ok(table)
    }

    /// Describes `length` slots at `ptr`; see [`RawBuffer::wrap`].
    pub fn wrap(ptr: *mut *mut T, length: usize) -> Result<Self> {
        RawBuffer::wrap(ptr, length).map(|slots| Self { slots })
    }

    /// Views an existing slot buffer as a table.
    pub const fn from_raw_buffer(slots: RawBuffer<*mut T>) -> Self {
        Self { slots }
    }

    /// Returns the pointer storage as a buffer.
    pub const fn as_raw_buffer(&self) -> RawBuffer<*mut T> {
        self.slots
    }

    /// Hands the pointer storage back to `alloc`. Pointees are untouched.
    ///
    /// # Safety
    ///
    /// As [`RawBuffer::release_in`].
    pub unsafe fn release_in<A: RawAllocator + ?Sized>(self, alloc: &A) {
        // SAFETY: forwarded contract.
        unsafe { self.slots.release_in(alloc) }
    }

    /// Number of slots.
    pub const fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the table has no slots.
    pub const fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Bytes of pointer storage: `len() * size_of::<*mut T>()`.
    pub const fn byte_len(&self) -> usize {
        self.slots.byte_len()
    }

    /// Address of the first slot.
    pub const fn as_ptr(&self) -> *mut *mut T {
        self.slots.as_ptr()
    }

    /// Address of the first slot as an integer.
    pub fn address(&self) -> usize {
        self.slots.address()
    }

    /// Reads slot `index`.
    ///
    /// # Safety
    ///
    /// `index < len()` (checked with `debug_assert!` only), the storage must
    /// be live and the slot must have been written.
    pub unsafe fn get(&self, index: usize) -> *mut T {
        // SAFETY: forwarded contract.
        unsafe { self.slots.get_unchecked(index) }
    }

    /// Writes slot `index`.
    ///
    /// # Safety
    ///
    /// `index < len()` (checked with `debug_assert!` only) and the storage
    /// must be live.
    pub unsafe fn set(&self, index: usize, value: *mut T) {
        // SAFETY: forwarded contract.
        unsafe { self.slots.set_unchecked(index, value) }
    }

    /// [`get`](Self::get) with the index checked.
    ///
    /// # Safety
    ///
    /// The storage must be live and the slot written.
    pub unsafe fn try_get(&self, index: usize) -> Result<*mut T> {
        check_index(index, self.len())?;
        // SAFETY: index checked, the rest is upheld by the caller.
        Ok(unsafe { self.get(index) })
    }

    /// [`set`](Self::set) with the index checked.
    ///
    /// # Safety
    ///
    /// The storage must be live.
    pub unsafe fn try_set(&self, index: usize, value: *mut T) -> Result<()> {
        check_index(index, self.len())?;
        // SAFETY: index checked, the rest is upheld by the caller.
        unsafe { self.set(index, value) };
        Ok(())
    }

    /// Treats slot `index` as a reference to `T`.
    ///
    /// Nothing checks that the slot is non-null or that its pointee is alive.
    ///
    /// # Safety
    ///
    /// As [`get`](Self::get), and the stored pointer must be valid for reads
    /// of `T` for `'a`.
    pub unsafe fn deref<'a>(&self, index: usize) -> &'a T {
        // SAFETY: upheld by the caller.
        unsafe { &*self.get(index) }
    }

    /// Treats slot `index` as a mutable reference to `T`.
    ///
    /// # Safety
    ///
    /// As [`deref`](Self::deref), and no other reference to the pointee may
    /// exist for `'a`.
    pub unsafe fn deref_mut<'a>(&self, index: usize) -> &'a mut T {
        // SAFETY: upheld by the caller.
        unsafe { &mut *self.get(index) }
    }

    /// Checked slice under [`BoundsPolicy::Strict`].
    pub fn try_slice(self, start: usize, length: usize) -> Result<Self> {
        self.slots.try_slice(start, length).map(Self::from_raw_buffer)
    }

    /// Checked slice from `start` to the end under [`BoundsPolicy::Strict`].
    pub fn try_slice_from(self, start: usize) -> Result<Self> {
        self.slots.try_slice_from(start).map(Self::from_raw_buffer)
    }

    /// Checked slice under `policy`.
    pub fn try_slice_with(self, policy: BoundsPolicy, start: usize, length: usize) -> Result<Self> {
        self.slots
            .try_slice_with(policy, start, length)
            .map(Self::from_raw_buffer)
    }

    /// Slice without bounds checking.
    ///
    /// # Safety
    ///
    /// As [`RawBuffer::slice_unchecked`].
    pub unsafe fn slice_unchecked(self, start: usize, length: usize) -> Self {
        // SAFETY: forwarded contract.
        Self::from_raw_buffer(unsafe { self.slots.slice_unchecked(start, length) })
    }

    /// Slice from `start` to the end without bounds checking.
    ///
    /// # Safety
    ///
    /// As [`RawBuffer::slice_from_unchecked`].
    pub unsafe fn slice_from_unchecked(self, start: usize) -> Self {
        // SAFETY: forwarded contract.
        Self::from_raw_buffer(unsafe { self.slots.slice_from_unchecked(start) })
    }

    /// Splits into slots `[0, mid)` and `[mid, len)`.
    pub fn split_at(self, mid: usize) -> Result<(Self, Self)> {
        let (head, tail) = self.slots.split_at(mid)?;
        Ok((Self::from_raw_buffer(head), Self::from_raw_buffer(tail)))
    }
}

impl<T> Clone for PointerTable<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PointerTable<T> {}

impl<T> Default for PointerTable<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> PartialEq for PointerTable<T> {
    fn eq(&self, other: &Self) -> bool {
        self.slots == other.slots
    }
}

impl<T> Eq for PointerTable<T> {}

impl<T> Hash for PointerTable<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slots.hash(state);
    }
}

impl<T> fmt::Debug for PointerTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerTable")
            .field("type", &type_name::<T>())
            .field("address", &self.as_ptr())
            .field("len", &self.len())
            .finish()
    }
}

impl<T> fmt::Display for PointerTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PointerTable<{}>({:p}, {} slots)",
            type_name::<T>(),
            self.as_ptr(),
            self.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::{Malloc, Tracked};
    use crate::error::BufferError;

    #[test]
    fn test_storage_size() {
        let table = PointerTable::<u64>::allocate_in(&Malloc, 3).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.byte_len(), 3 * size_of::<*mut u64>());
        unsafe { table.release_in(&Malloc) };
    }

    #[test]
    fn test_null_slots() {
        let table = PointerTable::<u8>::allocate_null_in(&Malloc, 4).unwrap();
        for index in 0..4 {
            assert!(unsafe { table.get(index) }.is_null());
        }
        unsafe { table.release_in(&Malloc) };
    }

    #[test]
    fn test_set_get_deref() {
        let mut a = 1.5f64;
        let mut b = 2.5f64;
        let pa: *mut f64 = &mut a;
        let pb: *mut f64 = &mut b;
        let table = PointerTable::allocate_in(&Malloc, 2).unwrap();
        unsafe {
            table.set(0, pa);
            table.try_set(1, pb).unwrap();
            assert_eq!(table.get(0), pa);
            *table.deref_mut(0) = 3.0;
            assert_eq!(*table.deref(1), 2.5);
            table.release_in(&Malloc);
        }
        assert_eq!(a, 3.0);
    }

    #[test]
    fn test_checked_index() {
        let table = PointerTable::<u8>::allocate_null_in(&Malloc, 1).unwrap();
        unsafe {
            assert_eq!(
                table.try_get(1).unwrap_err(),
                BufferError::IndexOutOfRange { index: 1, length: 1 }
            );
            assert!(table.try_set(5, ptr::null_mut()).is_err());
            table.release_in(&Malloc);
        }
    }

    #[test]
    fn test_split_and_slice_from() {
        let mut values = [1u16, 2, 3, 4];
        let base = values.as_mut_ptr();
        let table = PointerTable::<u16>::allocate_null_in(&Malloc, 4).unwrap();
        unsafe {
            for i in 0..4 {
                table.set(i, base.add(i));
            }

            let (head, tail) = table.split_at(1).unwrap();
            assert_eq!(head.len(), 1);
            assert_eq!(tail.len(), 3);
            assert_eq!(tail.address(), table.address() + size_of::<*mut u16>());
            assert_eq!(*tail.deref(0), 2);

            let rest = table.slice_from_unchecked(2);
            assert_eq!(rest, table.try_slice_from(2).unwrap());
            assert_eq!(*rest.deref(1), 4);

            assert_eq!(
                table.split_at(5).unwrap_err(),
                BufferError::SliceOutOfRange {
                    start: 5,
                    length: 0,
                    available: 4
                }
            );
            table.release_in(&Malloc);
        }
    }

    #[test]
    fn test_release_leaves_pointees_alone() {
        let alloc = Tracked::new(Malloc);
        let value = Box::into_raw(Box::new(7u32));
        let table = PointerTable::allocate_in(&alloc, 1).unwrap();
        unsafe {
            table.set(0, value);
            table.release_in(&alloc);
            assert_eq!(*value, 7);
            drop(Box::from_raw(value));
        }
        assert_eq!(alloc.stats().live(), 0);
    }

    #[test]
    fn test_slicing_mirrors_raw_buffer() {
        let table = PointerTable::<u8>::allocate_null_in(&Malloc, 4).unwrap();
        let slice = table.try_slice(1, 2).unwrap();
        assert_eq!(slice.address(), table.address() + size_of::<*mut u8>());
        assert_eq!(table.try_slice(0, 4).unwrap(), table);
        assert!(table.try_slice_from(4).is_err());
        assert!(table.try_slice_with(BoundsPolicy::InclusiveEnd, 4, 0).is_ok());
        assert_eq!(unsafe { table.slice_unchecked(1, 2) }, slice);
        unsafe { table.release_in(&Malloc) };
    }

    #[test]
    fn test_display() {
        let table = PointerTable::<u16>::empty();
        assert!(table.to_string().contains("0 slots"));
    }
}
