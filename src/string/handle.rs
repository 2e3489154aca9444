//! Handles that decode their native string on every read.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ptr;

use tracing::trace;

use super::marshal::{DecodeFn, FreeFn, Marshaler};
use crate::error::Result;

/// The address of a native string, decoded lazily.
///
/// [`read`](Self::read) decodes the current memory each time, so writes made
/// by native code through [`as_mut_ptr`](Self::as_mut_ptr) are visible on the
/// next read. Equality and hashing compare the address only.
///
/// There is no `Drop` impl; call [`release`](Self::release) when done.
/// Releasing sets the address to null, after which `read` returns `""`.
/// Releasing again calls the free strategy with null, which the built-in
/// strategies ignore.
///
/// # Example
///
/// ```
/// use nativebuf::{Marshaler, StringHandle};
///
/// let mut handle = StringHandle::new("hello", &Marshaler::UTF8)?;
/// assert_eq!(handle.read(), "hello");
///
/// handle.release();
/// assert!(handle.is_released());
/// assert_eq!(handle.read(), "");
/// # Ok::<(), nativebuf::BufferError>(())
/// ```
#[must_use = "a StringHandle leaks its memory unless released"]
pub struct StringHandle {
    ptr: *mut u8,
    decode: DecodeFn,
    free: Option<FreeFn>,
}

impl StringHandle {
    /// Encodes `value` into native memory.
    pub fn new(value: &str, marshaler: &Marshaler) -> Result<Self> {
        let ptr = marshaler.encode(value)?;
        trace!(address = ?ptr, marshaler = marshaler.label(), "string handle created");
        Ok(Self::with_parts(ptr.as_ptr(), marshaler))
    }

    /// Allocates `byte_len` zero-filled bytes for native code to write into.
    ///
    /// Room for the terminator must be included in `byte_len`. Requests
    /// smaller than the marshaler's terminator are raised to it, so an
    /// unwritten buffer always holds one. Until written, `read` returns `""`.
    pub fn with_capacity(byte_len: usize, marshaler: &Marshaler) -> Result<Self> {
        let byte_len = byte_len.max(marshaler.terminator_size());
        let ptr = marshaler.allocate(byte_len)?;
        trace!(address = ?ptr, byte_len, "string buffer allocated");
        Ok(Self::with_parts(ptr.as_ptr(), marshaler))
    }

    /// Wraps an address produced by native code.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a terminated string in `marshaler`'s
    /// representation that stays live until released, and, if `marshaler`
    /// frees, it must have been allocated compatibly with that free strategy.
    pub unsafe fn from_raw(ptr: *mut u8, marshaler: &Marshaler) -> Self {
        Self::with_parts(ptr, marshaler)
    }

    fn with_parts(ptr: *mut u8, marshaler: &Marshaler) -> Self {
        Self {
            ptr,
            decode: marshaler.decoder(),
            free: marshaler.freer(),
        }
    }

    /// Decodes the string currently at the address.
    pub fn read(&self) -> String {
        // SAFETY: the address is null or was valid at construction and has
        // not been released through this handle.
        unsafe { (self.decode)(self.ptr) }
    }

    /// The address, null once released.
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr
    }

    /// The address, for native code that writes into the buffer.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr
    }

    /// Returns true once [`release`](Self::release) has run.
    pub fn is_released(&self) -> bool {
        self.ptr.is_null()
    }

    /// Frees the memory, if the marshaler has a free strategy, and sets the
    /// address to null.
    pub fn release(&mut self) {
        trace!(address = ?self.ptr, "string handle released");
        if let Some(free) = self.free {
            // SAFETY: the address came from a compatible allocation or is
            // null, and free strategies accept null.
            unsafe { free(self.ptr) };
        }
        self.ptr = ptr::null_mut();
    }

    /// Gives up the address without freeing it.
    pub fn into_raw(self) -> *mut u8 {
        self.ptr
    }
}

impl PartialEq for StringHandle {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.ptr, other.ptr)
    }
}

impl Eq for StringHandle {}

impl Hash for StringHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ptr.hash(state);
    }
}

impl fmt::Debug for StringHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringHandle")
            .field("address", &self.ptr)
            .field("frees", &self.free.is_some())
            .finish()
    }
}

impl fmt::Display for StringHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.read())
    }
}

// SAFETY: the handle is the only owner of its string memory, and the
// strategies are plain function pointers.
unsafe impl Send for StringHandle {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::string::Encoding;

    #[test]
    fn test_read_and_release() {
        let mut handle = StringHandle::new("hello", &Marshaler::UTF8).unwrap();
        assert_eq!(handle.read(), "hello");
        assert!(!handle.is_released());

        handle.release();
        assert!(handle.is_released());
        assert!(handle.as_ptr().is_null());
        assert_eq!(handle.read(), "");
    }

    #[test]
    fn test_double_release_is_harmless() {
        let mut handle = StringHandle::new("twice", &Marshaler::SINGLE_BYTE).unwrap();
        handle.release();
        handle.release();
        assert_eq!(handle.read(), "");
    }

    #[test]
    fn test_read_sees_native_writes() {
        let mut handle = StringHandle::new("cat", &Marshaler::UTF8).unwrap();
        unsafe { *handle.as_mut_ptr() = b'b' };
        assert_eq!(handle.read(), "bat");
        handle.release();
    }

    #[test]
    fn test_with_capacity_starts_empty() {
        let mut handle = StringHandle::with_capacity(6, &Marshaler::UTF8).unwrap();
        assert_eq!(handle.read(), "");

        let bytes = Encoding::Utf8.encode("fill");
        unsafe {
            handle
                .as_mut_ptr()
                .copy_from_nonoverlapping(bytes.as_ptr(), bytes.len())
        };
        assert_eq!(handle.read(), "fill");
        handle.release();
    }

    #[test]
    fn test_with_capacity_below_terminator() {
        for byte_len in [0, 1, 2] {
            let mut wide = StringHandle::with_capacity(byte_len, &Marshaler::UTF16).unwrap();
            assert_eq!(wide.read(), "");
            assert_eq!(wide.to_string(), "");
            wide.release();

            let mut narrow = StringHandle::with_capacity(byte_len, &Marshaler::UTF8).unwrap();
            assert_eq!(narrow.read(), "");
            narrow.release();
        }
    }

    #[test]
    fn test_with_capacity_utf16_filled() {
        let bytes = Encoding::Utf16.encode("ok");
        let mut handle = StringHandle::with_capacity(bytes.len(), &Marshaler::UTF16).unwrap();
        assert_eq!(handle.read(), "");
        unsafe {
            handle
                .as_mut_ptr()
                .copy_from_nonoverlapping(bytes.as_ptr(), bytes.len())
        };
        assert_eq!(handle.read(), "ok");
        handle.release();
    }

    #[test]
    fn test_from_null_reads_empty() {
        let mut handle = unsafe { StringHandle::from_raw(ptr::null_mut(), &Marshaler::UTF8) };
        assert_eq!(handle.read(), "");
        assert!(handle.is_released());
        handle.release();
    }

    #[test]
    fn test_identity_equality() {
        let mut a = StringHandle::new("same", &Marshaler::UTF8).unwrap();
        let mut b = StringHandle::new("same", &Marshaler::UTF8).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.read(), b.read());

        let borrowed = Marshaler::UTF8.without_free();
        let alias = unsafe { StringHandle::from_raw(a.as_mut_ptr(), &borrowed) };
        assert_eq!(a, alias);
        let _ = alias.into_raw();

        a.release();
        b.release();
        assert_eq!(a, b);
    }

    #[test]
    fn test_display_decodes() {
        let mut handle = StringHandle::new("shown", &Marshaler::UTF16).unwrap();
        assert_eq!(handle.to_string(), "shown");
        handle.release();
    }

    #[test]
    fn test_without_free_leaves_memory() {
        let owner = StringHandle::new("kept", &Marshaler::UTF8).unwrap();
        let raw = owner.into_raw();

        let mut borrowed = unsafe { StringHandle::from_raw(raw, &Marshaler::UTF8.without_free()) };
        borrowed.release();

        let mut owner = unsafe { StringHandle::from_raw(raw, &Marshaler::UTF8) };
        assert_eq!(owner.read(), "kept");
        owner.release();
    }
}
