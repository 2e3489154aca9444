//! Encode/decode/allocate/free strategy bundles for native strings.

use std::fmt;
use std::ptr::NonNull;

use super::Encoding;
use crate::alloc::{Malloc, RawAllocator};
use crate::error::Result;

/// Encodes a value into newly allocated native memory.
pub type EncodeFn = fn(&str) -> Result<NonNull<u8>>;

/// Decodes the native string at an address. Must return `""` for null.
pub type DecodeFn = unsafe fn(*const u8) -> String;

/// Allocates zero-filled native memory of a byte length.
pub type AllocateFn = fn(usize) -> Result<NonNull<u8>>;

/// Frees native memory. Must accept null as a no-op.
pub type FreeFn = unsafe fn(*mut u8);

/// The strategies a string handle uses to move values across the native
/// boundary.
///
/// A `Marshaler` is a plain value chosen per construction; handles copy the
/// decode and free functions they need. The built-in marshalers encode with
/// [`Encoding`] into memory from `malloc` and free with `free`, so native
/// code may take over or hand over strings allocated by the C heap.
///
/// # Example
///
/// ```
/// use nativebuf::{Encoding, Marshaler, StringHandle};
///
/// let marshaler = Marshaler::new(Encoding::Utf16);
/// let mut handle = StringHandle::new("wide", &marshaler)?;
/// assert_eq!(handle.read(), "wide");
/// handle.release();
/// # Ok::<(), nativebuf::BufferError>(())
/// ```
#[derive(Clone, Copy)]
pub struct Marshaler {
    label: &'static str,
    encode: EncodeFn,
    decode: DecodeFn,
    allocate: AllocateFn,
    free: Option<FreeFn>,
    terminator_size: usize,
}

impl Marshaler {
    /// UTF-8 on the C heap.
    pub const UTF8: Self = Self::new(Encoding::Utf8);

    /// UTF-16 on the C heap.
    pub const UTF16: Self = Self::new(Encoding::Utf16);

    /// ISO-8859-1 on the C heap.
    pub const SINGLE_BYTE: Self = Self::new(Encoding::SingleByte);

    /// The platform encoding on the C heap.
    pub const PLATFORM: Self = Self::new(Encoding::Platform);

    /// The built-in marshaler for `encoding`.
    pub const fn new(encoding: Encoding) -> Self {
        let (label, encode, decode): (&'static str, EncodeFn, DecodeFn) = match encoding.resolve() {
            Encoding::SingleByte => ("single-byte", encode_single_byte, decode_single_byte),
            Encoding::Utf16 => ("utf-16", encode_utf16, decode_utf16),
            _ => ("utf-8", encode_utf8, decode_utf8),
        };

        Self {
            label,
            encode,
            decode,
            allocate: allocate_zeroed,
            free: Some(free),
            terminator_size: encoding.unit_size(),
        }
    }

    /// A marshaler built from caller-supplied functions.
    ///
    /// The terminator size starts at one byte; set a wider one with
    /// [`with_terminator_size`](Self::with_terminator_size).
    ///
    /// # Safety
    ///
    /// `decode` must accept null, every address `encode` returns, and every
    /// zero-filled block of at least the terminator size from `allocate`,
    /// reading nothing past the first zero terminator. `free`, if given, must
    /// accept null as a no-op and must release exactly the memory `encode`
    /// and `allocate` hand out.
    pub const unsafe fn custom(
        label: &'static str,
        encode: EncodeFn,
        decode: DecodeFn,
        allocate: AllocateFn,
        free: Option<FreeFn>,
    ) -> Self {
        Self {
            label,
            encode,
            decode,
            allocate,
            free,
            terminator_size: 1,
        }
    }

    /// The same marshaler with a terminator of `bytes` bytes.
    ///
    /// # Safety
    ///
    /// `decode` must not read past `bytes` zero bytes at the start of a
    /// block. A zero size is raised to one.
    pub const unsafe fn with_terminator_size(self, bytes: usize) -> Self {
        let terminator_size = if bytes == 0 { 1 } else { bytes };
        Self {
            terminator_size,
            ..self
        }
    }

    /// The same marshaler with no free strategy.
    ///
    /// Handles built with it never free their memory; use it for strings
    /// whose storage native code keeps ownership of.
    pub const fn without_free(self) -> Self {
        Self { free: None, ..self }
    }

    /// A short name for logs and `Debug` output.
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Encodes `value` into newly allocated native memory.
    pub fn encode(&self, value: &str) -> Result<NonNull<u8>> {
        (self.encode)(value)
    }

    /// Decodes the native string at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a live, terminated string in this marshaler's
    /// representation.
    pub unsafe fn decode(&self, ptr: *const u8) -> String {
        // SAFETY: forwarded contract.
        unsafe { (self.decode)(ptr) }
    }

    /// Allocates `byte_len` zero-filled bytes.
    pub fn allocate(&self, byte_len: usize) -> Result<NonNull<u8>> {
        (self.allocate)(byte_len)
    }

    /// Width of the zero terminator, and so the smallest block `decode`
    /// can safely read.
    pub const fn terminator_size(&self) -> usize {
        self.terminator_size
    }

    /// The decode strategy.
    pub const fn decoder(&self) -> DecodeFn {
        self.decode
    }

    /// The free strategy, if any.
    pub const fn freer(&self) -> Option<FreeFn> {
        self.free
    }
}

impl Default for Marshaler {
    fn default() -> Self {
        Self::PLATFORM
    }
}

impl fmt::Debug for Marshaler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Marshaler")
            .field("label", &self.label)
            .field("frees", &self.free.is_some())
            .field("terminator_size", &self.terminator_size)
            .finish()
    }
}

fn encode_with(encoding: Encoding, value: &str) -> Result<NonNull<u8>> {
    let bytes = encoding.encode(value);
    let ptr = Malloc.allocate(bytes.len())?;
    // SAFETY: `ptr` is a fresh block of `bytes.len()` bytes.
    unsafe { ptr.as_ptr().copy_from_nonoverlapping(bytes.as_ptr(), bytes.len()) };
    Ok(ptr)
}

fn encode_utf8(value: &str) -> Result<NonNull<u8>> {
    encode_with(Encoding::Utf8, value)
}

fn encode_utf16(value: &str) -> Result<NonNull<u8>> {
    encode_with(Encoding::Utf16, value)
}

fn encode_single_byte(value: &str) -> Result<NonNull<u8>> {
    encode_with(Encoding::SingleByte, value)
}

unsafe fn decode_utf8(ptr: *const u8) -> String {
    // SAFETY: forwarded contract.
    unsafe { Encoding::Utf8.decode(ptr) }
}

unsafe fn decode_utf16(ptr: *const u8) -> String {
    // SAFETY: forwarded contract.
    unsafe { Encoding::Utf16.decode(ptr) }
}

unsafe fn decode_single_byte(ptr: *const u8) -> String {
    // SAFETY: forwarded contract.
    unsafe { Encoding::SingleByte.decode(ptr) }
}

fn allocate_zeroed(byte_len: usize) -> Result<NonNull<u8>> {
    Malloc.allocate_zeroed(byte_len)
}

unsafe fn free(ptr: *mut u8) {
    // SAFETY: forwarded contract; `free(NULL)` is a no-op.
    unsafe { Malloc.free(ptr) }
}
