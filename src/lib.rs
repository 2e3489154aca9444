//! nativebuf
//!
//! Value-type views over unmanaged memory for code that talks to native
//! libraries.
//!
//! `nativebuf` describes memory it does not own with plain `{address, length}`
//! values and lets the caller pick how that memory is allocated, encoded and
//! freed:
//!
//! - [`RawBuffer`] / [`ReadOnlyBuffer`] - typed views, `Copy`, never free on drop
//! - [`OwnedBuffer`] - an owning form whose slices are borrow-checked
//! - [`PointerTable`] - a buffer of addresses (`T**`)
//! - [`StringHandle`] / [`CachedStringHandle`] - native strings, lazily or eagerly decoded
//! - [`RawAllocator`] / [`Marshaler`] - the pluggable strategies
//!
//! The crate intentionally:
//! - does NOT free anything implicitly
//! - does NOT track lifetimes of raw views
//! - does NOT keep process-wide allocator or encoding state
//!
//! Checked entry points (`try_*`) return [`BufferError`]; the `unsafe`
//! unchecked ones only `debug_assert!` their preconditions.
//!
//! # Buffers
//!
//! ```
//! use nativebuf::{Malloc, RawBuffer};
//!
//! let alloc = Malloc;
//! let buf = RawBuffer::<u32>::allocate_zeroed_in(&alloc, 4)?;
//! let tail = buf.try_slice_from(2)?;
//! unsafe {
//!     tail.fill(7);
//!     assert_eq!(buf.as_slice(), &[0, 0, 7, 7]);
//!     buf.release_in(&alloc);
//! }
//! # Ok::<(), nativebuf::BufferError>(())
//! ```
//!
//! # Strings
//!
//! ```
//! use nativebuf::{Marshaler, StringHandle};
//!
//! let mut name = StringHandle::new("libfoo", &Marshaler::UTF8)?;
//! // pass `name.as_ptr()` to native code
//! assert_eq!(name.read(), "libfoo");
//! name.release();
//! # Ok::<(), nativebuf::BufferError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

mod alloc;
mod buffer;
mod config;
mod error;
mod string;
mod table;

#[cfg(feature = "hash")]
mod hash;

//
// Public surface
//

pub use alloc::{AllocStats, BlockPool, Malloc, RawAllocator, Tracked};
pub use buffer::{OwnedBuffer, Plain, RawBuffer, ReadOnlyBuffer};
pub use config::{BoundsPolicy, DEFAULT_BLOCK_SIZE, DEFAULT_MAX_CACHED, PoolConfig};
pub use error::{BufferError, Result};
pub use string::{
    AllocateFn, CachedStringHandle, DecodeFn, EncodeFn, Encoding, FreeFn, Marshaler,
    StringHandle,
};
pub use table::PointerTable;

#[cfg(feature = "hash")]
pub use hash::ContentHash;

#[cfg(feature = "hash-blake3")]
pub use hash::Blake3Hasher;
