//! The RawBuffer family.
//!
//! - [`RawBuffer`] - Mutable `{address, length}` view, `Copy`, never frees
//! - [`ReadOnlyBuffer`] - Read-only projection of a `RawBuffer`
//! - [`OwnedBuffer`] - Owning handle with borrow-checked slices
//! - [`Plain`] - Element types valid for any bit pattern
//!
//! Every precondition has two entry points: a `try_*` method that checks it
//! and returns a [`BufferError`](crate::BufferError), and an `*_unchecked`
//! (or plain, for copies) `unsafe` method that only `debug_assert!`s it.

mod owned;
mod plain;
mod raw;
mod read_only;

pub use owned::OwnedBuffer;
pub use plain::Plain;
pub use raw::RawBuffer;
pub use read_only::ReadOnlyBuffer;

pub(crate) use raw::check_index;
