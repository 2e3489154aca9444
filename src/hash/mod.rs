//! Content hashing of viewed memory.
//!
//! Buffers and handles compare by identity. When two regions need to be
//! compared by what they hold, hash them:
//!
//! - [`ContentHash`] - A 32-byte digest
//! - [`Blake3Hasher`] - Incremental BLAKE3 over several regions (requires `hash-blake3` feature)

mod content;

#[cfg(feature = "hash-blake3")]
mod blake3;

pub use content::ContentHash;

#[cfg(feature = "hash-blake3")]
pub use blake3::Blake3Hasher;
