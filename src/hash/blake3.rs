//! BLAKE3 digests of memory regions.

use super::ContentHash;

/// Incremental BLAKE3 hasher.
///
/// # Example
///
/// ```
/// use nativebuf::{Blake3Hasher, ReadOnlyBuffer};
///
/// let head = [1u8, 2];
/// let tail = [3u8];
/// let mut hasher = Blake3Hasher::new();
/// hasher.update(unsafe { ReadOnlyBuffer::from_slice(&head).as_bytes() });
/// hasher.update(unsafe { ReadOnlyBuffer::from_slice(&tail).as_bytes() });
///
/// let whole = ReadOnlyBuffer::from_slice(&[1u8, 2, 3]);
/// assert_eq!(hasher.finalize(), unsafe { whole.content_hash() });
/// ```
#[derive(Debug, Clone)]
pub struct Blake3Hasher {
    state: blake3::Hasher,
}

impl Blake3Hasher {
    /// Creates a new hasher.
    pub fn new() -> Self {
        Self {
            state: blake3::Hasher::new(),
        }
    }

    /// Feeds more bytes.
    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    /// Returns the digest of everything fed so far.
    pub fn finalize(&self) -> ContentHash {
        ContentHash::new(self.state.finalize().into())
    }

    /// Resets the hasher to its initial state.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub(crate) fn hash(data: &[u8]) -> ContentHash {
        ContentHash::new(blake3::hash(data).into())
    }
}

impl Default for Blake3Hasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash() {
        let hash = Blake3Hasher::hash(b"native memory");
        assert_eq!(hash, Blake3Hasher::hash(b"native memory"));
        assert_ne!(hash, Blake3Hasher::hash(b"native memory!"));
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let mut hasher = Blake3Hasher::new();
        hasher.update(b"native ");
        hasher.update(b"memory");
        assert_eq!(hasher.finalize(), Blake3Hasher::hash(b"native memory"));
    }

    #[test]
    fn test_reset() {
        let mut hasher = Blake3Hasher::new();
        hasher.update(b"discarded");
        hasher.reset();
        hasher.update(b"kept");
        assert_eq!(hasher.finalize(), Blake3Hasher::hash(b"kept"));
    }
}
