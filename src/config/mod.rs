//! Configuration for bounds checking and pooled allocation.
//!
//! - [`BoundsPolicy`] - Which slice requests the checked entry points accept
//! - [`PoolConfig`] - Block size and cache depth for [`BlockPool`](crate::BlockPool)
//!
//! # Example
//!
//! ```
//! use nativebuf::{BoundsPolicy, PoolConfig};
//!
//! let policy = BoundsPolicy::InclusiveEnd;
//! assert!(policy.accepts(4, 0, 4));
//!
//! let config = PoolConfig::new(256, 8)?;
//! assert_eq!(config.block_size(), 256);
//! # Ok::<(), nativebuf::BufferError>(())
//! ```

use crate::error::{BufferError, Result};

/// Default pooled block size (4 KiB).
pub const DEFAULT_BLOCK_SIZE: usize = 4 * 1024;

/// Default number of free blocks a pool keeps around.
pub const DEFAULT_MAX_CACHED: usize = 16;

/// Precondition used by checked slicing.
///
/// `Strict` requires `start < length`, so a zero-length slice positioned
/// exactly at the end of a buffer is rejected. `InclusiveEnd` also accepts
/// `start == length` as long as the requested length is zero.
///
/// # Example
///
/// ```
/// use nativebuf::BoundsPolicy;
///
/// assert!(!BoundsPolicy::Strict.accepts(8, 0, 8));
/// assert!(BoundsPolicy::InclusiveEnd.accepts(8, 0, 8));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoundsPolicy {
    /// `0 <= start < available` and `length <= available - start`.
    #[default]
    Strict,
    /// `0 <= start <= available` and `length <= available - start`.
    InclusiveEnd,
}

impl BoundsPolicy {
    /// Returns true if slicing `length` elements at `start` out of
    /// `available` satisfies this policy.
    pub const fn accepts(self, start: usize, length: usize, available: usize) -> bool {
        let start_ok = match self {
            BoundsPolicy::Strict => start < available,
            BoundsPolicy::InclusiveEnd => start <= available,
        };
        start_ok && length <= available - start
    }

    /// Like [`accepts`](Self::accepts), mapping a rejection to
    /// [`BufferError::SliceOutOfRange`].
    pub fn check(self, start: usize, length: usize, available: usize) -> Result<()> {
        if self.accepts(start, length, available) {
            Ok(())
        } else {
            Err(BufferError::SliceOutOfRange {
                start,
                length,
                available,
            })
        }
    }
}

/// Sizing for a [`BlockPool`](crate::BlockPool).
///
/// Every block handed out by the pool is `block_size` bytes; requests larger
/// than that fail with [`BufferError::AllocationFailed`]. At most
/// `max_cached` freed blocks are kept for reuse, the rest go back to the
/// backing allocator.
///
/// # Example
///
/// ```
/// use nativebuf::PoolConfig;
///
/// let config = PoolConfig::default()
///     .with_block_size(1024)
///     .with_max_cached(4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolConfig {
    block_size: usize,
    max_cached: usize,
}

impl PoolConfig {
    /// Creates a new pool configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidConfig`] if `block_size` is zero.
    pub fn new(block_size: usize, max_cached: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(BufferError::InvalidConfig {
                message: "block_size must be non-zero",
            });
        }

        Ok(Self {
            block_size,
            max_cached,
        })
    }

    /// Sets the block size.
    ///
    /// Note: This does not validate the configuration. Use
    /// [`PoolConfig::validate`] to check it.
    pub fn with_block_size(mut self, size: usize) -> Self {
        self.block_size = size;
        self
    }

    /// Sets how many freed blocks are cached for reuse.
    pub fn with_max_cached(mut self, count: usize) -> Self {
        self.max_cached = count;
        self
    }

    /// Returns the block size in bytes.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns the maximum number of cached free blocks.
    pub fn max_cached(&self) -> usize {
        self.max_cached
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<()> {
        Self::new(self.block_size, self.max_cached).map(|_| ())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            max_cached: DEFAULT_MAX_CACHED,
        }
    }
}
