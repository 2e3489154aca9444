//! Fixed-size block recycling on top of another strategy.

use std::cell::RefCell;
use std::fmt;
use std::ptr::NonNull;

use tracing::trace;

use super::{Malloc, RawAllocator};
use crate::config::PoolConfig;
use crate::error::{BufferError, Result};

/// An allocator that hands out blocks of one fixed size and keeps freed
/// blocks on a free list for reuse.
///
/// Because `free` only receives an address, every block has the configured
/// `block_size`; larger requests fail with [`BufferError::AllocationFailed`].
/// Up to `max_cached` freed blocks are retained, further ones go straight back
/// to the backing strategy. Cached blocks are returned to the backing
/// strategy when the pool is dropped, so every block must be freed back to
/// the pool before that.
///
/// The free list lives in a `RefCell`; a pool is not `Sync`.
///
/// # Example
///
/// ```
/// use nativebuf::{BlockPool, PoolConfig, RawBuffer};
///
/// let pool = BlockPool::new(PoolConfig::new(64, 4)?);
/// let buf = RawBuffer::<u8>::allocate_in(&pool, 64)?;
/// unsafe { buf.release_in(&pool) };
/// assert_eq!(pool.cached(), 1);
/// # Ok::<(), nativebuf::BufferError>(())
/// ```
pub struct BlockPool<A: RawAllocator = Malloc> {
    config: PoolConfig,
    backing: A,
    free_blocks: RefCell<Vec<NonNull<u8>>>,
}

impl BlockPool<Malloc> {
    /// Creates a pool backed by the platform heap.
    pub fn new(config: PoolConfig) -> Self {
        Self::with_backing(config, Malloc)
    }
}

impl<A: RawAllocator> BlockPool<A> {
    /// Creates a pool that draws fresh blocks from `backing`.
    pub fn with_backing(config: PoolConfig, backing: A) -> Self {
        Self {
            config,
            backing,
            free_blocks: RefCell::new(Vec::with_capacity(config.max_cached())),
        }
    }

    /// Returns the pool configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Returns the number of freed blocks waiting for reuse.
    pub fn cached(&self) -> usize {
        self.free_blocks.borrow().len()
    }
}

impl<A: RawAllocator> RawAllocator for BlockPool<A> {
    fn allocate(&self, byte_count: usize) -> Result<NonNull<u8>> {
        if byte_count > self.config.block_size() {
            return Err(BufferError::AllocationFailed { bytes: byte_count });
        }

        if let Some(block) = self.free_blocks.borrow_mut().pop() {
            trace!(address = ?block, "pool reuse");
            return Ok(block);
        }

        self.backing.allocate(self.config.block_size())
    }

    unsafe fn free(&self, address: *mut u8) {
        let Some(block) = NonNull::new(address) else {
            return;
        };

        let mut free_blocks = self.free_blocks.borrow_mut();
        if free_blocks.len() < self.config.max_cached() {
            free_blocks.push(block);
        } else {
            // SAFETY: every block this pool hands out came from `backing`.
            unsafe { self.backing.free(address) };
        }
    }
}

impl<A: RawAllocator> Drop for BlockPool<A> {
    fn drop(&mut self) {
        for block in self.free_blocks.get_mut().drain(..) {
            // SAFETY: cached blocks are owned by the pool and came from `backing`.
            unsafe { self.backing.free(block.as_ptr()) };
        }
    }
}

impl<A: RawAllocator> fmt::Debug for BlockPool<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockPool")
            .field("config", &self.config)
            .field("cached", &self.cached())
            .finish()
    }
}
