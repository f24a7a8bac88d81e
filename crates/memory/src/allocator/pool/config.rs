//! Pool allocator configuration

/// Smallest block any size class hands out: room for one free-list link
pub const MIN_BLOCK_SIZE: usize = size_of::<usize>();

/// Blocks carved from one upstream chunk when no hint is given
pub const DEFAULT_MAX_BLOCKS_PER_CHUNK: usize = 32;

/// Largest pooled block size when no hint is given
pub const DEFAULT_LARGEST_REQUIRED_POOL_BLOCK: usize = 4 * 1024;

/// Ceiling for `largest_required_pool_block`
pub const MAX_LARGEST_REQUIRED_POOL_BLOCK: usize = 1024 * 1024;

/// Configuration for [`PoolAllocator`](super::PoolAllocator)
///
/// Both fields are hints; zero selects the default. The allocator keeps the
/// [`normalized`](Self::normalized) form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolOptions {
    /// Upper bound on blocks carved from a single upstream chunk
    pub max_blocks_per_chunk: usize,

    /// Requests above this size bypass the size classes
    pub largest_required_pool_block: usize,
}

impl PoolOptions {
    /// Options with both hints set
    #[must_use]
    pub const fn new(max_blocks_per_chunk: usize, largest_required_pool_block: usize) -> Self {
        Self {
            max_blocks_per_chunk,
            largest_required_pool_block,
        }
    }

    /// Set the blocks-per-chunk hint
    #[must_use]
    pub const fn with_max_blocks_per_chunk(mut self, blocks: usize) -> Self {
        self.max_blocks_per_chunk = blocks;
        self
    }

    /// Set the largest pooled block hint
    #[must_use]
    pub const fn with_largest_required_pool_block(mut self, bytes: usize) -> Self {
        self.largest_required_pool_block = bytes;
        self
    }

    /// Many small objects: few classes, large chunks
    #[must_use]
    pub const fn small_objects() -> Self {
        Self::new(256, 256)
    }

    /// Larger objects: classes up to 64 KiB, small chunks
    #[must_use]
    pub const fn large_objects() -> Self {
        Self::new(8, 64 * 1024)
    }

    /// Effective values the allocator runs with
    ///
    /// Zero hints become the defaults, `largest_required_pool_block` is
    /// clamped into `[MIN_BLOCK_SIZE, MAX_LARGEST_REQUIRED_POOL_BLOCK]` and
    /// rounded up to a power of two.
    #[must_use]
    pub const fn normalized(&self) -> Self {
        let max_blocks_per_chunk = if self.max_blocks_per_chunk == 0 {
            DEFAULT_MAX_BLOCKS_PER_CHUNK
        } else {
            self.max_blocks_per_chunk
        };

        let mut largest = if self.largest_required_pool_block == 0 {
            DEFAULT_LARGEST_REQUIRED_POOL_BLOCK
        } else {
            self.largest_required_pool_block
        };
        if largest < MIN_BLOCK_SIZE {
            largest = MIN_BLOCK_SIZE;
        } else if largest > MAX_LARGEST_REQUIRED_POOL_BLOCK {
            largest = MAX_LARGEST_REQUIRED_POOL_BLOCK;
        }

        Self {
            max_blocks_per_chunk,
            largest_required_pool_block: largest.next_power_of_two(),
        }
    }
}
