//! Segregated size-class pools
//!
//! [`PoolAllocator`] is the single-threaded strategy;
//! [`ThreadSafePoolAllocator`] wraps it in one mutex.
//!
//! # Examples
//! ```
//! use strata_memory::allocator::{PoolAllocator, PoolOptions};
//! use strata_memory::resource::{MemoryResource, system_resource};
//!
//! let pool = PoolAllocator::with_options(PoolOptions::small_objects(), system_resource());
//! let ptr = pool.allocate(24, 8)?.expect("non-zero request");
//! // SAFETY: same size and alignment as the allocation.
//! unsafe { pool.deallocate(ptr, 24, 8) };
//! assert_eq!(pool.stats().blocks_in_use(), 0);
//! # Ok::<(), strata_memory::error::MemoryError>(())
//! ```

mod allocator;
mod config;
mod size_class;
mod stats;
mod thread_safe;

pub use allocator::PoolAllocator;
pub use config::{
    DEFAULT_LARGEST_REQUIRED_POOL_BLOCK, DEFAULT_MAX_BLOCKS_PER_CHUNK, MAX_LARGEST_REQUIRED_POOL_BLOCK,
    MIN_BLOCK_SIZE, PoolOptions,
};
pub use stats::{PoolStats, SizeClassStats};
pub use thread_safe::ThreadSafePoolAllocator;
