//! Segregated free-list pool

use core::cell::RefCell;
use core::fmt;
use core::ptr::NonNull;

#[cfg(feature = "logging")]
use tracing::debug;

use super::config::{MIN_BLOCK_SIZE, PoolOptions};
use super::size_class::SizeClassPool;
use super::stats::PoolStats;
use crate::allocator::chunk_chain::ChunkChain;
use crate::error::MemoryResult;
use crate::resource::{MemoryResource, SharedResource, Upstream, get_default_resource};

/// Mutable part of the pool
#[derive(Debug)]
struct PoolState {
    /// Ascending power-of-two block sizes from `MIN_BLOCK_SIZE`
    classes: Vec<SizeClassPool>,
    oversized: ChunkChain,
}

/// Pool allocator with one free list per power-of-two size class
///
/// Requests up to [`PoolOptions::largest_required_pool_block`] are rounded up
/// to their size class and served from its free list; each class refills by
/// carving a chunk of `max_blocks_per_chunk` blocks from upstream. Larger
/// requests get a dedicated upstream chunk each.
///
/// Deallocated blocks go back to their free list. Nothing returns to upstream
/// before [`release`](Self::release) or drop; that includes oversized blocks.
///
/// Not `Sync`; see [`ThreadSafePoolAllocator`](super::ThreadSafePoolAllocator)
/// for concurrent use.
pub struct PoolAllocator<R = SharedResource>
where
    R: Upstream,
{
    upstream: R,
    options: PoolOptions,
    state: RefCell<PoolState>,
}

impl PoolAllocator {
    /// Pool over the current default resource with default options
    #[must_use]
    pub fn new() -> Self {
        Self::with_upstream(get_default_resource())
    }
}

impl Default for PoolAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> PoolAllocator<R>
where
    R: Upstream,
{
    /// Pool over `upstream` with default options
    pub fn with_upstream(upstream: R) -> Self {
        Self::with_options(PoolOptions::default(), upstream)
    }

    /// Pool over `upstream`; `options` are normalized, never rejected
    pub fn with_options(options: PoolOptions, upstream: R) -> Self {
        let options = options.normalized();
        let classes = class_sizes(options.largest_required_pool_block)
            .map(|block_size| SizeClassPool::new(block_size, options.max_blocks_per_chunk))
            .collect();

        Self {
            upstream,
            options,
            state: RefCell::new(PoolState {
                classes,
                oversized: ChunkChain::new(),
            }),
        }
    }

    /// Resource chunks are requested from
    #[inline]
    pub fn upstream_resource(&self) -> &R {
        &self.upstream
    }

    /// Effective options after normalization
    #[inline]
    #[must_use]
    pub fn options(&self) -> PoolOptions {
        self.options
    }

    /// Block size of the class serving `bytes` at `align`
    ///
    /// `None` means the request is oversized and bypasses the classes.
    #[must_use]
    pub fn select_pool(&self, bytes: usize, align: usize) -> Option<usize> {
        self.class_index(bytes, align)
            .map(|index| MIN_BLOCK_SIZE << index)
    }

    /// Returns every chunk of every class and of the oversized chain
    ///
    /// The pool stays usable with the same options. Every pointer handed out
    /// before becomes invalid.
    pub fn release(&mut self) {
        let state = self.state.get_mut();

        #[cfg(feature = "logging")]
        debug!(
            upstream_bytes = state.upstream_bytes(),
            oversized_chunks = state.oversized.chunk_count(),
            "pool released"
        );

        let upstream = &*self.upstream;
        for class in &mut state.classes {
            // SAFETY: every chunk came from `upstream`; `&mut self` rules out
            // concurrent use.
            unsafe { class.release(upstream) };
        }
        // SAFETY: as above.
        unsafe { state.oversized.release(upstream) };
    }

    /// Snapshot of every class and the oversized chain
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let state = self.state.borrow();
        PoolStats {
            classes: state.classes.iter().map(SizeClassPool::stats).collect(),
            oversized_chunks: state.oversized.chunk_count(),
            upstream_bytes: state.upstream_bytes(),
        }
    }

    fn class_index(&self, bytes: usize, align: usize) -> Option<usize> {
        let need = bytes.max(align).max(MIN_BLOCK_SIZE);
        if need > self.options.largest_required_pool_block {
            return None;
        }
        let block_size = need.next_power_of_two();
        Some((block_size.trailing_zeros() - MIN_BLOCK_SIZE.trailing_zeros()) as usize)
    }
}

impl PoolState {
    fn upstream_bytes(&self) -> usize {
        self.classes
            .iter()
            .map(SizeClassPool::bytes_owned)
            .sum::<usize>()
            + self.oversized.bytes_owned()
    }
}

/// Power-of-two block sizes from `MIN_BLOCK_SIZE` up to `largest`
fn class_sizes(largest: usize) -> impl Iterator<Item = usize> {
    core::iter::successors(Some(MIN_BLOCK_SIZE), move |&size| {
        (size < largest).then(|| size * 2)
    })
}

impl<R> MemoryResource for PoolAllocator<R>
where
    R: Upstream,
{
    fn do_allocate(&self, bytes: usize, align: usize) -> MemoryResult<NonNull<u8>> {
        let mut state = self.state.borrow_mut();
        match self.class_index(bytes, align) {
            Some(index) => state.classes[index].allocate(&*self.upstream),
            None => state.oversized.extend(bytes, &*self.upstream),
        }
    }

    unsafe fn do_deallocate(&self, ptr: NonNull<u8>, bytes: usize, align: usize) {
        let Some(index) = self.class_index(bytes, align) else {
            // Oversized chunks are returned in bulk by `release`.
            return;
        };
        let mut state = self.state.borrow_mut();
        debug_assert_eq!(
            state.classes[index].block_size(),
            MIN_BLOCK_SIZE << index
        );
        // SAFETY: same `bytes`/`align` as the allocation, so the block belongs
        // to this class.
        unsafe { state.classes[index].deallocate(ptr) };
    }
}

impl<R> Drop for PoolAllocator<R>
where
    R: Upstream,
{
    fn drop(&mut self) {
        self.release();
    }
}

impl<R> fmt::Debug for PoolAllocator<R>
where
    R: Upstream,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolAllocator")
            .field("options", &self.options)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
