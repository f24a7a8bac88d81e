//! One size class: a free list threaded through its own blocks

use core::ptr::NonNull;

#[cfg(feature = "logging")]
use tracing::trace;

use super::stats::SizeClassStats;
use crate::allocator::chunk_chain::ChunkChain;
use crate::error::{MemoryError, MemoryResult};
use crate::resource::MemoryResource;

/// Link stored in the first word of every free block
#[repr(C)]
struct FreeBlock {
    next: Option<NonNull<FreeBlock>>,
}

/// Fixed-size blocks carved from chunks of `blocks_per_chunk` blocks
#[derive(Debug)]
pub(crate) struct SizeClassPool {
    block_size: usize,
    blocks_per_chunk: usize,
    free: Option<NonNull<FreeBlock>>,
    free_count: usize,
    chunks: ChunkChain,
}

// SAFETY: free blocks live inside chunks owned by `chunks`; nothing else
// references them, so ownership moves with the pool.
unsafe impl Send for SizeClassPool {}

impl SizeClassPool {
    /// `block_size` must be a power of two of at least one link
    pub(crate) const fn new(block_size: usize, blocks_per_chunk: usize) -> Self {
        debug_assert!(block_size.is_power_of_two());
        debug_assert!(block_size >= size_of::<FreeBlock>());
        debug_assert!(blocks_per_chunk > 0);
        Self {
            block_size,
            blocks_per_chunk,
            free: None,
            free_count: 0,
            chunks: ChunkChain::new(),
        }
    }

    #[inline]
    pub(crate) fn block_size(&self) -> usize {
        self.block_size
    }

    /// Pops a block, carving a fresh chunk first if the free list is empty
    pub(crate) fn allocate<U>(&mut self, upstream: &U) -> MemoryResult<NonNull<u8>>
    where
        U: ?Sized + MemoryResource,
    {
        if self.free.is_none() {
            self.replenish(upstream)?;
        }
        self.pop()
            .ok_or_else(|| MemoryError::out_of_memory(self.block_size, self.block_size))
    }

    /// Pushes a block back onto the free list
    ///
    /// # Safety
    ///
    /// `ptr` must be a block handed out by this class and not already free.
    #[inline]
    pub(crate) unsafe fn deallocate(&mut self, ptr: NonNull<u8>) {
        let block = ptr.cast::<FreeBlock>();
        // SAFETY: the block is at least one link wide, aligned for it, and
        // unused by the caller from now on.
        unsafe { block.write(FreeBlock { next: self.free }) };
        self.free = Some(block);
        self.free_count += 1;
    }

    /// Returns every chunk to `upstream` and forgets the free list
    ///
    /// # Safety
    ///
    /// `upstream` must be the resource the chunks came from; no block may be
    /// used afterwards.
    pub(crate) unsafe fn release<U>(&mut self, upstream: &U)
    where
        U: ?Sized + MemoryResource,
    {
        // SAFETY: forwarded caller contract.
        unsafe { self.chunks.release(upstream) };
        self.free = None;
        self.free_count = 0;
    }

    pub(crate) fn bytes_owned(&self) -> usize {
        self.chunks.bytes_owned()
    }

    pub(crate) fn stats(&self) -> SizeClassStats {
        SizeClassStats {
            block_size: self.block_size,
            blocks_per_chunk: self.blocks_per_chunk,
            chunks: self.chunks.chunk_count(),
            free_blocks: self.free_count,
        }
    }

    fn pop(&mut self) -> Option<NonNull<u8>> {
        let block = self.free?;
        // SAFETY: every block on the list was written by `deallocate` or
        // `replenish` and is still owned by this class.
        self.free = unsafe { block.as_ref().next };
        self.free_count -= 1;
        Some(block.cast())
    }

    fn replenish<U>(&mut self, upstream: &U) -> MemoryResult<()>
    where
        U: ?Sized + MemoryResource,
    {
        let chunk_bytes = self
            .block_size
            .checked_mul(self.blocks_per_chunk)
            .ok_or_else(|| MemoryError::size_overflow("pool chunk size"))?;
        let base = self.chunks.extend(chunk_bytes, upstream)?;

        // Push in reverse so blocks are handed out in address order.
        for index in (0..self.blocks_per_chunk).rev() {
            // SAFETY: `index * block_size < chunk_bytes`, so the block lies
            // inside the chunk just obtained.
            unsafe { self.deallocate(base.add(index * self.block_size)) };
        }

        #[cfg(feature = "logging")]
        trace!(
            block_size = self.block_size,
            blocks = self.blocks_per_chunk,
            "pool size class replenished"
        );

        Ok(())
    }
}
