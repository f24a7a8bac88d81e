//! Point-in-time pool introspection

/// Snapshot of one size class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizeClassStats {
    /// Size of every block in the class
    pub block_size: usize,
    /// Blocks carved from each upstream chunk
    pub blocks_per_chunk: usize,
    /// Upstream chunks currently owned by the class
    pub chunks: usize,
    /// Blocks currently on the free list
    pub free_blocks: usize,
}

impl SizeClassStats {
    /// Blocks handed out and not yet returned
    #[must_use]
    pub fn blocks_in_use(&self) -> usize {
        self.chunks * self.blocks_per_chunk - self.free_blocks
    }
}

/// Snapshot of a whole pool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolStats {
    /// One entry per size class, ascending block size
    pub classes: Vec<SizeClassStats>,
    /// Chunks held for oversized requests
    pub oversized_chunks: usize,
    /// Bytes held from upstream across all chains, headers included
    pub upstream_bytes: usize,
}

impl PoolStats {
    /// Stats for the class serving `block_size`, if any
    #[must_use]
    pub fn class(&self, block_size: usize) -> Option<&SizeClassStats> {
        self.classes.iter().find(|class| class.block_size == block_size)
    }

    /// Upstream chunks across size classes and the oversized chain
    #[must_use]
    pub fn total_chunks(&self) -> usize {
        self.classes.iter().map(|class| class.chunks).sum::<usize>() + self.oversized_chunks
    }

    /// Pooled blocks currently handed out
    #[must_use]
    pub fn blocks_in_use(&self) -> usize {
        self.classes.iter().map(SizeClassStats::blocks_in_use).sum()
    }
}
