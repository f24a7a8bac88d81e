//! Allocation strategies layered on an upstream [`MemoryResource`]
//!
//! - [`ArenaAllocator`] - bump pointer with geometric chunk growth, bulk
//!   reclamation only
//! - [`PoolAllocator`] - power-of-two size classes with intrusive free lists
//! - [`ThreadSafePoolAllocator`] - [`PoolAllocator`] behind one mutex
//!
//! All of them keep the chunks they take from upstream in a
//! [`ChunkChain`] and return them together on `release()` or drop.
//!
//! [`MemoryResource`]: crate::resource::MemoryResource

pub mod arena;
pub mod chunk_chain;
pub mod pool;

pub use arena::{ArenaAllocator, ArenaOptions};
pub use chunk_chain::ChunkChain;
pub use pool::{PoolAllocator, PoolOptions, PoolStats, SizeClassStats, ThreadSafePoolAllocator};
