//! # strata-memory
//!
//! Pluggable memory resources: a capability object through which callers
//! request and release raw, aligned memory, plus strategies layered on it.
//!
//! - [`resource::MemoryResource`] - the allocate / deallocate / is-equal
//!   contract, with the [`resource::SystemResource`] and
//!   [`resource::NullResource`] built-ins
//! - a process-wide default resource ([`resource::get_default_resource`],
//!   [`resource::set_default_resource`])
//! - [`allocator::ArenaAllocator`] - monotonic bump allocation
//! - [`allocator::PoolAllocator`] and [`allocator::ThreadSafePoolAllocator`] -
//!   segregated size-class pools
//!
//! ## Quick Start
//!
//! ```rust
//! use strata_memory::prelude::*;
//!
//! // Pool on top of an arena: pool chunks come from the arena's buffers.
//! let arena = ArenaAllocator::with_upstream(system_resource());
//! let pool = PoolAllocator::with_upstream(&arena);
//!
//! let ptr = pool.allocate(48, 8)?.expect("non-zero request");
//! // SAFETY: same size and alignment as the allocation.
//! unsafe { pool.deallocate(ptr, 48, 8) };
//! # Ok::<(), MemoryError>(())
//! ```
//!
//! ## Features
//!
//! - `logging` (default): `tracing` events for chunk growth, release and
//!   failures
//! - `serde`: `Serialize`/`Deserialize` for the option and stats types

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(clippy::all)]
#![warn(clippy::perf)]
#![warn(clippy::pedantic)]
#![warn(rust_2018_idioms)]
#![allow(unsafe_code)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
// Cast truncation in size-class arithmetic is reviewed per-site
#![allow(clippy::cast_possible_truncation)]
// Free blocks and chunk headers are written into MAX_ALIGN-aligned memory
#![allow(clippy::cast_ptr_alignment)]
#![allow(clippy::double_must_use)]
#![allow(clippy::return_self_not_must_use)]

// Error types
pub mod error;

pub mod allocator;
pub mod resource;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::error::{MemoryError, MemoryResult, Result};

// Public API exports
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::allocator::{
        ArenaAllocator, ArenaOptions, PoolAllocator, PoolOptions, PoolStats,
        ThreadSafePoolAllocator,
    };
    pub use crate::error::{MemoryError, MemoryResult};
    pub use crate::resource::{
        MAX_ALIGN, MemoryResource, NullResource, SharedResource, SystemResource, Upstream,
        get_default_resource, null_resource, resources_equal, set_default_resource,
        system_resource,
    };
}
