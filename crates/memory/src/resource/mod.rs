//! The allocation-capability contract
//!
//! A [`MemoryResource`] hands out raw, untyped, aligned memory and takes it
//! back. Strategies ([`ArenaAllocator`](crate::allocator::ArenaAllocator),
//! [`PoolAllocator`](crate::allocator::PoolAllocator), ...) implement it and
//! consume it: each one is configured with an *upstream* resource it falls
//! back to once its local capacity runs out.
//!
//! Implementors provide [`do_allocate`](MemoryResource::do_allocate) and
//! [`do_deallocate`](MemoryResource::do_deallocate), and may override
//! [`do_is_equal`](MemoryResource::do_is_equal). Callers go through
//! [`allocate`](MemoryResource::allocate) /
//! [`deallocate`](MemoryResource::deallocate) /
//! [`is_equal`](MemoryResource::is_equal), which add the zero-size shortcut
//! and debug-build precondition checks.
//!
//! # Safety
//!
//! Returned memory is uninitialized. `deallocate` must receive the exact
//! pointer, size and alignment of a previous `allocate` on an equal resource;
//! anything else is undefined behavior and is not checked in release builds.

use core::any::Any;
use core::fmt;
use core::ops::Deref;
use core::ptr::{self, NonNull};
use std::sync::Arc;

use crate::error::MemoryResult;
use crate::utils::is_supported_alignment;

mod null;
mod registry;
mod system;

pub use null::{NullResource, null_resource};
pub use registry::{
    DefaultResourceGuard, get_default_resource, scoped_default_resource, set_default_resource,
};
pub use system::{SystemResource, system_resource};

/// Largest alignment every resource must honour (that of `max_align_t`)
pub const MAX_ALIGN: usize = 16;

/// Shared, thread-safe handle to a resource; the default upstream type
pub type SharedResource = Arc<dyn MemoryResource + Send + Sync>;

/// Capability object through which raw memory is requested and released
pub trait MemoryResource {
    /// Strategy-specific allocation
    ///
    /// Called by [`allocate`](Self::allocate) only with `bytes > 0` and a
    /// power-of-two `align <= MAX_ALIGN`.
    fn do_allocate(&self, bytes: usize, align: usize) -> MemoryResult<NonNull<u8>>;

    /// Strategy-specific deallocation (may be a no-op)
    ///
    /// # Safety
    ///
    /// `ptr`, `bytes` and `align` must come from an earlier successful
    /// allocation on a resource equal to this one, and `ptr` must not have
    /// been deallocated since.
    unsafe fn do_deallocate(&self, ptr: NonNull<u8>, bytes: usize, align: usize);

    /// Strategy-specific equality; identity unless overridden
    fn do_is_equal(&self, other: &dyn MemoryResource) -> bool {
        ptr::from_ref(self).cast::<u8>() == ptr::from_ref(other).cast::<u8>()
    }

    /// Concrete-type access for value-based [`do_is_equal`](Self::do_is_equal)
    /// overrides. Resources without value semantics keep the default.
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }

    /// Allocates at least `bytes` bytes aligned to `align`
    ///
    /// Returns `Ok(None)` for `bytes == 0` without calling
    /// [`do_allocate`](Self::do_allocate).
    #[inline]
    fn allocate(&self, bytes: usize, align: usize) -> MemoryResult<Option<NonNull<u8>>> {
        debug_assert!(
            is_supported_alignment(align),
            "alignment {align} is not a power of two up to {MAX_ALIGN}"
        );

        if bytes == 0 {
            return Ok(None);
        }
        self.do_allocate(bytes, align).map(Some)
    }

    /// Returns memory obtained from [`allocate`](Self::allocate)
    ///
    /// # Safety
    ///
    /// Same contract as [`do_deallocate`](Self::do_deallocate).
    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, bytes: usize, align: usize) {
        // SAFETY: forwarded caller contract.
        unsafe { self.do_deallocate(ptr, bytes, align) }
    }

    /// Whether memory allocated from `self` can be deallocated through `other`
    #[inline]
    fn is_equal(&self, other: &dyn MemoryResource) -> bool {
        self.do_is_equal(other)
    }
}

/// Any handle that dereferences to a [`MemoryResource`] can serve as upstream
///
/// Covers [`SharedResource`], `Arc<T>`, `Box<T>` and plain `&T`, so a
/// single-threaded arena can feed a pool without reference counting.
pub trait Upstream: Deref<Target: MemoryResource> {}

impl<T> Upstream for T where T: Deref<Target: MemoryResource> {}

/// Same instance, or equal according to `lhs`
pub fn resources_equal(lhs: &dyn MemoryResource, rhs: &dyn MemoryResource) -> bool {
    ptr::from_ref(lhs).cast::<u8>() == ptr::from_ref(rhs).cast::<u8>() || lhs.is_equal(rhs)
}

impl PartialEq for dyn MemoryResource {
    fn eq(&self, other: &Self) -> bool {
        resources_equal(self, other)
    }
}

impl PartialEq for dyn MemoryResource + Send + Sync {
    fn eq(&self, other: &Self) -> bool {
        resources_equal(self, other)
    }
}

impl fmt::Debug for dyn MemoryResource + Send + Sync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MemoryResource")
            .field(&ptr::from_ref(self).cast::<u8>())
            .finish()
    }
}
