//! Resource backed by the global heap
//!
//! Every allocation goes straight to [`std::alloc`]. All instances are
//! interchangeable: memory allocated through one `SystemResource` may be
//! returned through any other.

use core::any::Any;
use core::ptr::{self, NonNull};
use std::alloc::{self, Layout};
use std::sync::{Arc, LazyLock};

#[cfg(feature = "logging")]
use tracing::trace;

use super::{MemoryResource, SharedResource};
use crate::error::{MemoryError, MemoryResult};

/// Allocator that forwards to the global heap
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SystemResource;

impl SystemResource {
    /// Creates a handle to the global heap
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl MemoryResource for SystemResource {
    fn do_allocate(&self, bytes: usize, align: usize) -> MemoryResult<NonNull<u8>> {
        if bytes == 0 {
            // Reachable only through a direct `do_allocate` call.
            let dangling = ptr::without_provenance_mut(align);
            return Ok(NonNull::new(dangling).unwrap_or(NonNull::dangling()));
        }

        let layout = Layout::from_size_align(bytes, align)
            .map_err(|_| MemoryError::size_overflow("system layout"))?;

        // SAFETY: layout has a non-zero size, checked above.
        let raw = unsafe { alloc::alloc(layout) };

        #[cfg(feature = "logging")]
        trace!(bytes, align, ptr = ?raw, "system allocate");

        NonNull::new(raw).ok_or_else(|| MemoryError::allocation_failed_with_layout(layout))
    }

    unsafe fn do_deallocate(&self, ptr: NonNull<u8>, bytes: usize, align: usize) {
        if bytes == 0 {
            return;
        }

        #[cfg(feature = "logging")]
        trace!(bytes, align, ptr = ?ptr, "system deallocate");

        // SAFETY: caller guarantees `ptr` came from `do_allocate` with the
        // same `bytes`/`align`, so the layout is the one used to allocate.
        unsafe {
            let layout = Layout::from_size_align_unchecked(bytes, align);
            alloc::dealloc(ptr.as_ptr(), layout);
        }
    }

    fn do_is_equal(&self, other: &dyn MemoryResource) -> bool {
        other
            .as_any()
            .is_some_and(|any| any.downcast_ref::<Self>().is_some())
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

static SYSTEM: LazyLock<SharedResource> = LazyLock::new(|| Arc::new(SystemResource));

/// The process-wide system resource; always the same instance
#[must_use]
pub fn system_resource() -> SharedResource {
    Arc::clone(&SYSTEM)
}
