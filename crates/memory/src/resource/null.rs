//! Resource that never allocates
//!
//! Useful as the upstream of a strategy that must stay inside a caller
//! supplied buffer: any attempt to grow fails loudly instead of silently
//! reaching for the heap.

use core::ptr::NonNull;
use std::sync::{Arc, LazyLock};

use super::{MemoryResource, SharedResource};
use crate::error::{MemoryError, MemoryResult};

/// Resource whose every non-zero allocation fails
///
/// Equality is identity: use [`null_resource`] for a handle that compares
/// equal across call sites.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullResource;

impl NullResource {
    /// Creates a null resource
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl MemoryResource for NullResource {
    fn do_allocate(&self, bytes: usize, align: usize) -> MemoryResult<NonNull<u8>> {
        Err(MemoryError::allocation_failed(bytes, align))
    }

    unsafe fn do_deallocate(&self, _ptr: NonNull<u8>, _bytes: usize, _align: usize) {}
}

static NULL: LazyLock<SharedResource> = LazyLock::new(|| Arc::new(NullResource));

/// The process-wide null resource; always the same instance
#[must_use]
pub fn null_resource() -> SharedResource {
    Arc::clone(&NULL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::resources_equal;

    #[test]
    fn every_allocation_fails() {
        let resource = null_resource();
        let error = resource.allocate(1, 1).unwrap_err();
        assert_eq!(error, MemoryError::AllocationFailed { size: 1, align: 1 });
        assert!(resource.allocate(4096, 16).is_err());
    }

    #[test]
    fn zero_bytes_still_succeed() {
        assert_eq!(NullResource.allocate(0, 8).unwrap(), None);
    }

    #[test]
    fn equal_to_itself_only() {
        let local = NullResource::new();
        assert!(resources_equal(&local, &local));
        assert!(resources_equal(&*null_resource(), &*null_resource()));
        assert!(!resources_equal(&local, &*null_resource()));
        assert!(!resources_equal(&local, &*crate::resource::system_resource()));
    }
}
