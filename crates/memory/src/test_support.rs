//! Helpers shared by the unit tests

use core::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Mutex, MutexGuard};

use crate::error::MemoryResult;
use crate::resource::{MemoryResource, SystemResource};

/// Forwards to the system heap and counts calls and live bytes
#[derive(Debug, Default)]
pub(crate) struct CountingResource {
    allocations: AtomicUsize,
    deallocations: AtomicUsize,
    live_bytes: AtomicUsize,
}

impl CountingResource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn allocations(&self) -> usize {
        self.allocations.load(Ordering::SeqCst)
    }

    pub(crate) fn deallocations(&self) -> usize {
        self.deallocations.load(Ordering::SeqCst)
    }

    pub(crate) fn live_bytes(&self) -> usize {
        self.live_bytes.load(Ordering::SeqCst)
    }
}

impl MemoryResource for CountingResource {
    fn do_allocate(&self, bytes: usize, align: usize) -> MemoryResult<NonNull<u8>> {
        let ptr = SystemResource.do_allocate(bytes, align)?;
        self.allocations.fetch_add(1, Ordering::SeqCst);
        self.live_bytes.fetch_add(bytes, Ordering::SeqCst);
        Ok(ptr)
    }

    unsafe fn do_deallocate(&self, ptr: NonNull<u8>, bytes: usize, align: usize) {
        self.deallocations.fetch_add(1, Ordering::SeqCst);
        self.live_bytes.fetch_sub(bytes, Ordering::SeqCst);
        // SAFETY: forwarded caller contract; every block came from `SystemResource`.
        unsafe { SystemResource.do_deallocate(ptr, bytes, align) }
    }
}

static REGISTRY_LOCK: Mutex<()> = Mutex::new(());

/// Serializes tests that replace the process-wide default resource
pub(crate) fn registry_lock() -> MutexGuard<'static, ()> {
    REGISTRY_LOCK.lock()
}
