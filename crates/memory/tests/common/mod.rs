//! Shared integration-test helpers
#![allow(dead_code)]

use std::ptr::NonNull;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use strata_memory::error::MemoryResult;
use strata_memory::resource::{
    DefaultResourceGuard, MemoryResource, SharedResource, scoped_default_resource,
    system_resource,
};

/// Upstream that records every allocation and deallocation size
///
/// Delegates the actual memory to the system resource.
#[derive(Debug)]
pub struct TrackingResource {
    inner: SharedResource,
    log: Mutex<TrackingLog>,
}

#[derive(Debug, Default)]
struct TrackingLog {
    allocations: Vec<usize>,
    deallocations: Vec<usize>,
    live_bytes: usize,
}

impl TrackingResource {
    pub fn new() -> Self {
        Self {
            inner: system_resource(),
            log: Mutex::new(TrackingLog::default()),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Sizes requested through `allocate`, in call order
    pub fn allocations(&self) -> Vec<usize> {
        self.log.lock().allocations.clone()
    }

    /// Sizes returned through `deallocate`, in call order
    pub fn deallocations(&self) -> Vec<usize> {
        self.log.lock().deallocations.clone()
    }

    pub fn live_bytes(&self) -> usize {
        self.log.lock().live_bytes
    }

    /// Every allocated byte has been handed back
    pub fn all_memory_deallocated(&self) -> bool {
        let log = self.log.lock();
        log.live_bytes == 0 && log.allocations.len() == log.deallocations.len()
    }
}

impl MemoryResource for TrackingResource {
    fn do_allocate(&self, bytes: usize, align: usize) -> MemoryResult<NonNull<u8>> {
        let ptr = self.inner.do_allocate(bytes, align)?;
        let mut log = self.log.lock();
        log.allocations.push(bytes);
        log.live_bytes += bytes;
        Ok(ptr)
    }

    unsafe fn do_deallocate(&self, ptr: NonNull<u8>, bytes: usize, align: usize) {
        {
            let mut log = self.log.lock();
            log.deallocations.push(bytes);
            log.live_bytes -= bytes;
        }
        // SAFETY: forwarded caller contract; memory came from `inner`.
        unsafe { self.inner.do_deallocate(ptr, bytes, align) };
    }
}

static REGISTRY: Mutex<()> = Mutex::new(());

/// Tracking resource installed as the process default for the guard's life
pub struct TrackedDefault {
    pub tracked: Arc<TrackingResource>,
    _default: DefaultResourceGuard,
    _lock: MutexGuard<'static, ()>,
}

/// Routes library diagnostics to the test output; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Serializes with every other test touching the default resource
pub fn use_tracking_default() -> TrackedDefault {
    init_tracing();
    let lock = REGISTRY.lock();
    let tracked = TrackingResource::shared();
    let default = scoped_default_resource(tracked.clone());
    TrackedDefault {
        tracked,
        _default: default,
        _lock: lock,
    }
}

/// Holds the registry lock without changing the default
pub fn registry_lock() -> MutexGuard<'static, ()> {
    REGISTRY.lock()
}
