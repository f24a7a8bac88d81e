//! Pool allocator behind a single lock

use core::fmt;
use core::ptr::NonNull;

use parking_lot::Mutex;

use super::allocator::PoolAllocator;
use super::config::PoolOptions;
use super::stats::PoolStats;
use crate::error::MemoryResult;
use crate::resource::{MemoryResource, SharedResource, Upstream, get_default_resource};

/// [`PoolAllocator`] whose every operation runs under one mutex
///
/// The whole instance serializes on that lock, so throughput is bounded by
/// contention. With a `Send` upstream the allocator is `Send + Sync` and can
/// itself be installed as a shared upstream or default resource.
pub struct ThreadSafePoolAllocator<R = SharedResource>
where
    R: Upstream,
{
    inner: Mutex<PoolAllocator<R>>,
}

impl ThreadSafePoolAllocator {
    /// Pool over the current default resource with default options
    #[must_use]
    pub fn new() -> Self {
        Self::with_upstream(get_default_resource())
    }
}

impl Default for ThreadSafePoolAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> ThreadSafePoolAllocator<R>
where
    R: Upstream,
{
    /// Pool over `upstream` with default options
    pub fn with_upstream(upstream: R) -> Self {
        Self::with_options(PoolOptions::default(), upstream)
    }

    /// Pool over `upstream`; `options` are normalized, never rejected
    pub fn with_options(options: PoolOptions, upstream: R) -> Self {
        Self {
            inner: Mutex::new(PoolAllocator::with_options(options, upstream)),
        }
    }

    /// Handle to the resource chunks are requested from
    pub fn upstream_resource(&self) -> R
    where
        R: Clone,
    {
        self.inner.lock().upstream_resource().clone()
    }

    /// Effective options after normalization
    #[must_use]
    pub fn options(&self) -> PoolOptions {
        self.inner.lock().options()
    }

    /// Block size of the class serving `bytes` at `align`
    #[must_use]
    pub fn select_pool(&self, bytes: usize, align: usize) -> Option<usize> {
        self.inner.lock().select_pool(bytes, align)
    }

    /// Returns every chunk to upstream; see [`PoolAllocator::release`]
    ///
    /// Callers must make sure no other thread still uses memory from this
    /// pool.
    pub fn release(&self) {
        self.inner.lock().release();
    }

    /// Snapshot taken under the lock
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.inner.lock().stats()
    }

    /// Unwraps the unsynchronized pool
    pub fn into_inner(self) -> PoolAllocator<R> {
        self.inner.into_inner()
    }
}

impl<R> MemoryResource for ThreadSafePoolAllocator<R>
where
    R: Upstream,
{
    fn do_allocate(&self, bytes: usize, align: usize) -> MemoryResult<NonNull<u8>> {
        self.inner.lock().do_allocate(bytes, align)
    }

    unsafe fn do_deallocate(&self, ptr: NonNull<u8>, bytes: usize, align: usize) {
        // SAFETY: forwarded caller contract.
        unsafe { self.inner.lock().do_deallocate(ptr, bytes, align) }
    }
}

impl<R> fmt::Debug for ThreadSafePoolAllocator<R>
where
    R: Upstream,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadSafePoolAllocator")
            .field("inner", &*self.inner.lock())
            .finish()
    }
}
