//! Bump-pointer (monotonic) arena
//!
//! Allocation advances a pointer through the current buffer. When the buffer
//! cannot fit a request, a new chunk is taken from upstream; chunk sizes grow
//! geometrically so the number of upstream calls stays logarithmic in the
//! total size. Individual deallocation is a no-op: memory comes back only
//! through [`ArenaAllocator::release`] or when the arena is dropped.
//!
//! An arena can start from a caller-supplied buffer, which is used before any
//! upstream call is made.
//!
//! # Examples
//! ```
//! use strata_memory::allocator::ArenaAllocator;
//! use strata_memory::resource::{MemoryResource, system_resource};
//!
//! let mut arena = ArenaAllocator::with_upstream(system_resource());
//! let ptr = arena.allocate(128, 8)?.expect("non-zero request");
//! assert_eq!(ptr.as_ptr() as usize % 8, 0);
//!
//! arena.release();
//! assert_eq!(arena.chunk_count(), 0);
//! # Ok::<(), strata_memory::error::MemoryError>(())
//! ```

mod config;

pub use config::{ArenaOptions, DEFAULT_INITIAL_CHUNK_SIZE};

use core::cell::RefCell;
use core::fmt;
use core::marker::PhantomData;
use core::ptr::NonNull;

#[cfg(feature = "logging")]
use tracing::debug;

use super::chunk_chain::ChunkChain;
use crate::error::{MemoryError, MemoryResult};
use crate::resource::{MemoryResource, SharedResource, Upstream, get_default_resource};
use crate::utils::checked_align_up;

/// Mutable part of the arena
struct ArenaState {
    current: Option<NonNull<u8>>,
    remaining: usize,
    next_chunk_size: usize,
    chunks: ChunkChain,
}

impl ArenaState {
    /// Carves `bytes` aligned to `align` out of the current buffer
    fn bump(&mut self, bytes: usize, align: usize) -> Option<NonNull<u8>> {
        let current = self.current?;
        let addr = current.as_ptr().addr();
        let padding = checked_align_up(addr, align)? - addr;
        let needed = padding.checked_add(bytes)?;
        if needed > self.remaining {
            return None;
        }

        // SAFETY: `padding + bytes <= remaining`, so both offsets stay inside
        // the current buffer (or one past its end).
        let (ptr, next) = unsafe {
            let ptr = current.add(padding);
            (ptr, ptr.add(bytes))
        };
        self.current = Some(next);
        self.remaining -= needed;
        Some(ptr)
    }
}

/// Monotonic allocator over chunks obtained from upstream
///
/// Not `Sync`: share it across threads only behind external synchronization.
pub struct ArenaAllocator<'buf, R = SharedResource>
where
    R: Upstream,
{
    upstream: R,
    state: RefCell<ArenaState>,
    initial_buffer: Option<NonNull<u8>>,
    initial_buffer_len: usize,
    initial_next_size: usize,
    _buffer: PhantomData<&'buf mut [u8]>,
}

// SAFETY: the arena exclusively owns its chunks and holds the only borrow of
// the initial buffer; with a `Send` upstream the whole state can move.
unsafe impl<R> Send for ArenaAllocator<'_, R> where R: Upstream + Send {}

impl ArenaAllocator<'static> {
    /// Arena over the current default resource
    #[must_use]
    pub fn new() -> Self {
        Self::with_upstream(get_default_resource())
    }
}

impl Default for ArenaAllocator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> ArenaAllocator<'static, R>
where
    R: Upstream,
{
    /// Arena over `upstream` with the default initial chunk size
    pub fn with_upstream(upstream: R) -> Self {
        Self::with_options(ArenaOptions::default(), upstream)
    }

    /// Arena over `upstream` with explicit options
    pub fn with_options(options: ArenaOptions, upstream: R) -> Self {
        Self::from_parts(upstream, None, options.effective_initial_size())
    }
}

impl<'buf, R> ArenaAllocator<'buf, R>
where
    R: Upstream,
{
    /// Arena that serves requests from `buffer` before asking `upstream`
    ///
    /// The first upstream chunk is at least twice the buffer size.
    pub fn with_buffer(buffer: &'buf mut [u8], upstream: R) -> Self {
        let initial_next_size = ArenaOptions::default()
            .effective_initial_size()
            .max(buffer.len().saturating_mul(2));
        let len = buffer.len();
        let ptr = NonNull::new(buffer.as_mut_ptr()).filter(|_| len > 0);
        Self::from_parts(upstream, ptr.map(|ptr| (ptr, len)), initial_next_size)
    }

    fn from_parts(
        upstream: R,
        buffer: Option<(NonNull<u8>, usize)>,
        initial_next_size: usize,
    ) -> Self {
        let (initial_buffer, initial_buffer_len) = match buffer {
            Some((ptr, len)) => (Some(ptr), len),
            None => (None, 0),
        };
        Self {
            upstream,
            state: RefCell::new(ArenaState {
                current: initial_buffer,
                remaining: initial_buffer_len,
                next_chunk_size: initial_next_size,
                chunks: ChunkChain::new(),
            }),
            initial_buffer,
            initial_buffer_len,
            initial_next_size,
            _buffer: PhantomData,
        }
    }

    /// Resource chunks are requested from
    #[inline]
    pub fn upstream_resource(&self) -> &R {
        &self.upstream
    }

    /// Returns every chunk to upstream
    ///
    /// Afterwards the arena behaves exactly like a freshly constructed one:
    /// the initial buffer (if any) is reused from its start and the growth
    /// sequence restarts. Every pointer handed out before becomes invalid.
    pub fn release(&mut self) {
        let state = self.state.get_mut();

        #[cfg(feature = "logging")]
        if !state.chunks.is_empty() {
            debug!(
                chunks = state.chunks.chunk_count(),
                bytes = state.chunks.bytes_owned(),
                "arena released"
            );
        }

        // SAFETY: every chunk came from `self.upstream`, and `&mut self`
        // guarantees no allocation is in flight.
        unsafe { state.chunks.release(&*self.upstream) };
        state.current = self.initial_buffer;
        state.remaining = self.initial_buffer_len;
        state.next_chunk_size = self.initial_next_size;
    }

    /// Chunks currently held from upstream
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.state.borrow().chunks.chunk_count()
    }

    /// Bytes currently held from upstream, chunk headers included
    #[must_use]
    pub fn upstream_bytes(&self) -> usize {
        self.state.borrow().chunks.bytes_owned()
    }

    /// Bytes left in the current buffer before the next upstream call
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.state.borrow().remaining
    }

    /// Usable size the next upstream chunk will have at minimum
    #[must_use]
    pub fn next_chunk_size(&self) -> usize {
        self.state.borrow().next_chunk_size
    }

    fn grow(&self, state: &mut ArenaState, bytes: usize, align: usize) -> MemoryResult<()> {
        let required = bytes
            .checked_add(align)
            .ok_or_else(|| MemoryError::size_overflow("arena chunk size"))?;
        let chunk_size = state.next_chunk_size.max(required);
        let chunk = state.chunks.extend(chunk_size, &*self.upstream)?;

        state.current = Some(chunk);
        state.remaining = chunk_size;
        state.next_chunk_size = chunk_size.saturating_mul(2);

        #[cfg(feature = "logging")]
        debug!(
            chunk_size,
            next_chunk_size = state.next_chunk_size,
            "arena grew"
        );

        Ok(())
    }
}

impl<R> MemoryResource for ArenaAllocator<'_, R>
where
    R: Upstream,
{
    fn do_allocate(&self, bytes: usize, align: usize) -> MemoryResult<NonNull<u8>> {
        let mut state = self.state.borrow_mut();
        if let Some(ptr) = state.bump(bytes, align) {
            return Ok(ptr);
        }

        self.grow(&mut state, bytes, align)?;
        state
            .bump(bytes, align)
            .ok_or_else(|| MemoryError::out_of_memory(bytes, align))
    }

    unsafe fn do_deallocate(&self, _ptr: NonNull<u8>, _bytes: usize, _align: usize) {}
}

impl<R> Drop for ArenaAllocator<'_, R>
where
    R: Upstream,
{
    fn drop(&mut self) {
        self.release();
    }
}

impl<R> fmt::Debug for ArenaAllocator<'_, R>
where
    R: Upstream,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ArenaAllocator")
            .field("chunks", &state.chunks.chunk_count())
            .field("upstream_bytes", &state.chunks.bytes_owned())
            .field("remaining", &state.remaining)
            .field("next_chunk_size", &state.next_chunk_size)
            .finish_non_exhaustive()
    }
}
