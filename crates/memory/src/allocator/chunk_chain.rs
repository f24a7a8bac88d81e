//! Chain of upstream chunks owned by a strategy
//!
//! Every chunk starts with a [`ChunkHeader`] recording the total size that was
//! requested from upstream (header included) and the next chunk in the chain.
//! The usable region starts [`HEADER_SIZE`] bytes after the chunk start, so it
//! is aligned to [`MAX_ALIGN`] like the chunk itself.
//!
//! The chain does not remember its upstream and has no `Drop`: the owning
//! strategy must call [`ChunkChain::release`] with the resource it used for
//! [`ChunkChain::extend`].

use core::ptr::NonNull;

#[cfg(feature = "logging")]
use tracing::trace;

use crate::error::{MemoryError, MemoryResult};
use crate::resource::{MAX_ALIGN, MemoryResource};
use crate::utils::align_up;

/// Bookkeeping stored at the start of each chunk
#[repr(C)]
struct ChunkHeader {
    /// Bytes requested from upstream for this chunk, header included
    size: usize,
    next: Option<NonNull<ChunkHeader>>,
}

/// Bytes reserved in front of the usable region of every chunk
pub const HEADER_SIZE: usize = align_up(size_of::<ChunkHeader>(), MAX_ALIGN);

/// Alignment every chunk is requested with
pub const CHUNK_ALIGN: usize = MAX_ALIGN;

/// Singly linked list of upstream chunks in allocation order
#[derive(Debug, Default)]
pub struct ChunkChain {
    head: Option<NonNull<ChunkHeader>>,
    tail: Option<NonNull<ChunkHeader>>,
    chunks: usize,
    bytes: usize,
}

// SAFETY: the chain exclusively owns the chunks it links; moving it to another
// thread moves that ownership. No shared references into the chunks are kept.
unsafe impl Send for ChunkChain {}

impl ChunkChain {
    /// Creates an empty chain
    #[must_use]
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            chunks: 0,
            bytes: 0,
        }
    }

    /// Obtains a chunk with at least `bytes` usable bytes and appends it
    ///
    /// Returns the start of the usable region, aligned to [`MAX_ALIGN`].
    ///
    /// # Errors
    ///
    /// [`MemoryError::SizeOverflow`] when `bytes` plus the header does not fit
    /// in `usize`; otherwise whatever `upstream` reports.
    pub fn extend<U>(&mut self, bytes: usize, upstream: &U) -> MemoryResult<NonNull<u8>>
    where
        U: ?Sized + MemoryResource,
    {
        let total = bytes
            .checked_add(HEADER_SIZE)
            .ok_or_else(|| MemoryError::size_overflow("chunk header"))?;

        let raw = upstream
            .allocate(total, CHUNK_ALIGN)?
            .ok_or_else(|| MemoryError::allocation_failed(total, CHUNK_ALIGN))?;

        let header = raw.cast::<ChunkHeader>();
        // SAFETY: `raw` points to `total >= HEADER_SIZE` writable bytes aligned
        // to `CHUNK_ALIGN`, which satisfies `ChunkHeader`'s layout.
        unsafe {
            header.write(ChunkHeader {
                size: total,
                next: None,
            });
        }

        match self.tail {
            // SAFETY: `tail` is a live header owned by this chain.
            Some(tail) => unsafe { (*tail.as_ptr()).next = Some(header) },
            None => self.head = Some(header),
        }
        self.tail = Some(header);
        self.chunks += 1;
        self.bytes += total;

        #[cfg(feature = "logging")]
        trace!(
            requested = bytes,
            total,
            chunks = self.chunks,
            "chunk chain extended"
        );

        // SAFETY: `HEADER_SIZE <= total`, so the offset stays inside the chunk.
        Ok(unsafe { raw.add(HEADER_SIZE) })
    }

    /// Returns every chunk to `upstream` and leaves the chain empty
    ///
    /// Calling it on an empty chain does nothing.
    ///
    /// # Safety
    ///
    /// `upstream` must be equal to the resource every chunk was obtained from,
    /// and no pointer into the chunks may be used afterwards.
    pub unsafe fn release<U>(&mut self, upstream: &U)
    where
        U: ?Sized + MemoryResource,
    {
        let mut cursor = self.head.take();
        while let Some(header) = cursor {
            // SAFETY: `header` is a live header written by `extend`; read the
            // fields before the chunk is returned.
            let (size, next) = unsafe {
                let header = header.as_ptr();
                ((*header).size, (*header).next)
            };
            // SAFETY: the chunk was allocated from an equal upstream with
            // exactly `size` bytes and `CHUNK_ALIGN`.
            unsafe { upstream.deallocate(header.cast::<u8>(), size, CHUNK_ALIGN) };
            cursor = next;
        }

        self.tail = None;
        self.chunks = 0;
        self.bytes = 0;
    }

    /// Whether the chain owns no chunk
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Number of chunks currently owned
    #[inline]
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// Bytes currently held from upstream, headers included
    #[inline]
    #[must_use]
    pub fn bytes_owned(&self) -> usize {
        self.bytes
    }
}
