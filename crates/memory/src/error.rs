//! Standalone error types for strata-memory
//!
//! Uses thiserror for clean, idiomatic Rust error definitions. Every failure a
//! resource can report is an out-of-memory condition: either the upstream
//! could not hand out the bytes, or computing how many bytes to ask for
//! overflowed `usize`. Precondition violations (bad alignment, mismatched
//! deallocate arguments) are programmer errors and are only `debug_assert!`ed.

use core::alloc::Layout;
use thiserror::Error;

#[cfg(feature = "logging")]
use tracing::{error, warn};

// ============================================================================
// Main Error Type
// ============================================================================

/// Memory resource errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    /// The upstream resource (or the system heap) refused the request.
    #[error("Memory allocation failed: {size} bytes with {align} byte alignment")]
    AllocationFailed { size: usize, align: usize },

    /// A chunk or block size computation does not fit in `usize`.
    #[error("Size overflow during operation: {operation}")]
    SizeOverflow { operation: &'static str },
}

impl MemoryError {
    /// Both variants mean the request cannot be satisfied.
    #[must_use]
    pub fn is_out_of_memory(&self) -> bool {
        matches!(
            self,
            Self::AllocationFailed { .. } | Self::SizeOverflow { .. }
        )
    }

    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AllocationFailed { .. } => "MEM:ALLOC:FAILED",
            Self::SizeOverflow { .. } => "MEM:ALLOC:OVERFLOW",
        }
    }

    // ------------------------------------------------------------------------
    // Convenience constructors
    // ------------------------------------------------------------------------

    /// Create allocation failed error
    pub fn allocation_failed(size: usize, align: usize) -> Self {
        #[cfg(feature = "logging")]
        error!(size, align, "memory allocation failed");

        Self::AllocationFailed { size, align }
    }

    /// Create allocation failed error from layout
    pub fn allocation_failed_with_layout(layout: Layout) -> Self {
        Self::allocation_failed(layout.size(), layout.align())
    }

    /// Create size overflow error
    pub fn size_overflow(operation: &'static str) -> Self {
        #[cfg(feature = "logging")]
        warn!(operation, "size computation overflowed");

        Self::SizeOverflow { operation }
    }

    /// Alias of [`MemoryError::allocation_failed`]
    pub fn out_of_memory(size: usize, align: usize) -> Self {
        Self::allocation_failed(size, align)
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result type for memory operations
pub type MemoryResult<T> = core::result::Result<T, MemoryError>;

/// Generic result type alias
pub type Result<T> = MemoryResult<T>;
