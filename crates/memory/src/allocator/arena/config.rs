//! Arena allocator configuration

/// Initial chunk size used when none (or a smaller one) is configured
pub const DEFAULT_INITIAL_CHUNK_SIZE: usize = 32 * size_of::<usize>();

/// Configuration for [`ArenaAllocator`](super::ArenaAllocator)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArenaOptions {
    /// Size of the first chunk requested from upstream
    ///
    /// Values below [`DEFAULT_INITIAL_CHUNK_SIZE`] are raised to it.
    pub initial_size: usize,
}

impl Default for ArenaOptions {
    fn default() -> Self {
        Self {
            initial_size: DEFAULT_INITIAL_CHUNK_SIZE,
        }
    }
}

impl ArenaOptions {
    /// Options with the given first-chunk size
    #[must_use]
    pub const fn new(initial_size: usize) -> Self {
        Self { initial_size }
    }

    /// Set the first-chunk size
    #[must_use]
    pub const fn with_initial_size(mut self, initial_size: usize) -> Self {
        self.initial_size = initial_size;
        self
    }

    /// First-chunk size after applying the minimum
    #[inline]
    #[must_use]
    pub const fn effective_initial_size(&self) -> usize {
        if self.initial_size < DEFAULT_INITIAL_CHUNK_SIZE {
            DEFAULT_INITIAL_CHUNK_SIZE
        } else {
            self.initial_size
        }
    }

    /// Few large chunks; for arenas expected to grow to megabytes
    #[must_use]
    pub const fn large() -> Self {
        Self::new(64 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_sizes_are_raised_to_the_default() {
        assert_eq!(
            ArenaOptions::new(1).effective_initial_size(),
            DEFAULT_INITIAL_CHUNK_SIZE
        );
        assert_eq!(
            ArenaOptions::new(0).effective_initial_size(),
            DEFAULT_INITIAL_CHUNK_SIZE
        );
        assert_eq!(ArenaOptions::new(4096).effective_initial_size(), 4096);
    }

    #[test]
    fn builder_overrides_default() {
        let options = ArenaOptions::default().with_initial_size(1024);
        assert_eq!(options, ArenaOptions::new(1024));
        assert!(ArenaOptions::large().initial_size > options.initial_size);
    }
}
