//! Runtime decode configuration.

/// Default cap on speculative allocation while decoding: 4 MiB.
pub const DEFAULT_PREALLOCATION_LIMIT: usize = 4 << 20;

/// Limits applied while decoding untrusted input.
///
/// Length prefixes are validated against the remaining input whenever the
/// backend knows its size. Over streams of unknown length the prefix cannot
/// be checked up front, so allocation is capped at `max_preallocation` bytes
/// and grows only as data actually arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    pub max_preallocation: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_preallocation: DEFAULT_PREALLOCATION_LIMIT,
        }
    }
}

impl DecodeLimits {
    /// Number of `T` slots to reserve up front for a sequence of `len` items.
    #[inline]
    pub fn capacity_for<T>(&self, len: usize) -> usize {
        match size_of::<T>() {
            0 => len,
            size => len.min(self.max_preallocation / size),
        }
    }
}
