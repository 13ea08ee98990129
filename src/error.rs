//! Error types for the `rhh` crate.

use alloc::collections::TryReserveError;

/// Errors that can occur while configuring or growing a table.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The load factor must leave at least one empty slot and must admit at
    /// least one element, so only `1..=99` is accepted.
    #[error("load factor {0}% is outside of 1..=99")]
    LoadFactor(u8),

    /// No power of two representable in `usize` is large enough for the
    /// requested number of slots.
    #[error("capacity {0} has no representable power of two")]
    CapacityOverflow(usize),

    /// The slot arrays for a table of `capacity` slots could not be
    /// allocated. The table is left unchanged.
    #[error("failed to allocate {capacity} slots")]
    Alloc {
        /// Number of slots requested.
        capacity: usize,
        /// Allocator failure.
        #[source]
        source: TryReserveError,
    },
}
