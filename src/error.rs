use core::alloc::Layout;

/// Errors reported by the fallible (`try_*`) table operations.
///
/// A lookup or removal miss is not an error; those operations return `None`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A new key could not be placed because the table is configured with
    /// [`Growth::Fixed`](crate::config::Growth::Fixed) and has reached its load
    /// limit. The table is unchanged; the caller must shed the insert.
    #[error("table is at its fixed load limit ({capacity} slots)")]
    CapacityExhausted {
        /// Slot count of the exhausted table.
        capacity: usize,
    },

    /// The requested capacity does not fit in the address space.
    #[error("requested table capacity overflows usize")]
    CapacityOverflow,

    /// The allocator could not provide memory for a new slot array. The table
    /// keeps its previous slot array and contents.
    #[error("failed to allocate {} bytes for the slot array", .layout.size())]
    AllocationFailure {
        /// Layout of the failed allocation.
        layout: Layout,
    },

    /// A [`TableConfig`](crate::config::TableConfig) value is outside its
    /// accepted range.
    #[error("invalid table configuration: {reason}")]
    InvalidConfig {
        /// Which setting was rejected.
        reason: &'static str,
    },

    /// The same key appeared twice in the input of a static table.
    #[error("duplicate key in static table input")]
    DuplicateKey,

    /// No collision-free placement was found for the static key set.
    #[error("no collision-free placement found for {keys} keys")]
    PerfectHashFailed {
        /// Size of the key set.
        keys: usize,
    },
}

/// Unwraps the result of a fallible operation for the infallible API.
///
/// Allocation failures are routed to the global allocation error handler,
/// everything else panics with the error's message.
#[inline]
#[track_caller]
pub(crate) fn infallible<R>(result: Result<R, Error>) -> R {
    match result {
        Ok(value) => value,
        Err(Error::AllocationFailure { layout }) => alloc::alloc::handle_alloc_error(layout),
        Err(err) => panic!("{err}"),
    }
}
