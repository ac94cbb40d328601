//! Error types for bounded-buffer operations.

use std::collections::TryReserveError;
use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("buffer capacity must be at least 1")]
    ZeroCapacity,

    #[error("failed to allocate {capacity} buffer slots: {source}")]
    Allocation {
        capacity: usize,
        #[source]
        source: TryReserveError,
    },
}

/// Returned by [`BoundedBuffer::put`](crate::BoundedBuffer::put) when the
/// buffer has been closed. Carries the rejected item back to the caller.
#[derive(PartialEq, Eq)]
pub struct Closed<T>(pub T);

impl<T> Closed<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Closed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Closed(..)")
    }
}

impl<T> fmt::Display for Closed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("put on a closed buffer")
    }
}

impl<T> std::error::Error for Closed<T> {}
