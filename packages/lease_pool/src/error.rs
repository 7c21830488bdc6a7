use std::collections::TryReserveError;
use std::convert::Infallible;

use thiserror::Error;

/// Errors that can occur when resizing a [`LeasePool`][crate::LeasePool] or acquiring a lease
/// from it.
///
/// The type parameter `E` is the error type of a caller-supplied fallible factory, as used by
/// [`try_acquire_with()`][1] and [`try_resize_with()`][2]. Operations that cannot fail during
/// construction use the default of [`Infallible`].
///
/// Whenever an error is returned, the pool has already been restored to a consistent state:
/// the set of free slots is exactly what it was before the failed call.
///
/// [1]: crate::LeasePool::try_acquire_with
/// [2]: crate::LeasePool::try_resize_with
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error<E = Infallible> {
    /// Every slot of the pool is currently leased out.
    ///
    /// The caller may retry after a lease has been released or after resizing the pool.
    #[error("lease pool is exhausted: all {size} slots are leased out")]
    Exhausted {
        /// The number of slots in the pool at the time of the call.
        size: usize,
    },

    /// The caller-supplied factory failed to construct a value for a slot.
    #[error("failed to construct a value for a pool slot")]
    ConstructionFailed(#[source] E),

    /// Storage for the requested number of slots could not be allocated.
    #[error("failed to allocate storage for {requested} pool slots")]
    AllocationFailed {
        /// The slot count that was requested.
        requested: usize,

        /// The underlying allocation failure.
        #[source]
        source: TryReserveError,
    },
}

impl<E> Error<E> {
    /// Whether this error signals that the pool had no free slot.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

/// A specialized `Result` type for lease pool operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T, E = Infallible> = std::result::Result<T, Error<E>>;
