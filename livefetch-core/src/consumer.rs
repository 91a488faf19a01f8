// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{Demand, Snapshot};
use livefetch_error::LiveQueryError;

/// The capability a subscriber implements to receive live query results.
///
/// Methods take `&self`: a consumer may call back into its own subscription
/// (request more, or cancel) while a delivery is in progress, so any state it
/// keeps needs interior mutability.
pub trait Consumer<T> {
    /// Receive a snapshot and return the demand to continue with.
    ///
    /// Under finite demand the returned value replaces the outstanding demand;
    /// returning [`Demand::None`] pauses delivery until more is requested.
    fn receive(&self, snapshot: Snapshot<T>) -> Demand;

    /// Receive the terminal failure. Nothing is delivered afterwards.
    fn receive_failure(&self, error: LiveQueryError);
}

/// A [`Consumer`] assembled from two closures. See [`consumer_fn`].
pub struct FnConsumer<S, F> {
    on_snapshot: S,
    on_failure: F,
}

/// Build a consumer from a snapshot callback and a failure callback.
///
/// # Example
///
/// ```
/// use livefetch_core::{consumer_fn, Consumer, Demand, Snapshot};
/// use std::cell::Cell;
///
/// let seen = Cell::new(0);
/// let consumer = consumer_fn(
///     |snapshot: Snapshot<u32>| {
///         seen.set(seen.get() + snapshot.len());
///         Demand::Unlimited
///     },
///     |_error| {},
/// );
///
/// assert_eq!(consumer.receive(Snapshot::from(vec![1, 2])), Demand::Unlimited);
/// assert_eq!(seen.get(), 2);
/// ```
pub const fn consumer_fn<T, S, F>(on_snapshot: S, on_failure: F) -> FnConsumer<S, F>
where
    S: Fn(Snapshot<T>) -> Demand,
    F: Fn(LiveQueryError),
{
    FnConsumer {
        on_snapshot,
        on_failure,
    }
}

impl<T, S, F> Consumer<T> for FnConsumer<S, F>
where
    S: Fn(Snapshot<T>) -> Demand,
    F: Fn(LiveQueryError),
{
    fn receive(&self, snapshot: Snapshot<T>) -> Demand {
        (self.on_snapshot)(snapshot)
    }

    fn receive_failure(&self, error: LiveQueryError) {
        (self.on_failure)(error);
    }
}
