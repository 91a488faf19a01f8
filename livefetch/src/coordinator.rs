// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The single authority over one shared query.
//!
//! A [`Coordinator`] answers three questions for every subscription of a
//! publisher: has the query run, is it running, and what was the result. It
//! owns the engine, the [`FetchStatus`] machine and a weak table of the
//! subscriptions currently interested in results.
//!
//! ## Fan-out
//!
//! The table maps a [`SubscriptionId`] to a weak handle. The coordinator never
//! keeps a subscription alive; entries whose subscription has been dropped are
//! pruned on the next call that touches the table.
//!
//! ## Fetch deduplication
//!
//! [`perform_fetch_if_needed`](Coordinator::perform_fetch_if_needed) serves a
//! cached snapshot to a late requestor, does nothing while a fetch is in flight,
//! and only starts a fetch from `NotFetched`. At most one fetch is ever in
//! flight.

use crate::subscription::SubscriptionId;
use livefetch_core::{
    ExecutionContext, FetchOutcome, FetchStatus, LiveQueryEngine, LiveQueryError, Snapshot,
};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Receiver side of a broadcast. Implemented by subscriptions.
pub(crate) trait Observer<T> {
    fn on_update(&self, snapshot: Snapshot<T>);

    fn on_error(&self, error: LiveQueryError);
}

struct ObserverEntry<T> {
    id: SubscriptionId,
    observer: Weak<dyn Observer<T>>,
}

/// Owner of one live query engine and of the list of subscriptions fed by it.
pub struct Coordinator<E: LiveQueryEngine> {
    engine: RefCell<E>,
    status: Cell<FetchStatus>,
    observers: RefCell<Vec<ObserverEntry<E::Item>>>,
    next_id: Cell<u64>,
    context: ExecutionContext,
    query_name: String,
}

impl<E: LiveQueryEngine> Coordinator<E> {
    /// Take ownership of `engine` and install the live-update callback on it.
    pub(crate) fn new(mut engine: E, context: ExecutionContext, query_name: String) -> Rc<Self> {
        Rc::new_cyclic(|coordinator: &Weak<Self>| {
            let coordinator = coordinator.clone();
            engine.set_change_handler(Box::new(move |snapshot: Option<Snapshot<E::Item>>| {
                if let Some(coordinator) = coordinator.upgrade() {
                    coordinator.handle_change(snapshot);
                }
            }));
            Self {
                engine: RefCell::new(engine),
                status: Cell::new(FetchStatus::NotFetched),
                observers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                context,
                query_name,
            }
        })
    }

    pub(crate) fn next_subscription_id(&self) -> SubscriptionId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        SubscriptionId::new(id)
    }

    /// Register `observer` under `id`. Registering an id twice is a no-op.
    pub(crate) fn begin_observing(&self, id: SubscriptionId, observer: Weak<dyn Observer<E::Item>>) {
        self.context.assert_current("Coordinator::begin_observing");
        let mut observers = self.observers.borrow_mut();
        self.prune_expired(&mut observers);
        if observers.iter().any(|entry| entry.id == id) {
            return;
        }
        observers.push(ObserverEntry { id, observer });
        trace!(context = %self.context, subscription = %id, active = observers.len(), "begin observing");
    }

    /// Remove `id` from the active set. Safe to call for an id that is not registered.
    pub(crate) fn end_observing(&self, id: SubscriptionId) {
        self.context.assert_current("Coordinator::end_observing");
        let mut observers = self.observers.borrow_mut();
        observers.retain(|entry| entry.id != id);
        self.prune_expired(&mut observers);
        trace!(context = %self.context, subscription = %id, active = observers.len(), "end observing");
    }

    /// Serve `requestor` from the cache, wait for the in-flight fetch, or start one.
    pub(crate) fn perform_fetch_if_needed(&self, requestor: &dyn Observer<E::Item>) {
        self.context.assert_current("Coordinator::perform_fetch_if_needed");
        match self.status.get() {
            FetchStatus::Fetched => {
                let cached = self.engine.borrow().current_snapshot();
                match cached {
                    Some(snapshot) => requestor.on_update(snapshot),
                    None => {
                        warn!(context = %self.context, query = %self.query_name, "fetched status without a cached snapshot, fetching again");
                        self.perform_fetch_immediately();
                    }
                }
            }
            FetchStatus::InProgress => {}
            FetchStatus::NotFetched => self.perform_fetch_immediately(),
        }
    }

    /// Run the query now and broadcast the outcome to every active subscription.
    ///
    /// A call made while a fetch is already in flight (from inside a consumer
    /// callback) is ignored; that fetch's broadcast reaches everybody anyway.
    pub(crate) fn perform_fetch_immediately(&self) {
        self.context.assert_current("Coordinator::perform_fetch_immediately");
        let Some(next) = self.status.get().trigger() else {
            debug!(context = %self.context, query = %self.query_name, "fetch already in progress");
            return;
        };
        self.status.set(next);
        debug!(context = %self.context, query = %self.query_name, "fetch started");

        let result = self.engine.borrow_mut().fetch();
        match result {
            Ok(snapshot) => {
                self.status.set(self.status.get().complete(FetchOutcome::Succeeded));
                debug!(context = %self.context, query = %self.query_name, items = snapshot.len(), "fetch succeeded");
                self.broadcast_snapshot(&snapshot);
            }
            Err(error) => {
                self.status.set(self.status.get().complete(FetchOutcome::Failed));
                warn!(context = %self.context, query = %self.query_name, error = %error, "fetch failed");
                self.broadcast_error(&error);
            }
        }
    }

    fn handle_change(&self, snapshot: Option<Snapshot<E::Item>>) {
        self.context.assert_current("Coordinator::handle_change");
        match snapshot {
            Some(snapshot) => {
                debug!(context = %self.context, query = %self.query_name, items = snapshot.len(), "data changed");
                self.broadcast_snapshot(&snapshot);
            }
            None => {
                debug!(context = %self.context, query = %self.query_name, "ignoring change before first successful fetch");
            }
        }
    }

    fn broadcast_snapshot(&self, snapshot: &Snapshot<E::Item>) {
        let observers = self.live_observers();
        trace!(context = %self.context, recipients = observers.len(), "broadcasting snapshot");
        for observer in observers {
            observer.on_update(snapshot.clone());
        }
    }

    fn broadcast_error(&self, error: &LiveQueryError) {
        let observers = self.live_observers();
        trace!(context = %self.context, recipients = observers.len(), "broadcasting failure");
        for observer in observers {
            observer.on_error(error.clone());
        }
    }

    // Upgraded outside of the delivery loop so callbacks may mutate the table.
    fn live_observers(&self) -> Vec<Rc<dyn Observer<E::Item>>> {
        let mut observers = self.observers.borrow_mut();
        self.prune_expired(&mut observers);
        observers
            .iter()
            .filter_map(|entry| entry.observer.upgrade())
            .collect()
    }

    fn prune_expired(&self, observers: &mut Vec<ObserverEntry<E::Item>>) {
        let before = observers.len();
        observers.retain(|entry| entry.observer.strong_count() > 0);
        let pruned = before - observers.len();
        if pruned > 0 {
            trace!(context = %self.context, pruned, "pruned dropped subscriptions");
        }
    }

    /// Current state of the fetch machine.
    pub fn status(&self) -> FetchStatus {
        self.status.get()
    }

    /// Number of registered subscriptions that are still alive.
    pub fn active_subscriptions(&self) -> usize {
        let mut observers = self.observers.borrow_mut();
        self.prune_expired(&mut observers);
        observers.len()
    }

    /// The engine's last successful snapshot.
    pub fn current_snapshot(&self) -> Option<Snapshot<E::Item>> {
        self.engine.borrow().current_snapshot()
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn query_name(&self) -> &str {
        &self.query_name
    }
}

impl<E: LiveQueryEngine> fmt::Debug for Coordinator<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("query", &self.query_name)
            .field("context", &self.context)
            .field("status", &self.status.get())
            .field("observers", &self.observers.borrow().len())
            .finish_non_exhaustive()
    }
}
