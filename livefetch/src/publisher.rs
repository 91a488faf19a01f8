// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::coordinator::Coordinator;
use crate::snapshot_stream::SnapshotStream;
use crate::subscription::Subscription;
use livefetch_core::{
    ConfigureEngine, Consumer, Demand, EngineConfig, ExecutionContext, FetchStatus,
    LiveQueryEngine, Result, ResultExt, Snapshot,
};
use std::fmt;
use std::rc::Rc;

/// Entry point for one shared live query.
///
/// A `Publisher` owns exactly one [`Coordinator`] for its whole lifetime and
/// hands out a new [`Subscription`] per consumer. All subscriptions share the
/// coordinator, hence the query execution and its cached snapshot.
///
/// # Example
///
/// ```
/// use livefetch::{consumer_fn, Demand, EngineConfig, MemoryStore, Publisher, QuerySpec, SortDescriptor};
/// use livefetch::Snapshot;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let store = MemoryStore::with_rows(vec![30u32, 10, 20]);
/// let query = QuerySpec::new("ages").sort_by(SortDescriptor::ascending("age", |a: &u32| *a));
/// let publisher = Publisher::new(store.clone(), EngineConfig::new(query)).unwrap();
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = seen.clone();
/// let subscription = publisher.attach(consumer_fn(
///     move |snapshot: Snapshot<u32>| {
///         sink.borrow_mut().push(snapshot.to_vec());
///         Demand::Unlimited
///     },
///     |_error| {},
/// ));
/// subscription.request(Demand::Unlimited);
/// store.insert(5);
///
/// assert_eq!(*seen.borrow(), vec![vec![10, 20, 30], vec![5, 10, 20, 30]]);
/// ```
pub struct Publisher<E: LiveQueryEngine> {
    coordinator: Rc<Coordinator<E>>,
}

impl<E: LiveQueryEngine> Publisher<E> {
    /// Configure an engine from `source` and wrap it in a fresh coordinator.
    ///
    /// # Errors
    ///
    /// Returns [`LiveQueryError::MissingSortOrder`](livefetch_core::LiveQueryError::MissingSortOrder)
    /// when the query has no sort descriptor, or whatever `source` fails with.
    /// An opaque user error from `source` becomes
    /// [`LiveQueryError::FetchFailed`](livefetch_core::LiveQueryError::FetchFailed)
    /// naming the query.
    pub fn new<S, T>(source: S, config: EngineConfig<T>) -> Result<Self>
    where
        S: ConfigureEngine<T, Engine = E>,
        E: LiveQueryEngine<Item = T>,
    {
        if let Err(error) = config.query().validate() {
            warn!(query = %config.query().name(), error = %error, "rejecting query without deterministic ordering");
            return Err(error);
        }
        let context = config.context().clone();
        let query_name = config.query().name().to_owned();
        let engine = source
            .configure(config)
            .with_context(|| format!("configuring engine for query '{query_name}'"))?;
        debug!(context = %context, query = %query_name, "publisher created");
        Ok(Self {
            coordinator: Coordinator::new(engine, context, query_name),
        })
    }

    /// Bind `consumer` to the shared query.
    ///
    /// Nothing is delivered until demand is signalled through the returned handle.
    pub fn attach<C>(&self, consumer: C) -> Subscription<E>
    where
        C: Consumer<E::Item> + 'static,
    {
        self.attach_shared(Rc::new(consumer))
    }

    /// Like [`attach`](Self::attach), for a consumer the caller keeps a handle to.
    pub fn attach_shared(&self, consumer: Rc<dyn Consumer<E::Item>>) -> Subscription<E> {
        self.coordinator
            .context()
            .assert_current("Publisher::attach");
        Subscription::new(Rc::clone(&self.coordinator), consumer)
    }

    /// Attach `consumer` and immediately request `demand`.
    pub fn subscribe<C>(&self, consumer: C, demand: Demand) -> Subscription<E>
    where
        C: Consumer<E::Item> + 'static,
    {
        let subscription = self.attach(consumer);
        subscription.request(demand);
        subscription
    }

    /// A stream of every snapshot, attached with unlimited demand.
    pub fn stream(&self) -> SnapshotStream<E> {
        SnapshotStream::attach(self)
    }

    /// Re-run the query and rebroadcast, even when a snapshot is cached.
    pub fn refresh_now(&self) {
        debug!(context = %self.coordinator.context(), query = %self.coordinator.query_name(), "manual refresh");
        self.coordinator.perform_fetch_immediately();
    }

    pub fn fetch_status(&self) -> FetchStatus {
        self.coordinator.status()
    }

    /// Number of live subscriptions with outstanding demand.
    pub fn active_subscriptions(&self) -> usize {
        self.coordinator.active_subscriptions()
    }

    pub fn current_snapshot(&self) -> Option<Snapshot<E::Item>> {
        self.coordinator.current_snapshot()
    }

    pub fn context(&self) -> &ExecutionContext {
        self.coordinator.context()
    }

    pub fn query_name(&self) -> &str {
        self.coordinator.query_name()
    }

    pub fn coordinator(&self) -> &Coordinator<E> {
        &self.coordinator
    }
}

impl<E: LiveQueryEngine> fmt::Debug for Publisher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("coordinator", &self.coordinator)
            .finish()
    }
}
