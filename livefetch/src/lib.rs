// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! One shared live query, many demand-driven subscribers.
//!
//! `livefetch` lets any number of independent consumers observe the result set
//! of a single query. Each receives an initial snapshot and then every update
//! caused by a change in the underlying data, while the query itself runs at
//! most once at a time and only while somebody is interested.
//!
//! # Components
//!
//! - [`Publisher`]: entry point; owns one [`Coordinator`] and creates
//!   subscriptions.
//! - [`Coordinator`]: owns the engine and the fetch-state machine, deduplicates
//!   fetches, fans results and failures out to active subscriptions.
//! - [`Subscription`]: one consumer's demand and lifecycle.
//! - [`SnapshotStream`]: a `futures::Stream` view with unlimited demand.
//!
//! # Confinement
//!
//! Nothing in this crate locks. A publisher, its coordinator and all its
//! subscriptions live on the [`ExecutionContext`] that owns the engine; the
//! types are `!Send` and entry points debug-assert the context.
//!
//! # Example
//!
//! ```
//! use livefetch::{Demand, EngineConfig, FetchStatus, MemoryStore, Publisher, QuerySpec, SortDescriptor};
//! use livefetch_test_utils::RecordingConsumer;
//!
//! let store = MemoryStore::with_rows(vec!["b", "a"]);
//! let query = QuerySpec::new("letters").sort_by(SortDescriptor::ascending("letter", |l: &&str| *l));
//! let publisher = Publisher::new(store.clone(), EngineConfig::new(query)).unwrap();
//!
//! let first = RecordingConsumer::returning(Demand::None);
//! let _a = publisher.subscribe(first.clone(), Demand::max(1));
//! assert_eq!(publisher.fetch_status(), FetchStatus::Fetched);
//!
//! // A late joiner is served from the cache
//! let late = RecordingConsumer::returning(Demand::Unlimited);
//! let _b = publisher.subscribe(late.clone(), Demand::Unlimited);
//!
//! store.insert("c");
//!
//! assert_eq!(first.items(), vec![vec!["a", "b"]]);
//! assert_eq!(late.items(), vec![vec!["a", "b"], vec!["a", "b", "c"]]);
//! ```

#[macro_use]
mod logging;

pub mod coordinator;
pub mod publisher;
pub mod snapshot_stream;
pub mod subscription;

pub use self::coordinator::Coordinator;
pub use self::publisher::Publisher;
pub use self::snapshot_stream::SnapshotStream;
pub use self::subscription::{Subscription, SubscriptionId};
pub use livefetch_core::{
    consumer_fn, ConfigureEngine, Consumer, Demand, EngineConfig, ExecutionContext, FetchStatus,
    LiveQueryEngine, LiveQueryError, MemoryQueryEngine, MemoryStore, QueryItem, QuerySpec, Result,
    Snapshot, SortDescriptor, SortDirection,
};
