// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Core traits and types for livefetch.
//!
//! The coordination layer in the `livefetch` crate is written against the
//! abstractions defined here:
//!
//! - [`Demand`] and [`FetchStatus`], the two small state machines.
//! - [`Snapshot`], the shared, ordered result of one query execution.
//! - [`QuerySpec`] and [`SortDescriptor`], the description of what to fetch.
//! - [`LiveQueryEngine`] and [`ConfigureEngine`], the seam to the engine that
//!   actually executes the query.
//! - [`Consumer`], the capability a subscriber implements to receive results.
//! - [`MemoryStore`], an in-memory engine useful for tests and prototypes.

#[macro_use]
mod logging;

pub mod consumer;
pub mod demand;
pub mod engine;
pub mod execution_context;
pub mod fetch_status;
pub mod memory_engine;
pub mod query;
pub mod query_item;
pub mod snapshot;

pub use self::consumer::{consumer_fn, Consumer, FnConsumer};
pub use self::demand::Demand;
pub use self::engine::{ChangeHandler, ConfigureEngine, EngineConfig, LiveQueryEngine};
pub use self::execution_context::ExecutionContext;
pub use self::fetch_status::{FetchOutcome, FetchStatus};
pub use self::memory_engine::{MemoryQueryEngine, MemoryStore};
pub use self::query::{QuerySpec, SortDescriptor, SortDirection};
pub use self::query_item::QueryItem;
pub use self::snapshot::Snapshot;
pub use livefetch_error::{IntoLiveQueryError, LiveQueryError, Result, ResultExt};
