// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The seam between the coordination layer and whatever executes the query.
//!
//! An engine is built from a data source through [`ConfigureEngine`], then
//! handed to a coordinator that becomes its exclusive owner. The coordinator
//! installs a [`ChangeHandler`] once; the engine invokes it every time the
//! underlying data changes.

use crate::{ExecutionContext, QuerySpec, Snapshot};
use livefetch_error::Result;

/// Callback invoked by an engine when its underlying data changes.
///
/// The engine re-resolves the query before calling it. It passes `None` when
/// it has never completed a fetch and therefore has no snapshot to offer.
pub type ChangeHandler<T> = Box<dyn FnMut(Option<Snapshot<T>>)>;

/// Executes a query and reports subsequent changes.
pub trait LiveQueryEngine: 'static {
    type Item: 'static;

    /// Run, or re-run, the query. May block the calling context.
    ///
    /// # Errors
    ///
    /// Returns the engine's failure; the caller broadcasts it to subscribers.
    fn fetch(&mut self) -> Result<Snapshot<Self::Item>>;

    /// The last successfully fetched snapshot, if any.
    fn current_snapshot(&self) -> Option<Snapshot<Self::Item>>;

    /// Install the change callback, replacing any previous one.
    fn set_change_handler(&mut self, handler: ChangeHandler<Self::Item>);
}

/// A data source able to build an engine for a query.
pub trait ConfigureEngine<T> {
    type Engine: LiveQueryEngine<Item = T>;

    /// Build an engine bound to `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot serve the query.
    fn configure(self, config: EngineConfig<T>) -> Result<Self::Engine>;
}

/// Everything an engine needs to know about the query it serves.
///
/// # Example
///
/// ```
/// use livefetch_core::{EngineConfig, ExecutionContext, QuerySpec, SortDescriptor};
///
/// let query = QuerySpec::<u32>::new("numbers").sort_by(SortDescriptor::ascending("n", |n: &u32| *n));
/// let config = EngineConfig::new(query)
///     .with_context(ExecutionContext::named("main"))
///     .with_cache_name("numbers-index");
///
/// assert_eq!(config.cache_name(), Some("numbers-index"));
/// assert_eq!(config.context().name(), "main");
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig<T> {
    query: QuerySpec<T>,
    context: ExecutionContext,
    cache_name: Option<String>,
}

impl<T> EngineConfig<T> {
    /// A configuration bound to the calling thread, without a cache name.
    #[must_use]
    pub fn new(query: QuerySpec<T>) -> Self {
        Self {
            query,
            context: ExecutionContext::current(),
            cache_name: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    /// Name under which an engine may persist a precomputed index between runs.
    #[must_use]
    pub fn with_cache_name(mut self, cache_name: impl Into<String>) -> Self {
        self.cache_name = Some(cache_name.into());
        self
    }

    #[must_use]
    pub const fn query(&self) -> &QuerySpec<T> {
        &self.query
    }

    #[must_use]
    pub const fn context(&self) -> &ExecutionContext {
        &self.context
    }

    #[must_use]
    pub fn cache_name(&self) -> Option<&str> {
        self.cache_name.as_deref()
    }

    #[must_use]
    pub fn into_parts(self) -> (QuerySpec<T>, ExecutionContext, Option<String>) {
        (self.query, self.context, self.cache_name)
    }
}
