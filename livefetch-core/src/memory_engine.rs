// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! An in-memory data store with live queries over it.
//!
//! [`MemoryStore`] is a cheap-to-clone handle to a shared row set. Each engine
//! configured from it registers itself as a listener; after every mutation the
//! store re-resolves the query of each engine that has fetched at least once
//! and hands the fresh snapshot to the engine's change handler.
//!
//! A handler may mutate the store while it runs. The nested change is folded
//! into the running pass, which re-resolves and signals again until the data
//! settles. A change the store cannot re-resolve (it is offline) is not
//! signalled at all.
//!
//! ## Example
//!
//! ```
//! use livefetch_core::{
//!     ConfigureEngine, EngineConfig, LiveQueryEngine, MemoryStore, QuerySpec, SortDescriptor,
//! };
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let store = MemoryStore::with_rows(vec![3, 1, 2]);
//! let query = QuerySpec::new("numbers").sort_by(SortDescriptor::ascending("n", |n: &u32| *n));
//! let mut engine = store.clone().configure(EngineConfig::new(query)).unwrap();
//!
//! let changes = Rc::new(RefCell::new(Vec::new()));
//! let sink = changes.clone();
//! engine.set_change_handler(Box::new(move |snapshot| sink.borrow_mut().push(snapshot)));
//!
//! assert_eq!(engine.fetch().unwrap(), vec![1, 2, 3]);
//!
//! store.insert(0);
//! let latest = changes.borrow().last().cloned().flatten().unwrap();
//! assert_eq!(latest, vec![0, 1, 2, 3]);
//! ```

use crate::{ChangeHandler, ConfigureEngine, EngineConfig, ExecutionContext, LiveQueryEngine};
use crate::{QuerySpec, Snapshot};
use livefetch_error::{IntoLiveQueryError, LiveQueryError, Result};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

struct StoreState<T> {
    rows: RefCell<Vec<T>>,
    available: Cell<bool>,
    listeners: RefCell<Vec<Weak<EngineState<T>>>>,
}

struct EngineState<T> {
    query: QuerySpec<T>,
    context: ExecutionContext,
    cache_name: Option<String>,
    snapshot: RefCell<Option<Snapshot<T>>>,
    handler: RefCell<Option<ChangeHandler<T>>>,
    notifying: Cell<bool>,
    dirty: Cell<bool>,
}

/// A shared, mutable, single-context row set.
pub struct MemoryStore<T> {
    state: Rc<StoreState<T>>,
}

impl<T: Clone + 'static> MemoryStore<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    #[must_use]
    pub fn with_rows(rows: Vec<T>) -> Self {
        Self {
            state: Rc::new(StoreState {
                rows: RefCell::new(rows),
                available: Cell::new(true),
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn insert(&self, row: T) {
        self.state.rows.borrow_mut().push(row);
        self.notify_changed();
    }

    pub fn extend<I: IntoIterator<Item = T>>(&self, rows: I) {
        self.state.rows.borrow_mut().extend(rows);
        self.notify_changed();
    }

    /// Append rows from a fallible source, all or nothing.
    ///
    /// Returns how many rows were appended. Listeners are notified once.
    ///
    /// # Errors
    ///
    /// Returns [`LiveQueryError::FetchFailed`] naming the first row that could
    /// not be loaded. The store is left untouched.
    pub fn try_extend<I, E>(&self, rows: I) -> Result<usize>
    where
        I: IntoIterator<Item = std::result::Result<T, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let mut loaded = Vec::new();
        for (index, row) in rows.into_iter().enumerate() {
            let row = row.map_err(|e| e.into_live_query_error(&format!("loading row {index}")))?;
            loaded.push(row);
        }
        let count = loaded.len();
        if count > 0 {
            self.extend(loaded);
        }
        Ok(count)
    }

    /// Remove every row matching `predicate`, returning how many were removed.
    ///
    /// Listeners are only notified when something was removed.
    pub fn remove_where<P: Fn(&T) -> bool>(&self, predicate: P) -> usize {
        let removed = {
            let mut rows = self.state.rows.borrow_mut();
            let before = rows.len();
            rows.retain(|row| !predicate(row));
            before - rows.len()
        };
        if removed > 0 {
            self.notify_changed();
        }
        removed
    }

    /// Apply `update` to every row matching `predicate`, returning how many changed.
    pub fn update_where<P, U>(&self, predicate: P, update: U) -> usize
    where
        P: Fn(&T) -> bool,
        U: Fn(&mut T),
    {
        let mut updated = 0;
        for row in self.state.rows.borrow_mut().iter_mut() {
            if predicate(row) {
                update(row);
                updated += 1;
            }
        }
        if updated > 0 {
            self.notify_changed();
        }
        updated
    }

    pub fn clear(&self) {
        self.state.rows.borrow_mut().clear();
        self.notify_changed();
    }

    /// Mark the store reachable or not. Fetching from an unavailable store fails.
    pub fn set_available(&self, available: bool) {
        self.state.available.set(available);
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.state.available.get()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.rows.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.rows.borrow().is_empty()
    }

    #[must_use]
    pub fn rows(&self) -> Vec<T> {
        self.state.rows.borrow().clone()
    }

    /// Number of engines still attached to this store.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.state
            .listeners
            .borrow()
            .iter()
            .filter(|listener| listener.strong_count() > 0)
            .count()
    }

    fn resolve(&self, query: &QuerySpec<T>) -> Result<Snapshot<T>> {
        if !self.is_available() {
            return Err(LiveQueryError::store_unavailable(format!(
                "memory store is offline while resolving '{}'",
                query.name()
            )));
        }
        let rows = self.state.rows.borrow();
        Ok(Snapshot::new(query.resolve(rows.iter())))
    }

    fn notify_changed(&self) {
        let listeners: Vec<Rc<EngineState<T>>> = {
            let mut listeners = self.state.listeners.borrow_mut();
            listeners.retain(|listener| listener.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };

        for engine in listeners {
            engine.context.assert_current("MemoryStore::notify_changed");

            // Mutated from inside this engine's handler: the running pass signals again
            if engine.notifying.get() {
                engine.dirty.set(true);
                continue;
            }

            engine.notifying.set(true);
            loop {
                engine.dirty.set(false);
                self.signal(&engine);
                if !engine.dirty.get() {
                    break;
                }
            }
            engine.notifying.set(false);
        }
    }

    fn signal(&self, engine: &EngineState<T>) {
        let snapshot = if engine.snapshot.borrow().is_some() {
            match self.resolve(&engine.query) {
                Ok(snapshot) => {
                    *engine.snapshot.borrow_mut() = Some(snapshot.clone());
                    Some(snapshot)
                }
                Err(_error) => {
                    warn!(query = %engine.query.name(), error = %_error, "change not signalled, query could not be re-resolved");
                    return;
                }
            }
        } else {
            None
        };

        let handler = engine.handler.borrow_mut().take();
        if let Some(mut handler) = handler {
            handler(snapshot);
            let mut slot = engine.handler.borrow_mut();
            // The handler may have been replaced while it ran
            if slot.is_none() {
                *slot = Some(handler);
            }
        }
    }
}

impl<T: Clone + 'static> ConfigureEngine<T> for MemoryStore<T> {
    type Engine = MemoryQueryEngine<T>;

    fn configure(self, config: EngineConfig<T>) -> Result<Self::Engine> {
        let (query, context, cache_name) = config.into_parts();
        let state = Rc::new(EngineState {
            query,
            context,
            cache_name,
            snapshot: RefCell::new(None),
            handler: RefCell::new(None),
            notifying: Cell::new(false),
            dirty: Cell::new(false),
        });
        self.state.listeners.borrow_mut().push(Rc::downgrade(&state));
        Ok(MemoryQueryEngine { store: self, state })
    }
}

impl<T: Clone + 'static> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T> fmt::Debug for MemoryStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("rows", &self.state.rows.borrow().len())
            .field("available", &self.state.available.get())
            .finish_non_exhaustive()
    }
}

/// A live query over a [`MemoryStore`].
pub struct MemoryQueryEngine<T> {
    store: MemoryStore<T>,
    state: Rc<EngineState<T>>,
}

impl<T: Clone + 'static> MemoryQueryEngine<T> {
    #[must_use]
    pub fn query(&self) -> &QuerySpec<T> {
        &self.state.query
    }

    /// The cache name the engine was configured with.
    ///
    /// The in-memory engine records it but keeps no index between runs.
    #[must_use]
    pub fn cache_name(&self) -> Option<&str> {
        self.state.cache_name.as_deref()
    }

    #[must_use]
    pub fn store(&self) -> &MemoryStore<T> {
        &self.store
    }
}

impl<T: Clone + 'static> LiveQueryEngine for MemoryQueryEngine<T> {
    type Item = T;

    fn fetch(&mut self) -> Result<Snapshot<T>> {
        self.state.context.assert_current("MemoryQueryEngine::fetch");
        let snapshot = self.store.resolve(&self.state.query)?;
        *self.state.snapshot.borrow_mut() = Some(snapshot.clone());
        Ok(snapshot)
    }

    fn current_snapshot(&self) -> Option<Snapshot<T>> {
        self.state.snapshot.borrow().clone()
    }

    fn set_change_handler(&mut self, handler: ChangeHandler<T>) {
        *self.state.handler.borrow_mut() = Some(handler);
    }
}
