// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A [`LiveQueryEngine`] whose behaviour is driven from the test.
//!
//! The engine moves into the coordinator under test, so every knob lives on a
//! [`ScriptedHandle`] that shares its state.

use livefetch_core::{
    ChangeHandler, ConfigureEngine, EngineConfig, LiveQueryEngine, LiveQueryError, Result,
    Snapshot,
};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

type FetchHook = Box<dyn FnMut()>;

struct ScriptState<T> {
    data: RefCell<Vec<T>>,
    failures: RefCell<VecDeque<LiveQueryError>>,
    configure_error: RefCell<Option<LiveQueryError>>,
    fetch_count: Cell<usize>,
    snapshot: RefCell<Option<Snapshot<T>>>,
    handler: RefCell<Option<ChangeHandler<T>>>,
    fetch_hook: RefCell<Option<FetchHook>>,
    cache_name: RefCell<Option<String>>,
    query_name: RefCell<Option<String>>,
    dropped: Cell<bool>,
}

/// Engine returning a fixed data set, or the next queued failure.
pub struct ScriptedEngine<T> {
    state: Rc<ScriptState<T>>,
}

/// Test-side control over a [`ScriptedEngine`].
pub struct ScriptedHandle<T> {
    state: Rc<ScriptState<T>>,
}

impl<T> Clone for ScriptedHandle<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: Clone + 'static> ScriptedEngine<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            state: Rc::new(ScriptState {
                data: RefCell::new(data),
                failures: RefCell::new(VecDeque::new()),
                configure_error: RefCell::new(None),
                fetch_count: Cell::new(0),
                snapshot: RefCell::new(None),
                handler: RefCell::new(None),
                fetch_hook: RefCell::new(None),
                cache_name: RefCell::new(None),
                query_name: RefCell::new(None),
                dropped: Cell::new(false),
            }),
        }
    }

    pub fn handle(&self) -> ScriptedHandle<T> {
        ScriptedHandle {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: Clone + 'static> LiveQueryEngine for ScriptedEngine<T> {
    type Item = T;

    fn fetch(&mut self) -> Result<Snapshot<T>> {
        let state = &self.state;
        state.fetch_count.set(state.fetch_count.get() + 1);

        let hook = state.fetch_hook.borrow_mut().take();
        if let Some(mut hook) = hook {
            hook();
            let mut slot = state.fetch_hook.borrow_mut();
            if slot.is_none() {
                *slot = Some(hook);
            }
        }

        let failure = state.failures.borrow_mut().pop_front();
        if let Some(error) = failure {
            return Err(error);
        }
        let snapshot = Snapshot::from(state.data.borrow().clone());
        *state.snapshot.borrow_mut() = Some(snapshot.clone());
        Ok(snapshot)
    }

    fn current_snapshot(&self) -> Option<Snapshot<T>> {
        self.state.snapshot.borrow().clone()
    }

    fn set_change_handler(&mut self, handler: ChangeHandler<T>) {
        *self.state.handler.borrow_mut() = Some(handler);
    }
}

impl<T: Clone + 'static> ConfigureEngine<T> for ScriptedEngine<T> {
    type Engine = Self;

    fn configure(self, config: EngineConfig<T>) -> Result<Self> {
        if let Some(error) = self.state.configure_error.borrow_mut().take() {
            return Err(error);
        }
        *self.state.query_name.borrow_mut() = Some(config.query().name().to_owned());
        *self.state.cache_name.borrow_mut() = config.cache_name().map(str::to_owned);
        Ok(self)
    }
}

impl<T> Drop for ScriptedEngine<T> {
    fn drop(&mut self) {
        self.state.dropped.set(true);
        let handler = self.state.handler.borrow_mut().take();
        drop(handler);
    }
}

impl<T: Clone + 'static> ScriptedHandle<T> {
    /// Replace the rows returned by subsequent fetches and change signals.
    pub fn set_data(&self, data: Vec<T>) {
        *self.state.data.borrow_mut() = data;
    }

    /// Queue a failure for the next fetch. Queued failures are consumed in order.
    pub fn fail_next(&self, error: LiveQueryError) {
        self.state.failures.borrow_mut().push_back(error);
    }

    /// Make the next `configure` call fail.
    pub fn reject_configuration(&self, error: LiveQueryError) {
        *self.state.configure_error.borrow_mut() = Some(error);
    }

    /// Run `hook` inside every fetch, before it resolves.
    pub fn set_fetch_hook(&self, hook: impl FnMut() + 'static) {
        *self.state.fetch_hook.borrow_mut() = Some(Box::new(hook));
    }

    pub fn clear_fetch_hook(&self) {
        *self.state.fetch_hook.borrow_mut() = None;
    }

    pub fn fetch_count(&self) -> usize {
        self.state.fetch_count.get()
    }

    /// Signal a data change the way a real engine would.
    ///
    /// Re-resolves from the current data when a fetch has completed, and signals
    /// `None` otherwise.
    pub fn emit_change(&self) {
        let snapshot = if self.state.snapshot.borrow().is_some() {
            let fresh = Snapshot::from(self.state.data.borrow().clone());
            *self.state.snapshot.borrow_mut() = Some(fresh.clone());
            Some(fresh)
        } else {
            None
        };
        self.emit_snapshot(snapshot);
    }

    /// Invoke the change handler with an arbitrary payload.
    pub fn emit_snapshot(&self, snapshot: Option<Snapshot<T>>) {
        let handler = self.state.handler.borrow_mut().take();
        let Some(mut handler) = handler else {
            return;
        };
        handler(snapshot);
        if self.state.dropped.get() {
            return;
        }
        let mut slot = self.state.handler.borrow_mut();
        if slot.is_none() {
            *slot = Some(handler);
        }
    }

    pub fn has_change_handler(&self) -> bool {
        self.state.handler.borrow().is_some()
    }

    pub fn is_dropped(&self) -> bool {
        self.state.dropped.get()
    }

    pub fn cache_name(&self) -> Option<String> {
        self.state.cache_name.borrow().clone()
    }

    pub fn query_name(&self) -> Option<String> {
        self.state.query_name.borrow().clone()
    }
}
