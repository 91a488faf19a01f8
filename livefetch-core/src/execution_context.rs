// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The single execution context a shared query is confined to.
//!
//! Coordinators and subscriptions take no locks. Instead every entry point runs
//! on the context that owns the query engine. The `Rc`-based types already
//! refuse to cross threads at compile time; [`ExecutionContext::assert_current`]
//! makes the requirement explicit at runtime in debug builds as well.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// A named handle identifying the thread a live query is confined to.
#[derive(Clone)]
pub struct ExecutionContext {
    name: Arc<str>,
    thread: ThreadId,
}

impl ExecutionContext {
    /// The calling thread, named after the thread (or `"unnamed"`).
    #[must_use]
    pub fn current() -> Self {
        let current = thread::current();
        let name = current.name().unwrap_or("unnamed");
        Self {
            name: Arc::from(name),
            thread: current.id(),
        }
    }

    /// The calling thread, under an explicit name used in log output.
    #[must_use]
    pub fn named(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            thread: thread::current().id(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` when called from the thread this context is bound to.
    #[must_use]
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread
    }

    /// Debug-asserts that `operation` runs on this context.
    ///
    /// # Panics
    ///
    /// In debug builds, panics when called from another thread.
    #[track_caller]
    pub fn assert_current(&self, operation: &str) {
        debug_assert!(
            self.is_current(),
            "{operation} called outside execution context '{}'",
            self.name
        );
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::current()
    }
}

impl PartialEq for ExecutionContext {
    fn eq(&self, other: &Self) -> bool {
        self.thread == other.thread
    }
}

impl Eq for ExecutionContext {}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("name", &self.name)
            .field("thread", &self.thread)
            .finish()
    }
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
