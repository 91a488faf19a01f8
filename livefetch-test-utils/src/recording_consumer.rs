// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use livefetch_core::{Consumer, Demand, LiveQueryError, Snapshot};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

type ReceiveHook<T> = Box<dyn FnMut(&Snapshot<T>)>;

struct Recorder<T> {
    snapshots: RefCell<Vec<Snapshot<T>>>,
    failures: RefCell<Vec<LiveQueryError>>,
    script: RefCell<VecDeque<Demand>>,
    fallback: Demand,
    on_receive: RefCell<Option<ReceiveHook<T>>>,
}

/// A [`Consumer`] that records everything it receives.
///
/// Clones share the same record, so a test keeps one clone and hands the
/// other to the publisher.
///
/// # Example
///
/// ```rust
/// use livefetch_core::{Consumer, Demand, Snapshot};
/// use livefetch_test_utils::RecordingConsumer;
///
/// let consumer = RecordingConsumer::scripted([Demand::max(1)], Demand::None);
///
/// assert_eq!(consumer.receive(Snapshot::from(vec![1])), Demand::max(1));
/// assert_eq!(consumer.receive(Snapshot::from(vec![2])), Demand::None);
/// assert_eq!(consumer.items(), vec![vec![1], vec![2]]);
/// ```
pub struct RecordingConsumer<T> {
    inner: Rc<Recorder<T>>,
}

impl<T> Clone for RecordingConsumer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> RecordingConsumer<T> {
    /// Answers every delivery with `demand`.
    pub fn returning(demand: Demand) -> Self {
        Self::scripted([], demand)
    }

    /// Answers deliveries with `script` in order, then with `fallback`.
    pub fn scripted(script: impl IntoIterator<Item = Demand>, fallback: Demand) -> Self {
        Self {
            inner: Rc::new(Recorder {
                snapshots: RefCell::new(Vec::new()),
                failures: RefCell::new(Vec::new()),
                script: RefCell::new(script.into_iter().collect()),
                fallback,
                on_receive: RefCell::new(None),
            }),
        }
    }

    /// Run `hook` on every delivery, after it is recorded.
    pub fn on_receive(&self, hook: impl FnMut(&Snapshot<T>) + 'static) {
        *self.inner.on_receive.borrow_mut() = Some(Box::new(hook));
    }

    pub fn snapshots(&self) -> Vec<Snapshot<T>> {
        self.inner.snapshots.borrow().clone()
    }

    pub fn failures(&self) -> Vec<LiveQueryError> {
        self.inner.failures.borrow().clone()
    }

    pub fn received_count(&self) -> usize {
        self.inner.snapshots.borrow().len()
    }

    pub fn failure_count(&self) -> usize {
        self.inner.failures.borrow().len()
    }
}

impl<T: Clone> RecordingConsumer<T> {
    /// Every received snapshot, as owned rows.
    pub fn items(&self) -> Vec<Vec<T>> {
        self.inner
            .snapshots
            .borrow()
            .iter()
            .map(Snapshot::to_vec)
            .collect()
    }
}

impl<T> Consumer<T> for RecordingConsumer<T> {
    fn receive(&self, snapshot: Snapshot<T>) -> Demand {
        self.inner.snapshots.borrow_mut().push(snapshot.clone());

        let hook = self.inner.on_receive.borrow_mut().take();
        if let Some(mut hook) = hook {
            hook(&snapshot);
            let mut slot = self.inner.on_receive.borrow_mut();
            if slot.is_none() {
                *slot = Some(hook);
            }
        }

        self.inner
            .script
            .borrow_mut()
            .pop_front()
            .unwrap_or(self.inner.fallback)
    }

    fn receive_failure(&self, error: LiveQueryError) {
        self.inner.failures.borrow_mut().push(error);
    }
}
