// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! One consumer's view of a shared live query.
//!
//! A [`Subscription`] turns coordinator broadcasts into consumer deliveries,
//! strictly gated by the consumer's outstanding [`Demand`]:
//!
//! ```text
//!  request(n) ──► Active(demand) ──► on_update: deliver, demand = consumer's answer
//!                    │     ▲
//!                    │     └── request(m): demand += m
//!                    │
//!        on_error / cancel
//!                    ▼
//!               Terminated   (absorbing, every call is a no-op)
//! ```
//!
//! The subscription holds its coordinator strongly, so the shared query stays
//! alive exactly as long as some subscription (or the publisher) exists. The
//! coordinator only holds the subscription weakly.

use crate::coordinator::{Coordinator, Observer};
use livefetch_core::{Consumer, Demand, LiveQueryEngine, LiveQueryError, Snapshot};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Identifier of a subscription within its coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

struct SubscriptionState<E: LiveQueryEngine> {
    demand: Demand,
    consumer: Option<Rc<dyn Consumer<E::Item>>>,
    coordinator: Option<Rc<Coordinator<E>>>,
}

pub(crate) struct SubscriptionCore<E: LiveQueryEngine> {
    id: SubscriptionId,
    state: RefCell<SubscriptionState<E>>,
}

impl<E: LiveQueryEngine> SubscriptionCore<E> {
    fn request(self: &Rc<Self>, amount: Demand) {
        let (coordinator, demand) = {
            let mut state = self.state.borrow_mut();
            let Some(coordinator) = state.coordinator.clone() else {
                return;
            };
            state.demand = state.demand + amount;
            (coordinator, state.demand)
        };
        coordinator.context().assert_current("Subscription::request");
        trace!(subscription = %self.id, %demand, "demand requested");

        if demand.is_positive() {
            let observer: Rc<dyn Observer<E::Item>> = self.clone();
            coordinator.begin_observing(self.id, Rc::downgrade(&observer));
        } else {
            coordinator.end_observing(self.id);
        }
        coordinator.perform_fetch_if_needed(&**self);
    }

    fn cancel(&self) {
        // Released outside the borrow: dropping a consumer may run arbitrary code
        let (coordinator, consumer) = {
            let mut state = self.state.borrow_mut();
            if let Some(coordinator) = state.coordinator.as_ref() {
                coordinator.context().assert_current("Subscription::cancel");
            }
            state.demand = Demand::None;
            (state.coordinator.take(), state.consumer.take())
        };
        if let Some(coordinator) = coordinator {
            coordinator.end_observing(self.id);
            debug!(context = %coordinator.context(), subscription = %self.id, "subscription cancelled");
        }
        drop(consumer);
    }

    fn demand(&self) -> Demand {
        self.state.borrow().demand
    }

    fn is_terminated(&self) -> bool {
        self.state.borrow().coordinator.is_none()
    }
}

impl<E: LiveQueryEngine> Observer<E::Item> for SubscriptionCore<E> {
    fn on_update(&self, snapshot: Snapshot<E::Item>) {
        let (consumer, unlimited) = {
            let state = self.state.borrow();
            if !state.demand.is_positive() {
                return;
            }
            let Some(coordinator) = state.coordinator.as_ref() else {
                return;
            };
            coordinator.context().assert_current("Subscription::on_update");
            let Some(consumer) = state.consumer.clone() else {
                return;
            };
            (consumer, state.demand.is_unlimited())
        };

        let requested = consumer.receive(snapshot);
        if unlimited {
            return;
        }

        let detach_from = {
            let mut state = self.state.borrow_mut();
            // The consumer may have cancelled from inside `receive`
            if state.coordinator.is_none() {
                return;
            }
            state.demand = requested;
            if requested.is_positive() {
                return;
            }
            state.coordinator.clone()
        };
        if let Some(coordinator) = detach_from {
            trace!(subscription = %self.id, "demand exhausted");
            coordinator.end_observing(self.id);
        }
    }

    fn on_error(&self, error: LiveQueryError) {
        let (consumer, coordinator) = {
            let mut state = self.state.borrow_mut();
            if !state.demand.is_positive() {
                return;
            }
            if let Some(coordinator) = state.coordinator.as_ref() {
                coordinator.context().assert_current("Subscription::on_error");
            }
            let (Some(consumer), Some(coordinator)) =
                (state.consumer.take(), state.coordinator.take())
            else {
                return;
            };
            state.demand = Demand::None;
            (consumer, coordinator)
        };
        debug!(context = %coordinator.context(), subscription = %self.id, error = %error, "subscription terminated by failure");
        consumer.receive_failure(error);
        coordinator.end_observing(self.id);
    }
}

/// Handle through which a consumer signals demand and cancels.
///
/// Dropping the handle without calling [`cancel`](Subscription::cancel) is
/// tolerated: the coordinator forgets the subscription on its next pass over
/// its active set.
pub struct Subscription<E: LiveQueryEngine> {
    core: Rc<SubscriptionCore<E>>,
}

impl<E: LiveQueryEngine> Subscription<E> {
    pub(crate) fn new(coordinator: Rc<Coordinator<E>>, consumer: Rc<dyn Consumer<E::Item>>) -> Self {
        let id = coordinator.next_subscription_id();
        debug!(context = %coordinator.context(), subscription = %id, query = %coordinator.query_name(), "subscription attached");
        Self {
            core: Rc::new(SubscriptionCore {
                id,
                state: RefCell::new(SubscriptionState {
                    demand: Demand::None,
                    consumer: Some(consumer),
                    coordinator: Some(coordinator),
                }),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.core.id
    }

    /// Ask for `amount` more results.
    ///
    /// Triggers the shared fetch if nothing has been fetched yet, or delivers
    /// the cached snapshot right away if it has. No-op once terminated.
    pub fn request(&self, amount: Demand) {
        self.core.request(amount);
    }

    /// Stop receiving results and release the consumer.
    ///
    /// Idempotent, and safe to call from inside the consumer's own callbacks.
    pub fn cancel(&self) {
        self.core.cancel();
    }

    /// Outstanding demand. Always [`Demand::None`] once terminated.
    #[must_use]
    pub fn demand(&self) -> Demand {
        self.core.demand()
    }

    /// Returns `true` after cancellation or a terminal failure.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.core.is_terminated()
    }
}

impl<E: LiveQueryEngine> fmt::Debug for Subscription<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.core.id)
            .field("demand", &self.demand())
            .field("terminated", &self.is_terminated())
            .finish()
    }
}
