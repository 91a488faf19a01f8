// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Consume a live query as a [`Stream`] of [`QueryItem`]s.
//!
//! The stream owns an unlimited-demand subscription that forwards into an
//! unbounded channel. Dropping the stream drops the subscription; a terminal
//! failure yields one [`QueryItem::Error`] and then ends the stream.
//!
//! ## Example
//!
//! ```
//! use futures::StreamExt;
//! use livefetch::{EngineConfig, MemoryStore, Publisher, QueryItem, QuerySpec, SortDescriptor};
//!
//! # futures::executor::block_on(async {
//! let store = MemoryStore::with_rows(vec![2u32, 1]);
//! let query = QuerySpec::new("numbers").sort_by(SortDescriptor::ascending("n", |n: &u32| *n));
//! let publisher = Publisher::new(store.clone(), EngineConfig::new(query)).unwrap();
//!
//! let mut stream = publisher.stream();
//! store.insert(3);
//!
//! let first = stream.next().await.unwrap().ok().unwrap();
//! let second = stream.next().await.unwrap().ok().unwrap();
//! assert_eq!(first, vec![1, 2]);
//! assert_eq!(second, vec![1, 2, 3]);
//! # });
//! ```

use crate::publisher::Publisher;
use crate::subscription::Subscription;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::stream::Stream;
use futures::StreamExt;
use livefetch_core::{Consumer, Demand, LiveQueryEngine, LiveQueryError, QueryItem, Snapshot};
use std::pin::Pin;
use std::task::{Context, Poll};

struct ChannelConsumer<T> {
    sender: UnboundedSender<QueryItem<T>>,
}

impl<T> Consumer<T> for ChannelConsumer<T> {
    fn receive(&self, snapshot: Snapshot<T>) -> Demand {
        match self.sender.unbounded_send(QueryItem::Snapshot(snapshot)) {
            Ok(()) => Demand::Unlimited,
            Err(_) => Demand::None,
        }
    }

    fn receive_failure(&self, error: LiveQueryError) {
        let _ = self.sender.unbounded_send(QueryItem::Error(error));
        self.sender.close_channel();
    }
}

/// A [`Stream`] over the snapshots of a shared live query.
pub struct SnapshotStream<E: LiveQueryEngine> {
    receiver: UnboundedReceiver<QueryItem<E::Item>>,
    subscription: Subscription<E>,
}

impl<E: LiveQueryEngine> SnapshotStream<E> {
    pub(crate) fn attach(publisher: &Publisher<E>) -> Self {
        let (sender, receiver) = mpsc::unbounded();
        let subscription = publisher.attach(ChannelConsumer { sender });
        subscription.request(Demand::Unlimited);
        Self {
            receiver,
            subscription,
        }
    }

    /// The subscription feeding this stream.
    pub fn subscription(&self) -> &Subscription<E> {
        &self.subscription
    }

    /// Cancel the subscription. Items already queued are still yielded.
    pub fn cancel(&self) {
        self.subscription.cancel();
    }
}

impl<E: LiveQueryEngine> Stream for SnapshotStream<E> {
    type Item = QueryItem<E::Item>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_next_unpin(cx)
    }
}

// No field is structurally pinned.
impl<E: LiveQueryEngine> Unpin for SnapshotStream<E> {}
