// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// The ordered result set produced by one successful query execution.
///
/// One snapshot is fanned out to every subscription, so cloning only bumps a
/// reference count; the items themselves are never copied.
///
/// # Example
///
/// ```
/// use livefetch_core::Snapshot;
///
/// let snapshot = Snapshot::from(vec!["a", "b", "c"]);
/// let shared = snapshot.clone();
///
/// assert_eq!(shared.len(), 3);
/// assert_eq!(shared.first(), Some(&"a"));
/// assert_eq!(snapshot, shared);
/// ```
pub struct Snapshot<T> {
    items: Arc<[T]>,
}

impl<T> Snapshot<T> {
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Returns `true` if both snapshots share the same allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }
}

impl<T: Clone> Snapshot<T> {
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.items.to_vec()
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> Deref for Snapshot<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> From<Vec<T>> for Snapshot<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T> FromIterator<T> for Snapshot<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Snapshot<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: PartialEq> PartialEq for Snapshot<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq> Eq for Snapshot<T> {}

impl<T: PartialEq> PartialEq<Vec<T>> for Snapshot<T> {
    fn eq(&self, other: &Vec<T>) -> bool {
        *self.items == **other
    }
}

impl<T: fmt::Debug> fmt::Debug for Snapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self::empty()
    }
}
