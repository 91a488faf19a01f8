// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Query descriptions: what to select and, mandatorily, how to order it.
//!
//! Live updates are diffed against the previous snapshot, which only works if
//! the order of the result set is stable. A [`QuerySpec`] without at least one
//! [`SortDescriptor`] is therefore rejected by [`QuerySpec::validate`].
//!
//! # Example
//!
//! ```
//! use livefetch_core::{QuerySpec, SortDescriptor};
//!
//! type Row = (String, u32);
//!
//! let query = QuerySpec::<Row>::new("adults")
//!     .filter(|(_, age)| *age >= 18)
//!     .sort_by(SortDescriptor::descending("age", |(_, age): &Row| *age))
//!     .sort_by(SortDescriptor::ascending("name", |(name, _): &Row| name.clone()));
//!
//! assert!(query.validate().is_ok());
//!
//! let rows = vec![
//!     ("Zoe".to_string(), 30),
//!     ("Tim".to_string(), 12),
//!     ("Ann".to_string(), 30),
//! ];
//! let resolved = query.resolve(rows.iter());
//! assert_eq!(resolved[0].0, "Ann");
//! assert_eq!(resolved[1].0, "Zoe");
//! assert_eq!(resolved.len(), 2);
//! ```

use livefetch_error::{LiveQueryError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

type Predicate<T> = Rc<dyn Fn(&T) -> bool>;
type Comparator<T> = Rc<dyn Fn(&T, &T) -> Ordering>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One ordering key of a query.
pub struct SortDescriptor<T> {
    field: String,
    direction: SortDirection,
    compare: Comparator<T>,
}

impl<T: 'static> SortDescriptor<T> {
    /// Order by `key`, smallest first.
    pub fn ascending<K, F>(field: impl Into<String>, key: F) -> Self
    where
        K: Ord + 'static,
        F: Fn(&T) -> K + 'static,
    {
        Self::by_key(field.into(), SortDirection::Ascending, key)
    }

    /// Order by `key`, largest first.
    pub fn descending<K, F>(field: impl Into<String>, key: F) -> Self
    where
        K: Ord + 'static,
        F: Fn(&T) -> K + 'static,
    {
        Self::by_key(field.into(), SortDirection::Descending, key)
    }

    fn by_key<K, F>(field: String, direction: SortDirection, key: F) -> Self
    where
        K: Ord + 'static,
        F: Fn(&T) -> K + 'static,
    {
        Self {
            field,
            direction,
            compare: Rc::new(move |a: &T, b: &T| key(a).cmp(&key(b))),
        }
    }
}

impl<T> SortDescriptor<T> {
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub const fn direction(&self) -> SortDirection {
        self.direction
    }

    #[must_use]
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        let ordering = (self.compare)(a, b);
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

impl<T> Clone for SortDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone(),
            direction: self.direction,
            compare: Rc::clone(&self.compare),
        }
    }
}

impl<T> fmt::Debug for SortDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortDescriptor")
            .field("field", &self.field)
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}

/// A filtered, ordered, optionally limited selection over a set of rows.
pub struct QuerySpec<T> {
    name: String,
    filter: Option<Predicate<T>>,
    sort: Vec<SortDescriptor<T>>,
    limit: Option<usize>,
}

impl<T> QuerySpec<T> {
    /// An unfiltered, unordered query. Add at least one sort descriptor before use.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filter: None,
            sort: Vec::new(),
            limit: None,
        }
    }

    /// Keep only rows matching `predicate`. Replaces any previous filter.
    #[must_use]
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.filter = Some(Rc::new(predicate));
        self
    }

    /// Append an ordering key. Earlier keys take precedence; later ones break ties.
    #[must_use]
    pub fn sort_by(mut self, descriptor: SortDescriptor<T>) -> Self {
        self.sort.push(descriptor);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn sort_descriptors(&self) -> &[SortDescriptor<T>] {
        &self.sort
    }

    #[must_use]
    pub const fn max_results(&self) -> Option<usize> {
        self.limit
    }

    /// Check that the query has a deterministic ordering.
    ///
    /// # Errors
    ///
    /// Returns [`LiveQueryError::MissingSortOrder`] if no sort descriptor was given.
    pub fn validate(&self) -> Result<()> {
        if self.sort.is_empty() {
            return Err(LiveQueryError::missing_sort_order(&self.name));
        }
        Ok(())
    }

    #[must_use]
    pub fn matches(&self, row: &T) -> bool {
        self.filter.as_ref().map_or(true, |predicate| predicate(row))
    }

    /// Compare two rows using every sort descriptor in order.
    #[must_use]
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        self.sort
            .iter()
            .map(|descriptor| descriptor.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Filter, sort and limit `rows`.
    ///
    /// The sort is stable, so rows equal under every descriptor keep their
    /// insertion order.
    pub fn resolve<'a, I>(&self, rows: I) -> Vec<T>
    where
        T: Clone + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut selected: Vec<T> = rows
            .into_iter()
            .filter(|row| self.matches(row))
            .cloned()
            .collect();
        selected.sort_by(|a, b| self.compare(a, b));
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

impl<T> Clone for QuerySpec<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            filter: self.filter.clone(),
            sort: self.sort.clone(),
            limit: self.limit,
        }
    }
}

impl<T> fmt::Debug for QuerySpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySpec")
            .field("name", &self.name)
            .field("filtered", &self.filter.is_some())
            .field("sort", &self.sort)
            .field("limit", &self.limit)
            .finish()
    }
}
