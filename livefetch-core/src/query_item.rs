// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::Snapshot;
use livefetch_error::LiveQueryError;

/// One event observed on a live query: a snapshot, or the terminal failure.
#[derive(Debug, Clone)]
pub enum QueryItem<T> {
    /// The current result set
    Snapshot(Snapshot<T>),
    /// A failure that terminates the subscription
    Error(LiveQueryError),
}

impl<T> QueryItem<T> {
    #[must_use]
    pub const fn is_snapshot(&self) -> bool {
        matches!(self, Self::Snapshot(_))
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The snapshot, discarding an error.
    #[must_use]
    pub fn ok(self) -> Option<Snapshot<T>> {
        match self {
            Self::Snapshot(snapshot) => Some(snapshot),
            Self::Error(_) => None,
        }
    }

    /// # Errors
    ///
    /// Returns the carried failure for [`QueryItem::Error`].
    pub fn into_result(self) -> Result<Snapshot<T>, LiveQueryError> {
        match self {
            Self::Snapshot(snapshot) => Ok(snapshot),
            Self::Error(error) => Err(error),
        }
    }
}

impl<T: PartialEq> PartialEq for QueryItem<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Snapshot(a), Self::Snapshot(b)) => a == b,
            _ => false, // Errors are never equal
        }
    }
}

impl<T> From<Result<Snapshot<T>, LiveQueryError>> for QueryItem<T> {
    fn from(result: Result<Snapshot<T>, LiveQueryError>) -> Self {
        match result {
            Ok(snapshot) => Self::Snapshot(snapshot),
            Err(error) => Self::Error(error),
        }
    }
}
