// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]
//! Error types for the livefetch shared live-query library
//!
//! This crate defines the root [`LiveQueryError`] type. It covers the two
//! failure families a shared live query can hit:
//!
//! - **Configuration errors**, detected when a publisher is built (for example a
//!   query without a deterministic ordering).
//! - **Fetch errors**, raised by the query engine while executing the query and
//!   fanned out to every interested subscription as a terminal event.
//!
//! # Examples
//!
//! ```
//! use livefetch_error::{LiveQueryError, Result};
//!
//! fn run_query() -> Result<Vec<u32>> {
//!     Err(LiveQueryError::store_unavailable("connection closed"))
//! }
//!
//! assert!(run_query().unwrap_err().is_retryable());
//! ```

/// Root error type for all livefetch operations
///
/// A single fetch failure is broadcast to many subscriptions, so this type is
/// [`Clone`]. Wrapped user errors degrade to their message when cloned.
#[derive(Debug, thiserror::Error)]
pub enum LiveQueryError {
    /// The query has no sort descriptor
    ///
    /// Change diffing relies on a stable order, so a query without one is
    /// rejected when the publisher is constructed.
    #[error("Query '{query}' has no sort descriptor; a deterministic ordering is required")]
    MissingSortOrder {
        /// Name of the offending query
        query: String,
    },

    /// The query itself is malformed
    #[error("Invalid query: {message}")]
    InvalidQuery {
        /// Description of what is wrong with the query
        message: String,
    },

    /// The backing store could not be reached
    ///
    /// This is the only failure that may succeed if the query is triggered again.
    #[error("Store unavailable: {reason}")]
    StoreUnavailable {
        /// Why the store is unavailable
        reason: String,
    },

    /// Executing the query failed
    #[error("Fetch failed: {context}")]
    FetchFailed {
        /// Details about the failed execution
        context: String,
    },

    /// Custom error from engine or consumer code
    #[error("User error: {0}")]
    UserError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LiveQueryError {
    /// Create a missing-ordering configuration error for the named query
    pub fn missing_sort_order(query: impl Into<String>) -> Self {
        Self::MissingSortOrder {
            query: query.into(),
        }
    }

    /// Create an invalid query error with the given message
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Create a store unavailable error with the given reason
    pub fn store_unavailable(reason: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a fetch error with the given context
    pub fn fetch_failed(context: impl Into<String>) -> Self {
        Self::FetchFailed {
            context: context.into(),
        }
    }

    /// Wrap a user error
    pub fn user_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UserError(Box::new(error))
    }

    /// Check if triggering the query again could succeed
    ///
    /// Nothing retries automatically; this only informs the caller deciding
    /// whether an explicit refresh is worthwhile.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }

    /// Check if this error was detected while configuring, not fetching
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingSortOrder { .. })
    }
}

/// Specialized Result type for livefetch operations
///
/// # Examples
///
/// ```
/// use livefetch_error::Result;
///
/// fn count() -> Result<usize> {
///     Ok(3)
/// }
/// ```
pub type Result<T> = std::result::Result<T, LiveQueryError>;

/// Extension trait for converting foreign errors into `LiveQueryError`
///
/// Implemented for every `std::error::Error + Send + Sync + 'static`.
pub trait IntoLiveQueryError {
    /// Convert this error into a `LiveQueryError::FetchFailed` carrying the given context
    fn into_live_query_error(self, context: &str) -> LiveQueryError;

    /// Convert this error into a `LiveQueryError::UserError`
    fn into_live_query(self) -> LiveQueryError
    where
        Self: Sized;
}

impl<E: std::error::Error + Send + Sync + 'static> IntoLiveQueryError for E {
    fn into_live_query_error(self, context: &str) -> LiveQueryError {
        if context.is_empty() {
            return LiveQueryError::user_error(self);
        }
        LiveQueryError::fetch_failed(format!("{context}: {self}"))
    }

    fn into_live_query(self) -> LiveQueryError {
        LiveQueryError::user_error(self)
    }
}

/// Helper trait for adding context to `Result`s
pub trait ResultExt<T> {
    /// Add context to an error
    ///
    /// # Errors
    /// Returns `Err(LiveQueryError)` if the underlying result is `Err`.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context to an error using a closure (lazy evaluation)
    ///
    /// # Errors
    /// Returns `Err(LiveQueryError)` if the underlying result is `Err`.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<LiveQueryError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| wrap_with_context(e.into(), context.into()))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| wrap_with_context(e.into(), f()))
    }
}

// Only opaque user errors are folded into the context; typed variants keep their shape.
fn wrap_with_context(error: LiveQueryError, context: String) -> LiveQueryError {
    match error {
        LiveQueryError::UserError(inner) => LiveQueryError::FetchFailed {
            context: format!("{context}: {inner}"),
        },
        other => other,
    }
}

impl Clone for LiveQueryError {
    fn clone(&self) -> Self {
        match self {
            Self::MissingSortOrder { query } => Self::MissingSortOrder {
                query: query.clone(),
            },
            Self::InvalidQuery { message } => Self::InvalidQuery {
                message: message.clone(),
            },
            Self::StoreUnavailable { reason } => Self::StoreUnavailable {
                reason: reason.clone(),
            },
            Self::FetchFailed { context } => Self::FetchFailed {
                context: context.clone(),
            },
            // The boxed source cannot be cloned, keep its message
            Self::UserError(e) => Self::FetchFailed {
                context: format!("User error: {e}"),
            },
        }
    }
}
