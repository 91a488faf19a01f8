// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The fetch-state machine shared by every subscription of one coordinator.
//!
//! ```text
//!              trigger              Succeeded
//! NotFetched ──────────► InProgress ──────────► Fetched
//!     ▲                     │  ▲                   │
//!     └──── Failed ─────────┘  └───── trigger ─────┘
//! ```
//!
//! Transitions only happen through [`FetchStatus::trigger`] and
//! [`FetchStatus::complete`], so a status can never jump from `NotFetched` to
//! `Fetched`, and a second fetch can never start while one is in flight.

use core::fmt;

/// Whether the shared query has run, is running, or has a cached result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FetchStatus {
    /// No successful fetch yet, or the last one failed.
    #[default]
    NotFetched,
    /// A fetch is executing.
    InProgress,
    /// The last fetch succeeded; the engine holds its snapshot.
    Fetched,
}

/// Result of a fetch, as far as the state machine is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Succeeded,
    Failed,
}

impl FetchStatus {
    /// Start a fetch.
    ///
    /// Returns the next status, or `None` when a fetch is already in flight and
    /// must not be started again.
    #[must_use]
    pub const fn trigger(self) -> Option<Self> {
        match self {
            Self::NotFetched | Self::Fetched => Some(Self::InProgress),
            Self::InProgress => None,
        }
    }

    /// Resolve the in-flight fetch.
    ///
    /// Completing a status that is not `InProgress` leaves it unchanged.
    #[must_use]
    pub const fn complete(self, outcome: FetchOutcome) -> Self {
        match (self, outcome) {
            (Self::InProgress, FetchOutcome::Succeeded) => Self::Fetched,
            (Self::InProgress, FetchOutcome::Failed) => Self::NotFetched,
            (Self::NotFetched, _) => Self::NotFetched,
            (Self::Fetched, _) => Self::Fetched,
        }
    }

    #[must_use]
    pub const fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched)
    }

    #[must_use]
    pub const fn is_in_progress(&self) -> bool {
        matches!(self, Self::InProgress)
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFetched => write!(f, "not fetched"),
            Self::InProgress => write!(f, "in progress"),
            Self::Fetched => write!(f, "fetched"),
        }
    }
}
