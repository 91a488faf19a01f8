// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::fmt;
use core::ops::Add;

/// How many results a consumer is currently willing to receive.
///
/// A subscription forwards a result only while its demand is positive.
/// `Unlimited` is absorbing: adding to it, or adding it to anything, stays
/// `Unlimited`, and delivering under it never decrements.
///
/// # Example
///
/// ```
/// use livefetch_core::Demand;
///
/// let demand = Demand::None + Demand::max(2);
/// assert_eq!(demand, Demand::Finite(2));
/// assert!(demand.is_positive());
///
/// assert_eq!(demand + Demand::Unlimited, Demand::Unlimited);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Demand {
    /// Nothing requested.
    #[default]
    None,
    /// Up to `n` more results.
    Finite(usize),
    /// Every result, without backpressure.
    Unlimited,
}

impl Demand {
    /// Demand for at most `n` results. `max(0)` is equivalent to [`Demand::None`].
    #[must_use]
    pub const fn max(n: usize) -> Self {
        if n == 0 {
            Self::None
        } else {
            Self::Finite(n)
        }
    }

    /// Returns `true` if at least one more result may be delivered.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        match self {
            Self::None | Self::Finite(0) => false,
            Self::Finite(_) | Self::Unlimited => true,
        }
    }

    #[must_use]
    pub const fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }

    /// The finite amount, or `None` when unlimited.
    #[must_use]
    pub const fn count(&self) -> Option<usize> {
        match self {
            Self::None => Some(0),
            Self::Finite(n) => Some(*n),
            Self::Unlimited => None,
        }
    }
}

impl Add for Demand {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Unlimited, _) | (_, Self::Unlimited) => Self::Unlimited,
            (Self::None, other) | (other, Self::None) => other,
            (Self::Finite(a), Self::Finite(b)) => a.checked_add(b).map_or(Self::Unlimited, Self::Finite),
        }
    }
}

impl From<usize> for Demand {
    fn from(n: usize) -> Self {
        Self::max(n)
    }
}

impl fmt::Display for Demand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Finite(n) => write!(f, "{n}"),
            Self::Unlimited => write!(f, "unlimited"),
        }
    }
}
