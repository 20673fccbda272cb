//! Demand counts exchanged between subscribers and publishers.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign};

/// Number of further values a subscriber authorizes a publisher to deliver.
///
/// Finite demand is a plain count. `Unlimited` exists so that publishers and
/// instrumentation can represent an unbounded request; the resumable
/// subscribers in this crate never issue it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Demand {
    /// At most this many further values.
    Max(u64),
    /// No upper bound.
    Unlimited,
}

impl Demand {
    /// No further values. Returning this from `receive` pauses the stream.
    pub const NONE: Demand = Demand::Max(0);

    /// A single further value.
    pub const ONE: Demand = Demand::Max(1);

    /// Creates finite demand for `count` values.
    #[inline]
    pub const fn max(count: u64) -> Self {
        Demand::Max(count)
    }

    /// Returns `true` if no values are authorized.
    #[inline]
    pub const fn is_none(&self) -> bool {
        matches!(self, Demand::Max(0))
    }

    /// Returns `true` if the demand is unbounded.
    #[inline]
    pub const fn is_unlimited(&self) -> bool {
        matches!(self, Demand::Unlimited)
    }

    /// Returns the finite count, or `None` when unlimited.
    #[inline]
    pub const fn count(&self) -> Option<u64> {
        match self {
            Demand::Max(count) => Some(*count),
            Demand::Unlimited => None,
        }
    }

    /// Consumes one unit of demand, returning `false` if none was left.
    ///
    /// Unlimited demand is never exhausted.
    #[inline]
    pub fn take_one(&mut self) -> bool {
        match self {
            Demand::Unlimited => true,
            Demand::Max(0) => false,
            Demand::Max(count) => {
                *count -= 1;
                true
            }
        }
    }
}

impl Default for Demand {
    fn default() -> Self {
        Demand::NONE
    }
}

impl Add for Demand {
    type Output = Demand;

    /// Saturates to `Unlimited` on overflow.
    fn add(self, rhs: Demand) -> Demand {
        match (self, rhs) {
            (Demand::Max(a), Demand::Max(b)) => a.checked_add(b).map_or(Demand::Unlimited, Demand::Max),
            _ => Demand::Unlimited,
        }
    }
}

impl AddAssign for Demand {
    fn add_assign(&mut self, rhs: Demand) {
        *self = *self + rhs;
    }
}

impl PartialOrd for Demand {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Demand {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Demand::Max(a), Demand::Max(b)) => a.cmp(b),
            (Demand::Max(_), Demand::Unlimited) => Ordering::Less,
            (Demand::Unlimited, Demand::Max(_)) => Ordering::Greater,
            (Demand::Unlimited, Demand::Unlimited) => Ordering::Equal,
        }
    }
}

impl fmt::Display for Demand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Demand::Max(count) => write!(f, "max({count})"),
            Demand::Unlimited => f.write_str("unlimited"),
        }
    }
}
