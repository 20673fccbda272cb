//! Error types for demand instrumentation.

use crate::demand::Demand;
use std::time::Duration;
use thiserror::Error;

/// A request observed by a [`DemandMonitor`](crate::DemandMonitor) that
/// broke one of its [`DemandLimits`](crate::DemandLimits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DemandViolation {
    /// A single request was larger than the configured ceiling.
    #[error("requested {requested} exceeds the maximum demand {max}")]
    MaxDemandExceeded { requested: Demand, max: Demand },

    /// The sum of all requests went over the configured budget.
    #[error("accumulated demand {total} exceeds the budget {budget}")]
    BudgetExceeded { total: Demand, budget: Demand },

    /// A request followed the previous one too quickly.
    #[error("request arrived {elapsed:?} after the previous one, minimum interval is {min_interval:?}")]
    TooFrequent {
        elapsed: Duration,
        min_interval: Duration,
    },
}

impl DemandViolation {
    /// Returns `true` if the violation is about how much was requested.
    #[inline]
    pub fn is_size_violation(&self) -> bool {
        matches!(self, Self::MaxDemandExceeded { .. } | Self::BudgetExceeded { .. })
    }

    /// Returns `true` if the violation is about when it was requested.
    #[inline]
    pub fn is_timing_violation(&self) -> bool {
        matches!(self, Self::TooFrequent { .. })
    }
}
