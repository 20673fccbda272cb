//! Configuration for demand instrumentation.

use crate::demand::Demand;
use std::time::Duration;

/// Limits a [`DemandMonitor`](crate::DemandMonitor) checks every request
/// against. `None` disables a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemandLimits {
    /// Largest demand a single request may carry.
    ///
    /// Useful to catch a subscriber asking for unlimited demand.
    ///
    /// Default: unchecked
    pub max_demand: Option<Demand>,

    /// Largest total of all requests.
    ///
    /// Default: unchecked
    pub accumulated_demand: Option<Demand>,

    /// Shortest allowed gap between two requests.
    ///
    /// Default: unchecked
    pub min_interval: Option<Duration>,

    /// Panic with the violation message instead of only recording it.
    ///
    /// Default: `true` in debug builds, `false` in release builds
    pub panic_on_violation: bool,
}

impl Default for DemandLimits {
    fn default() -> Self {
        Self {
            max_demand: None,
            accumulated_demand: None,
            min_interval: None,
            panic_on_violation: cfg!(debug_assertions),
        }
    }
}

impl DemandLimits {
    /// One value per request, at most one request every 10ms.
    pub fn single_and_slow() -> Self {
        Self::default()
            .with_max_demand(Demand::ONE)
            .with_min_interval(Duration::from_millis(10))
    }

    /// Sets the per-request ceiling.
    pub fn with_max_demand(mut self, max: Demand) -> Self {
        self.max_demand = Some(max);
        self
    }

    /// Sets the total budget.
    pub fn with_accumulated_demand(mut self, budget: Demand) -> Self {
        self.accumulated_demand = Some(budget);
        self
    }

    /// Sets the minimum interval between requests.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = Some(interval);
        self
    }

    /// Chooses between panicking and recording on violation.
    pub fn with_panic_on_violation(mut self, panic: bool) -> Self {
        self.panic_on_violation = panic;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_and_slow_preset() {
        let limits = DemandLimits::single_and_slow();
        assert_eq!(limits.max_demand, Some(Demand::ONE));
        assert_eq!(limits.min_interval, Some(Duration::from_millis(10)));
        assert_eq!(limits.accumulated_demand, None);
    }

    #[test]
    fn test_builders() {
        let limits = DemandLimits::default()
            .with_accumulated_demand(Demand::max(3))
            .with_panic_on_violation(false);
        assert_eq!(limits.accumulated_demand, Some(Demand::max(3)));
        assert!(!limits.panic_on_violation);
        assert_eq!(limits.max_demand, None);
    }
}
