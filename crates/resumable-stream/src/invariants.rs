//! Debug assertion macros for stream driving invariants.
//!
//! They are only active in debug builds (`#[cfg(debug_assertions)]`), so
//! there is zero overhead in release builds.

// =============================================================================
// Delivery Within Demand
// =============================================================================

/// Assert that a value is only delivered after a unit of demand was taken.
///
/// **Invariant**: `deliver(value) → demand.take_one() succeeded`
///
/// Used in: `drive()` before `Subscriber::receive`
macro_rules! debug_assert_within_demand {
    ($taken:expr) => {
        debug_assert!(
            $taken,
            "stream driver delivered a value without outstanding demand"
        )
    };
}

// =============================================================================
// No Delivery After Cancel
// =============================================================================

/// Assert that nothing is delivered once the subscription was cancelled.
///
/// **Invariant**: `cancelled → no receive() and no receive_completion()`
///
/// Used in: `drive()` before every subscriber call
macro_rules! debug_assert_not_cancelled {
    ($cancelled:expr) => {
        debug_assert!(
            !$cancelled,
            "stream driver signalled a cancelled subscriber"
        )
    };
}

pub(crate) use debug_assert_not_cancelled;
pub(crate) use debug_assert_within_demand;
