//! Debug assertion macros for the resumable subscriber invariants.
//!
//! They are only active in debug builds (`#[cfg(debug_assertions)]`), so
//! there is zero overhead in release builds.

// =============================================================================
// Single outstanding pull
// =============================================================================

/// Assert that a resumable subscriber never asks for more than one value at
/// a time.
///
/// **Invariant**: `demand ≤ max(1)` for every request and every demand
/// returned from `receive`
///
/// Used in: `ResumableSink`, `ResumableAssign`
macro_rules! debug_assert_single_demand {
    ($demand:expr) => {
        debug_assert!(
            $demand <= $crate::Demand::ONE,
            "single-demand invariant violated: issued {} while at most max(1) is allowed",
            $demand
        )
    };
}

// =============================================================================
// Terminal releases resources
// =============================================================================

/// Assert that reaching `Terminal` released the write target.
///
/// **Invariant**: `status == Terminal → target.is_none()`
///
/// Used in: `ResumableAssign::cancel()`, `ResumableAssign::receive_completion()`
macro_rules! debug_assert_target_released {
    ($terminal:expr, $released:expr) => {
        debug_assert!(
            !$terminal || $released,
            "terminal subscriber still holds its write target"
        )
    };
}

// =============================================================================
// At-most-once subscription
// =============================================================================

/// Assert that a rejected subscription was cancelled rather than kept.
///
/// **Invariant**: `second subscription → subscription.cancel()`
///
/// Used in: `receive_subscription()` of both resumable subscribers
macro_rules! debug_assert_rejected_cancelled {
    ($rejected:expr, $cancelled:expr) => {
        debug_assert!(
            !$rejected || $cancelled,
            "rejected subscription was not cancelled"
        )
    };
}

pub(crate) use debug_assert_rejected_cancelled;
pub(crate) use debug_assert_single_demand;
pub(crate) use debug_assert_target_released;
