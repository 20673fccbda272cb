//! Subscription lifecycle shared by the resumable subscribers.

use std::fmt;

/// Lifecycle of a subscriber with respect to its one subscription handle.
///
/// Transitions only move forward:
/// `AwaitingSubscription → Subscribed → Terminal`. A subscriber can also
/// jump straight to `Terminal` if the publisher completes before handing out
/// a subscription.
pub(crate) enum SubscriptionState<H> {
    AwaitingSubscription,
    Subscribed(H),
    Terminal,
}

impl<H> SubscriptionState<H> {
    /// Accepts `handle` if no subscription was received yet.
    ///
    /// Returns the handle back when it must be rejected: a second
    /// subscription, or one arriving after termination.
    pub(crate) fn subscribe(&mut self, handle: H) -> Result<(), H> {
        match self {
            SubscriptionState::AwaitingSubscription => {
                *self = SubscriptionState::Subscribed(handle);
                Ok(())
            }
            SubscriptionState::Subscribed(_) | SubscriptionState::Terminal => Err(handle),
        }
    }

    /// The current handle, only while subscribed.
    pub(crate) fn handle(&self) -> Option<&H> {
        match self {
            SubscriptionState::Subscribed(handle) => Some(handle),
            _ => None,
        }
    }

    /// Moves `Subscribed` to `Terminal`, yielding the released handle.
    ///
    /// Any other state is left untouched.
    pub(crate) fn cancel(&mut self) -> Option<H> {
        match std::mem::replace(self, SubscriptionState::Terminal) {
            SubscriptionState::Subscribed(handle) => Some(handle),
            previous => {
                *self = previous;
                None
            }
        }
    }

    /// Moves any state to `Terminal`.
    ///
    /// Returns `false` if the state was already terminal, so completion is
    /// handled at most once.
    pub(crate) fn terminate(&mut self) -> bool {
        !matches!(
            std::mem::replace(self, SubscriptionState::Terminal),
            SubscriptionState::Terminal
        )
    }

    pub(crate) fn status(&self) -> SubscriptionStatus {
        match self {
            SubscriptionState::AwaitingSubscription => SubscriptionStatus::AwaitingSubscription,
            SubscriptionState::Subscribed(_) => SubscriptionStatus::Subscribed,
            SubscriptionState::Terminal => SubscriptionStatus::Terminal,
        }
    }
}

/// Snapshot of a subscriber's lifecycle, without the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    /// No subscription received yet.
    AwaitingSubscription,
    /// Holding a live subscription.
    Subscribed,
    /// Finished, failed or cancelled.
    Terminal,
}

impl SubscriptionStatus {
    /// Returns `true` once the stream has ended for this subscriber.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubscriptionStatus::Terminal)
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubscriptionStatus::AwaitingSubscription => "awaiting subscription",
            SubscriptionStatus::Subscribed => "subscribed",
            SubscriptionStatus::Terminal => "terminal",
        };
        f.write_str(name)
    }
}

impl<H> fmt::Debug for SubscriptionState<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.status(), f)
    }
}
