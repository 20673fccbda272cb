//! The demand-driven publisher/subscriber contract.
//!
//! A [`Publisher`] hands each [`Subscriber`] exactly one [`Subscription`]
//! before any value. Values flow only up to the demand the subscriber has
//! requested so far, either through [`Subscription::request`] or through the
//! demand returned from [`Subscriber::receive`]. A single [`Completion`] ends
//! the stream.
//!
//! Publishers must invoke the three subscriber methods serially. The
//! subscription handle, by contrast, may be used from any thread.

use crate::demand::Demand;
use std::sync::Arc;

/// How a stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion<E> {
    /// The publisher delivered everything it had.
    Finished,
    /// The publisher failed.
    Failure(E),
}

impl<E> Completion<E> {
    /// Returns `true` for [`Completion::Finished`].
    #[inline]
    pub fn is_finished(&self) -> bool {
        matches!(self, Completion::Finished)
    }

    /// Maps the failure value.
    pub fn map_failure<F>(self, f: impl FnOnce(E) -> F) -> Completion<F> {
        match self {
            Completion::Finished => Completion::Finished,
            Completion::Failure(e) => Completion::Failure(f(e)),
        }
    }
}

/// Capability a subscriber uses to pull more values or stop the stream.
pub trait Subscription: Send + Sync {
    /// Requests `demand` further values. Requesting [`Demand::NONE`] is a
    /// no-op.
    fn request(&self, demand: Demand);

    /// Cancels the stream. Idempotent and terminal.
    fn cancel(&self);
}

/// Receiving end of the contract.
pub trait Subscriber: Send + Sync {
    /// Value type delivered by the publisher.
    type Input;
    /// Failure type carried by [`Completion::Failure`].
    type Failure;

    /// Delivered exactly once, before any value.
    ///
    /// The subscriber accepts by retaining `subscription` or rejects by
    /// cancelling it.
    fn receive_subscription(&self, subscription: Arc<dyn Subscription>);

    /// Delivers one value and returns the additional demand.
    fn receive(&self, input: Self::Input) -> Demand;

    /// Delivered at most once. No value follows it.
    fn receive_completion(&self, completion: Completion<Self::Failure>);
}

/// Shared, type-erased subscriber as publishers store it.
pub type SharedSubscriber<T, E> = Arc<dyn Subscriber<Input = T, Failure = E>>;

/// Source of values.
pub trait Publisher: Sized {
    /// Value type.
    type Output;
    /// Failure type. Use [`std::convert::Infallible`] for publishers that
    /// cannot fail.
    type Failure;

    /// Attaches `subscriber`, which then receives its subscription.
    fn subscribe(self, subscriber: SharedSubscriber<Self::Output, Self::Failure>);
}
