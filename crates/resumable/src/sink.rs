//! A subscriber whose callback decides whether to keep pulling.

use crate::demand::Demand;
use crate::handle::{Resumable, ResumableHandle};
#[cfg(debug_assertions)]
use crate::invariants::{debug_assert_rejected_cancelled, debug_assert_single_demand};
use crate::protocol::{Completion, Publisher, Subscriber, Subscription};
use crate::state::{SubscriptionState, SubscriptionStatus};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type ValueHandler<T> = Box<dyn FnMut(T) -> bool + Send>;
type CompletionHandler<E> = Box<dyn FnOnce(Completion<E>) + Send>;

/// Subscriber that forwards every value to a predicate.
///
/// The predicate's return value is the pull decision: `true` requests the
/// next value right away, `false` pauses the stream until
/// [`resume`](Resumable::resume) is called. At most one value is ever
/// outstanding.
///
/// # Pending pull
///
/// A single flag records whether a pull is outstanding. It is set when a
/// value is requested and overwritten with the predicate's result on every
/// delivery, so `resume()` while a pull is pending never requests twice.
pub struct ResumableSink<T, E> {
    state: Mutex<SubscriptionState<Arc<dyn Subscription>>>,
    pending_pull: AtomicBool,
    receive_value: Mutex<ValueHandler<T>>,
    receive_completion: Mutex<Option<CompletionHandler<E>>>,
}

impl<T, E> ResumableSink<T, E> {
    /// Creates an unattached sink.
    ///
    /// Prefer [`attach_sink`], which subscribes it and wraps it in a
    /// [`ResumableHandle`].
    pub fn new<V, C>(receive_value: V, receive_completion: C) -> Self
    where
        V: FnMut(T) -> bool + Send + 'static,
        C: FnOnce(Completion<E>) + Send + 'static,
    {
        Self {
            state: Mutex::new(SubscriptionState::AwaitingSubscription),
            pending_pull: AtomicBool::new(false),
            receive_value: Mutex::new(Box::new(receive_value)),
            receive_completion: Mutex::new(Some(Box::new(receive_completion))),
        }
    }

    /// Returns `true` while a pull is outstanding.
    pub fn is_pull_pending(&self) -> bool {
        self.pending_pull.load(Ordering::Acquire)
    }

    fn subscription(&self) -> Option<Arc<dyn Subscription>> {
        self.state.lock().handle().cloned()
    }
}

impl<T, E> Subscriber for ResumableSink<T, E> {
    type Input = T;
    type Failure = E;

    fn receive_subscription(&self, subscription: Arc<dyn Subscription>) {
        let accepted = self.state.lock().subscribe(Arc::clone(&subscription));
        match accepted {
            Ok(()) => {
                // initial demand does not go through the resume gate
                self.pending_pull.store(true, Ordering::Release);
                tracing::trace!("resumable sink subscribed, requesting first value");
                subscription.request(Demand::ONE);
            }
            Err(rejected) => {
                tracing::debug!("resumable sink rejected a second subscription");
                rejected.cancel();

                #[cfg(debug_assertions)]
                debug_assert_rejected_cancelled!(true, true);
            }
        }
    }

    fn receive(&self, input: T) -> Demand {
        if self.state.lock().handle().is_none() {
            tracing::trace!("resumable sink dropped a value outside of a subscription");
            return Demand::NONE;
        }

        let pull = {
            let mut receive_value = self.receive_value.lock();
            (*receive_value)(input)
        };
        self.pending_pull.store(pull, Ordering::Release);

        let demand = if pull { Demand::ONE } else { Demand::NONE };

        #[cfg(debug_assertions)]
        debug_assert_single_demand!(demand);

        demand
    }

    fn receive_completion(&self, completion: Completion<E>) {
        if !self.state.lock().terminate() {
            return;
        }
        tracing::debug!(finished = completion.is_finished(), "resumable sink completed");

        let handler = self.receive_completion.lock().take();
        if let Some(handler) = handler {
            handler(completion);
        }
    }
}

impl<T, E> Resumable for ResumableSink<T, E> {
    fn resume(&self) {
        let subscription = match self.subscription() {
            Some(subscription) => subscription,
            None => return,
        };

        if self
            .pending_pull
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        tracing::trace!("resumable sink resumed");
        subscription.request(Demand::ONE);
    }

    fn cancel(&self) {
        let released = self.state.lock().cancel();
        if let Some(subscription) = released {
            tracing::debug!("resumable sink cancelled");
            subscription.cancel();

            let handler = self.receive_completion.lock().take();
            drop(handler);
        }
    }

    fn status(&self) -> SubscriptionStatus {
        self.state.lock().status()
    }
}

impl<T, E> fmt::Debug for ResumableSink<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResumableSink")
            .field("status", &self.state.lock().status())
            .field("pending_pull", &self.is_pull_pending())
            .finish_non_exhaustive()
    }
}

/// Attaches a [`ResumableSink`] to `publisher`.
///
/// `receive_value` returns whether the next value should be pulled right
/// away. `receive_completion` runs once when the publisher finishes or
/// fails; it does not run after cancellation.
///
/// # Example
///
/// ```
/// use resumable_rs::{attach_sink, Sequence};
/// use std::sync::{Arc, Mutex};
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink_seen = Arc::clone(&seen);
/// let handle = attach_sink(
///     Sequence::new(1..=3),
///     move |value| {
///         sink_seen.lock().unwrap().push(value);
///         false
///     },
///     |_| {},
/// );
///
/// assert_eq!(*seen.lock().unwrap(), vec![1]);
/// handle.resume();
/// assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
/// ```
pub fn attach_sink<P, V, C>(publisher: P, receive_value: V, receive_completion: C) -> ResumableHandle
where
    P: Publisher,
    P::Output: 'static,
    P::Failure: 'static,
    V: FnMut(P::Output) -> bool + Send + 'static,
    C: FnOnce(Completion<P::Failure>) + Send + 'static,
{
    let sink = Arc::new(ResumableSink::new(receive_value, receive_completion));
    publisher.subscribe(Arc::clone(&sink) as Arc<dyn Subscriber<Input = P::Output, Failure = P::Failure>>);
    ResumableHandle::new(sink)
}
