//! A synchronous publisher over an iterator.

use crate::demand::Demand;
use crate::protocol::{Completion, Publisher, SharedSubscriber, Subscription};
use parking_lot::Mutex;
use std::convert::Infallible;
use std::iter::Peekable;
use std::sync::Arc;

/// Publishes the items of an iterator, strictly according to demand.
///
/// Values are delivered on the thread that requests them, possibly from
/// inside [`Subscription::request`]. Requests issued re-entrantly while a
/// value is being delivered only add demand; the outer delivery loop picks
/// them up, so the subscriber is never invoked concurrently. The stream
/// finishes as soon as the last item has been delivered.
#[derive(Debug, Clone)]
pub struct Sequence<I> {
    iter: I,
}

impl<I: Iterator> Sequence<I> {
    /// Creates a publisher over `items`.
    pub fn new<S>(items: S) -> Self
    where
        S: IntoIterator<IntoIter = I>,
    {
        Self {
            iter: items.into_iter(),
        }
    }
}

impl<I> Publisher for Sequence<I>
where
    I: Iterator + Send + 'static,
    I::Item: Send + 'static,
{
    type Output = I::Item;
    type Failure = Infallible;

    fn subscribe(self, subscriber: SharedSubscriber<I::Item, Infallible>) {
        let mut iter = self.iter.peekable();
        if iter.peek().is_none() {
            subscriber.receive_subscription(Arc::new(NoopSubscription));
            subscriber.receive_completion(Completion::Finished);
            return;
        }

        let subscription = Arc::new(SequenceSubscription {
            state: Mutex::new(SequenceState {
                iter,
                subscriber: Some(Arc::clone(&subscriber)),
                demand: Demand::NONE,
                emitting: false,
            }),
        });
        subscriber.receive_subscription(subscription);
    }
}

/// Subscription that ignores every request.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct NoopSubscription;

impl Subscription for NoopSubscription {
    fn request(&self, _demand: Demand) {}

    fn cancel(&self) {}
}

struct SequenceState<I: Iterator> {
    iter: Peekable<I>,
    // None once finished or cancelled
    subscriber: Option<SharedSubscriber<I::Item, Infallible>>,
    demand: Demand,
    emitting: bool,
}

struct SequenceSubscription<I: Iterator> {
    state: Mutex<SequenceState<I>>,
}

impl<I> SequenceSubscription<I>
where
    I: Iterator + Send,
    I::Item: Send,
{
    fn drain(&self) {
        loop {
            let (subscriber, item) = {
                let mut state = self.state.lock();
                let subscriber = match state.subscriber.clone() {
                    Some(subscriber) => subscriber,
                    None => {
                        state.emitting = false;
                        return;
                    }
                };
                if !state.demand.take_one() {
                    state.emitting = false;
                    return;
                }
                match state.iter.next() {
                    Some(item) => (subscriber, item),
                    None => {
                        state.emitting = false;
                        return;
                    }
                }
            };

            let additional = subscriber.receive(item);
            drop(subscriber);

            let finished = {
                let mut state = self.state.lock();
                state.demand += additional;
                if state.subscriber.is_some() && state.iter.peek().is_none() {
                    state.emitting = false;
                    state.subscriber.take()
                } else {
                    None
                }
            };

            if let Some(subscriber) = finished {
                tracing::trace!("sequence exhausted");
                subscriber.receive_completion(Completion::Finished);
                return;
            }
        }
    }
}

impl<I> Subscription for SequenceSubscription<I>
where
    I: Iterator + Send,
    I::Item: Send,
{
    fn request(&self, demand: Demand) {
        {
            let mut state = self.state.lock();
            if state.subscriber.is_none() {
                return;
            }
            state.demand += demand;
            if state.emitting || state.demand.is_none() {
                return;
            }
            state.emitting = true;
        }
        self.drain();
    }

    fn cancel(&self) {
        let subscriber = self.state.lock().subscriber.take();
        drop(subscriber);
    }
}
