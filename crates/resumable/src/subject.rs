//! A hot publisher fed imperatively by the caller.

use crate::demand::Demand;
use crate::protocol::{Completion, Publisher, SharedSubscriber, Subscription};
use crate::sequence::NoopSubscription;
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};

/// Broadcasts values passed to [`send`](PassthroughSubject::send) to every
/// current subscriber that has outstanding demand.
///
/// A subscriber without demand misses the value; nothing is buffered. This
/// is what makes a paused resumable subscriber skip intermediate values and
/// observe only the ones sent after it resumes.
///
/// `send` and `send_completion` must be called serially, and not from
/// inside a subscriber callback.
pub struct PassthroughSubject<T, E> {
    inner: Arc<SubjectInner<T, E>>,
}

struct SubjectInner<T, E> {
    state: Mutex<SubjectState<T, E>>,
}

struct SubjectState<T, E> {
    subscriptions: Vec<Arc<SubjectSubscription<T, E>>>,
    completion: Option<Completion<E>>,
}

struct SubjectSubscription<T, E> {
    subject: Weak<SubjectInner<T, E>>,
    entry: Mutex<SubjectEntry<T, E>>,
}

struct SubjectEntry<T, E> {
    subscriber: Option<SharedSubscriber<T, E>>,
    demand: Demand,
}

impl<T, E> PassthroughSubject<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Creates a subject without subscribers.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SubjectInner {
                state: Mutex::new(SubjectState {
                    subscriptions: Vec::new(),
                    completion: None,
                }),
            }),
        }
    }

    /// Delivers `value` to every subscriber with outstanding demand.
    ///
    /// Returns how many subscribers received it. Ignored after completion.
    pub fn send(&self, value: T) -> usize {
        let subscriptions = {
            let state = self.inner.state.lock();
            if state.completion.is_some() {
                return 0;
            }
            state.subscriptions.clone()
        };

        let mut delivered = 0;
        for subscription in subscriptions {
            if subscription.deliver(value.clone()) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Ends the stream for every current and future subscriber.
    pub fn send_completion(&self, completion: Completion<E>) {
        let subscriptions = {
            let mut state = self.inner.state.lock();
            if state.completion.is_some() {
                return;
            }
            state.completion = Some(completion.clone());
            std::mem::take(&mut state.subscriptions)
        };

        for subscription in subscriptions {
            let subscriber = subscription.entry.lock().subscriber.take();
            if let Some(subscriber) = subscriber {
                subscriber.receive_completion(completion.clone());
            }
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.state.lock().subscriptions.len()
    }
}

impl<T, E> Default for PassthroughSubject<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Clone for PassthroughSubject<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> fmt::Debug for PassthroughSubject<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("PassthroughSubject")
            .field("subscribers", &state.subscriptions.len())
            .field("completed", &state.completion.is_some())
            .finish()
    }
}

impl<T, E> Publisher for PassthroughSubject<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    type Output = T;
    type Failure = E;

    fn subscribe(self, subscriber: SharedSubscriber<T, E>) {
        let subscription = {
            let mut state = self.inner.state.lock();
            match &state.completion {
                Some(completion) => Err(completion.clone()),
                None => {
                    let subscription = Arc::new(SubjectSubscription {
                        subject: Arc::downgrade(&self.inner),
                        entry: Mutex::new(SubjectEntry {
                            subscriber: Some(Arc::clone(&subscriber)),
                            demand: Demand::NONE,
                        }),
                    });
                    state.subscriptions.push(Arc::clone(&subscription));
                    Ok(subscription)
                }
            }
        };

        match subscription {
            Ok(subscription) => subscriber.receive_subscription(subscription),
            Err(completion) => {
                subscriber.receive_subscription(Arc::new(NoopSubscription));
                subscriber.receive_completion(completion);
            }
        }
    }
}

impl<T, E> SubjectSubscription<T, E> {
    /// Hands `value` to the subscriber if it has demand.
    fn deliver(&self, value: T) -> bool {
        let subscriber = {
            let mut entry = self.entry.lock();
            match entry.subscriber.clone() {
                Some(subscriber) if entry.demand.take_one() => subscriber,
                _ => return false,
            }
        };

        let additional = subscriber.receive(value);
        self.entry.lock().demand += additional;
        true
    }
}

impl<T, E> Subscription for SubjectSubscription<T, E>
where
    T: Send,
    E: Send,
{
    fn request(&self, demand: Demand) {
        let mut entry = self.entry.lock();
        if entry.subscriber.is_some() {
            entry.demand += demand;
        }
    }

    fn cancel(&self) {
        let subscriber = self.entry.lock().subscriber.take();
        if subscriber.is_none() {
            return;
        }
        drop(subscriber);

        if let Some(subject) = self.subject.upgrade() {
            subject
                .state
                .lock()
                .subscriptions
                .retain(|subscription| !std::ptr::eq(Arc::as_ptr(subscription), self));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Subscriber;
    use std::convert::Infallible;

    struct Recorder {
        per_value: Demand,
        values: Mutex<Vec<u8>>,
        completion: Mutex<Option<Completion<Infallible>>>,
        subscription: Mutex<Option<Arc<dyn Subscription>>>,
    }

    impl Recorder {
        fn new(per_value: Demand) -> Arc<Self> {
            Arc::new(Self {
                per_value,
                values: Mutex::new(Vec::new()),
                completion: Mutex::new(None),
                subscription: Mutex::new(None),
            })
        }
    }

    impl Subscriber for Recorder {
        type Input = u8;
        type Failure = Infallible;

        fn receive_subscription(&self, subscription: Arc<dyn Subscription>) {
            subscription.request(Demand::ONE);
            *self.subscription.lock() = Some(subscription);
        }

        fn receive(&self, input: u8) -> Demand {
            self.values.lock().push(input);
            self.per_value
        }

        fn receive_completion(&self, completion: Completion<Infallible>) {
            *self.completion.lock() = Some(completion);
        }
    }

    #[test]
    fn test_values_without_demand_are_dropped() {
        let subject = PassthroughSubject::<u8, Infallible>::new();
        let recorder = Recorder::new(Demand::NONE);
        subject.clone().subscribe(recorder.clone());

        assert_eq!(subject.send(1), 1);
        assert_eq!(subject.send(2), 0);
        assert_eq!(*recorder.values.lock(), vec![1]);

        let subscription = recorder.subscription.lock().clone().unwrap();
        subscription.request(Demand::ONE);
        subject.send(3);
        assert_eq!(*recorder.values.lock(), vec![1, 3]);
    }

    #[test]
    fn test_completion_reaches_late_subscribers() {
        let subject = PassthroughSubject::<u8, Infallible>::new();
        subject.send_completion(Completion::Finished);

        let recorder = Recorder::new(Demand::ONE);
        subject.clone().subscribe(recorder.clone());
        assert_eq!(*recorder.completion.lock(), Some(Completion::Finished));
        assert_eq!(subject.send(1), 0);
    }

    #[test]
    fn test_cancel_removes_subscription() {
        let subject = PassthroughSubject::<u8, Infallible>::new();
        let recorder = Recorder::new(Demand::ONE);
        subject.clone().subscribe(recorder.clone());
        assert_eq!(subject.subscriber_count(), 1);

        let subscription = recorder.subscription.lock().clone().unwrap();
        subscription.cancel();
        subscription.cancel();
        assert_eq!(subject.subscriber_count(), 0);
        assert_eq!(subject.send(1), 0);
    }
}
