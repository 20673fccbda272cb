//! Task that pulls a stream on behalf of one subscriber.
//!
//! The driver polls the stream only while the subscriber holds demand, so a
//! paused subscriber leaves the stream untouched. Cancellation wakes the
//! driver even while it is waiting on the stream.

use crate::config::StreamConfig;
#[cfg(debug_assertions)]
use crate::invariants::{debug_assert_not_cancelled, debug_assert_within_demand};
use futures_core::Stream;
use parking_lot::Mutex;
use resumable_rs::{Completion, Demand, SharedSubscriber, Subscription};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio_stream::StreamExt;

/// Subscription handed to subscribers of a driven stream.
pub(crate) struct DriverSubscription {
    demand: Mutex<Demand>,
    cancelled: AtomicBool,
    wake: Notify,
}

impl DriverSubscription {
    pub(crate) fn new() -> Self {
        Self {
            demand: Mutex::new(Demand::NONE),
            cancelled: AtomicBool::new(false),
            wake: Notify::new(),
        }
    }

    #[inline]
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Adds demand without waking the driver.
    fn add(&self, demand: Demand) {
        if !demand.is_none() {
            *self.demand.lock() += demand;
        }
    }

    fn take_one(&self) -> bool {
        self.demand.lock().take_one()
    }
}

impl Subscription for DriverSubscription {
    fn request(&self, demand: Demand) {
        if demand.is_none() || self.is_cancelled() {
            return;
        }
        self.add(demand);
        self.wake.notify_one();
    }

    fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            tracing::debug!("stream subscription cancelled");
            self.wake.notify_one();
        }
    }
}

impl fmt::Debug for DriverSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverSubscription")
            .field("demand", &*self.demand.lock())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Hands `subscriber` its subscription and spawns the task driving `stream`.
///
/// The subscription is delivered on the calling thread, so the subscriber
/// is already subscribed when this returns and a cancel issued right after
/// attaching reaches the driver.
pub(crate) fn spawn_driver<S, T, E, F>(
    runtime: &Handle,
    stream: S,
    subscriber: SharedSubscriber<T, E>,
    config: StreamConfig,
    split: F,
) where
    S: Stream + Send + 'static,
    S::Item: Send,
    T: Send + 'static,
    E: Send + 'static,
    F: FnMut(S::Item) -> Result<T, E> + Send + 'static,
{
    let subscription = Arc::new(DriverSubscription::new());
    subscriber.receive_subscription(Arc::clone(&subscription) as Arc<dyn Subscription>);
    if subscription.is_cancelled() {
        tracing::debug!("stream subscription rejected, driver not started");
        return;
    }
    runtime.spawn(drive(stream, subscriber, subscription, config, split));
}

/// Drives `stream` into `subscriber` until it ends or is cancelled.
///
/// `split` separates values from failures; an `Err` ends the stream with
/// [`Completion::Failure`].
async fn drive<S, T, E, F>(
    stream: S,
    subscriber: SharedSubscriber<T, E>,
    subscription: Arc<DriverSubscription>,
    config: StreamConfig,
    mut split: F,
) where
    S: Stream,
    F: FnMut(S::Item) -> Result<T, E>,
{
    tracing::debug!("stream driver started");

    tokio::pin!(stream);
    let yield_every = config.yield_every.max(1);
    let mut delivered = 0usize;

    loop {
        // park until the subscriber asks for a value
        loop {
            if subscription.is_cancelled() {
                tracing::debug!(delivered, "stream driver stopped by cancel");
                return;
            }
            if subscription.take_one() {
                break;
            }
            subscription.wake.notified().await;
        }

        #[cfg(debug_assertions)]
        debug_assert_within_demand!(true);

        let next = loop {
            tokio::select! {
                biased;
                () = subscription.wake.notified() => {
                    if subscription.is_cancelled() {
                        tracing::debug!(delivered, "stream driver stopped by cancel");
                        return;
                    }
                }
                item = stream.next() => break item,
            }
        };

        let cancelled = subscription.is_cancelled();
        if cancelled {
            tracing::debug!(delivered, "stream driver stopped by cancel");
            return;
        }

        #[cfg(debug_assertions)]
        debug_assert_not_cancelled!(cancelled);

        let value = match next.map(&mut split) {
            Some(Ok(value)) => value,
            Some(Err(failure)) => {
                tracing::debug!(delivered, "stream failed");
                subscriber.receive_completion(Completion::Failure(failure));
                return;
            }
            None => {
                tracing::debug!(delivered, "stream finished");
                subscriber.receive_completion(Completion::Finished);
                return;
            }
        };

        let demand = subscriber.receive(value);
        tracing::trace!(%demand, "stream value delivered");
        subscription.add(demand);

        delivered += 1;
        if delivered % yield_every == 0 {
            tokio::task::yield_now().await;
        }
    }
}
