//! A subscriber that writes every value into a field of a shared object.

use crate::demand::Demand;
use crate::handle::{Resumable, ResumableHandle};
#[cfg(debug_assertions)]
use crate::invariants::{
    debug_assert_rejected_cancelled, debug_assert_single_demand, debug_assert_target_released,
};
use crate::protocol::{Completion, Publisher, Subscriber, Subscription};
use crate::state::{SubscriptionState, SubscriptionStatus};
use crossbeam_utils::atomic::AtomicCell;
use parking_lot::Mutex;
use std::convert::Infallible;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Object shared between the caller and a [`ResumableAssign`].
///
/// Writes go through `&Root`, so the fields a [`WriteTarget`] touches need
/// interior mutability. The subscriber never locks the object as a whole.
pub type SharedTarget<Root> = Arc<Root>;

/// When a [`ResumableAssign`] asks for the next value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssignMode {
    /// Re-request one value after every delivery. `resume()` is a no-op.
    #[default]
    SingleDemandAllTheTime,
    /// Request nothing after a delivery. Only `resume()` pulls the next
    /// value.
    SingleDemandThenStop,
}

/// Where a delivered value is written: a setter over `&Root`.
///
/// Writes run on the thread delivering the value, which may be the thread
/// calling `resume()`. A setter must therefore not wait on a lock the
/// caller could be holding while it resumes; [`WriteTarget::field`] never
/// does.
pub struct WriteTarget<Root, Value> {
    write: Box<dyn Fn(&Root, Value) + Send + Sync>,
}

impl<Root, Value> WriteTarget<Root, Value> {
    /// Targets the [`AtomicCell`] returned by `project`.
    ///
    /// ```
    /// use resumable_rs::{AtomicCell, WriteTarget};
    ///
    /// struct Label {
    ///     width: AtomicCell<u32>,
    /// }
    ///
    /// let target = WriteTarget::field(|label: &Label| &label.width);
    /// let label = Label { width: AtomicCell::new(0) };
    /// target.write(&label, 120);
    /// assert_eq!(label.width.load(), 120);
    /// ```
    pub fn field<F>(project: F) -> Self
    where
        F: for<'a> Fn(&'a Root) -> &'a AtomicCell<Value> + Send + Sync + 'static,
    {
        Self {
            write: Box::new(move |root, value| project(root).store(value)),
        }
    }

    /// Targets an arbitrary setter.
    pub fn setter<F>(set: F) -> Self
    where
        F: Fn(&Root, Value) + Send + Sync + 'static,
    {
        Self { write: Box::new(set) }
    }

    /// Writes `value` into `root`.
    #[inline]
    pub fn write(&self, root: &Root, value: Value) {
        (self.write)(root, value);
    }
}

impl<Root, Value> fmt::Debug for WriteTarget<Root, Value> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WriteTarget<{}, {}>",
            std::any::type_name::<Root>(),
            std::any::type_name::<Value>()
        )
    }
}

struct AssignState<Root> {
    subscription: SubscriptionState<Arc<dyn Subscription>>,
    // held until terminal, then released
    target: Option<SharedTarget<Root>>,
}

/// Subscriber assigning each value to a field of a caller-owned object.
///
/// Only publishers that cannot fail may be attached. The subscriber holds
/// the target until the stream ends or is cancelled and drops it at that
/// point, so a target that owns the [`ResumableHandle`] does not form a
/// lasting reference cycle.
pub struct ResumableAssign<Root, Value> {
    state: Mutex<AssignState<Root>>,
    write_target: WriteTarget<Root, Value>,
    mode: AssignMode,
    pending_pull: AtomicBool,
}

impl<Root, Value> ResumableAssign<Root, Value> {
    /// Creates an unattached subscriber. Prefer [`attach_assign`].
    pub fn new(target: SharedTarget<Root>, write_target: WriteTarget<Root, Value>, mode: AssignMode) -> Self {
        Self {
            state: Mutex::new(AssignState {
                subscription: SubscriptionState::AwaitingSubscription,
                target: Some(target),
            }),
            write_target,
            mode,
            pending_pull: AtomicBool::new(false),
        }
    }

    /// The demand mode fixed at construction.
    pub fn mode(&self) -> AssignMode {
        self.mode
    }

    /// The target, until the subscriber terminates.
    pub fn target(&self) -> Option<SharedTarget<Root>> {
        self.state.lock().target.clone()
    }

    fn subscription(&self) -> Option<Arc<dyn Subscription>> {
        self.state.lock().subscription.handle().cloned()
    }
}

impl<Root, Value> Subscriber for ResumableAssign<Root, Value>
where
    Root: Send + Sync,
{
    type Input = Value;
    type Failure = Infallible;

    fn receive_subscription(&self, subscription: Arc<dyn Subscription>) {
        let accepted = self.state.lock().subscription.subscribe(Arc::clone(&subscription));
        match accepted {
            Ok(()) => {
                self.pending_pull.store(true, Ordering::Release);
                tracing::trace!(mode = ?self.mode, "resumable assign subscribed, requesting first value");
                subscription.request(Demand::ONE);
            }
            Err(rejected) => {
                tracing::debug!("resumable assign rejected a second subscription");
                rejected.cancel();

                #[cfg(debug_assertions)]
                debug_assert_rejected_cancelled!(true, true);
            }
        }
    }

    fn receive(&self, value: Value) -> Demand {
        let target = {
            let state = self.state.lock();
            match state.subscription.handle() {
                Some(_) => state.target.clone(),
                None => None,
            }
        };

        let demand = match self.mode {
            AssignMode::SingleDemandAllTheTime => Demand::ONE,
            AssignMode::SingleDemandThenStop => {
                // cleared before the write so a resume() prompted by the new
                // value is never swallowed
                self.pending_pull.store(false, Ordering::Release);
                Demand::NONE
            }
        };

        match target {
            Some(target) => self.write_target.write(&target, value),
            None => tracing::trace!("resumable assign dropped a value outside of a subscription"),
        }

        #[cfg(debug_assertions)]
        debug_assert_single_demand!(demand);

        demand
    }

    fn receive_completion(&self, _completion: Completion<Infallible>) {
        let (released, target) = {
            let mut state = self.state.lock();
            let released = state.subscription.terminate();
            let target = state.target.take();

            #[cfg(debug_assertions)]
            debug_assert_target_released!(true, state.target.is_none());

            (released, target)
        };
        drop(target);

        if released {
            tracing::debug!("resumable assign completed, target released");
        }
    }
}

impl<Root, Value> Resumable for ResumableAssign<Root, Value>
where
    Root: Send + Sync,
{
    fn resume(&self) {
        if self.mode != AssignMode::SingleDemandThenStop {
            return;
        }
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

        tracing::trace!("resumable assign resumed");
        subscription.request(Demand::ONE);
    }

    fn cancel(&self) {
        let (released, target) = {
            let mut state = self.state.lock();
            let released = state.subscription.cancel();
            let target = if released.is_some() { state.target.take() } else { None };

            #[cfg(debug_assertions)]
            debug_assert_target_released!(released.is_some(), state.target.is_none());

            (released, target)
        };
        drop(target);

        if let Some(subscription) = released {
            tracing::debug!("resumable assign cancelled, target released");
            subscription.cancel();
        }
    }

    fn status(&self) -> SubscriptionStatus {
        self.state.lock().subscription.status()
    }
}

impl<Root, Value> fmt::Debug for ResumableAssign<Root, Value> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ResumableAssign")
            .field("root", &std::any::type_name::<Root>())
            .field("mode", &self.mode)
            .field("status", &state.subscription.status())
            .field("holds_target", &state.target.is_some())
            .finish()
    }
}

/// Attaches a [`ResumableAssign`] writing into `target` through
/// `write_target`.
///
/// The publisher must not be able to fail.
///
/// # Example
///
/// ```
/// use resumable_rs::{attach_assign, AssignMode, AtomicCell, Sequence, WriteTarget};
/// use std::sync::Arc;
///
/// struct Gauge {
///     level: AtomicCell<u8>,
/// }
///
/// let gauge = Arc::new(Gauge { level: AtomicCell::new(0) });
/// let handle = attach_assign(
///     Sequence::new([3, 5, 8]),
///     Arc::clone(&gauge),
///     WriteTarget::field(|gauge: &Gauge| &gauge.level),
///     AssignMode::SingleDemandThenStop,
/// );
///
/// assert_eq!(gauge.level.load(), 3);
/// handle.resume();
/// assert_eq!(gauge.level.load(), 5);
/// ```
pub fn attach_assign<P, Root>(
    publisher: P,
    target: SharedTarget<Root>,
    write_target: WriteTarget<Root, P::Output>,
    mode: AssignMode,
) -> ResumableHandle
where
    P: Publisher<Failure = Infallible>,
    P::Output: 'static,
    Root: Send + Sync + 'static,
{
    let assign = Arc::new(ResumableAssign::new(target, write_target, mode));
    publisher.subscribe(Arc::clone(&assign) as Arc<dyn Subscriber<Input = P::Output, Failure = Infallible>>);
    ResumableHandle::new(assign)
}
