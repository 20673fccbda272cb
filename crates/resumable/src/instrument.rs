//! Development-time observers for the demand a subscriber issues.
//!
//! A [`DemandMonitor`] wraps a publisher and checks every
//! [`Subscription::request`] that flows upstream through it against a set
//! of [`DemandLimits`]. It never changes the demand itself.

use crate::config::DemandLimits;
use crate::demand::Demand;
use crate::error::DemandViolation;
use crate::protocol::{Completion, Publisher, SharedSubscriber, Subscriber, Subscription};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// Publisher wrapper that audits upstream requests.
///
/// ```
/// use resumable_rs::{Demand, DemandLimits, PublisherExt, Sequence};
///
/// let monitor = Sequence::new(1..=3).monitor_demand(
///     DemandLimits::default()
///         .with_max_demand(Demand::ONE)
///         .with_panic_on_violation(false),
/// );
/// let report = monitor.report();
/// let handle = monitor.resumable_sink(|_| false, |_| {});
/// handle.resume();
///
/// assert_eq!(report.requests(), vec![Demand::ONE, Demand::ONE]);
/// assert!(report.is_clean());
/// ```
#[derive(Debug)]
pub struct DemandMonitor<P> {
    upstream: P,
    report: DemandReport,
}

impl<P> DemandMonitor<P> {
    /// Wraps `upstream`, checking requests against `limits`.
    pub fn new(upstream: P, limits: DemandLimits) -> Self {
        Self {
            upstream,
            report: DemandReport::new(limits),
        }
    }

    /// Shared view of what the monitor observed. Stays valid after the
    /// monitor has been subscribed.
    pub fn report(&self) -> DemandReport {
        self.report.clone()
    }
}

impl<P> Publisher for DemandMonitor<P>
where
    P: Publisher,
    P::Output: 'static,
    P::Failure: 'static,
{
    type Output = P::Output;
    type Failure = P::Failure;

    fn subscribe(self, subscriber: SharedSubscriber<P::Output, P::Failure>) {
        self.upstream.subscribe(Arc::new(MonitoredSubscriber {
            downstream: subscriber,
            report: self.report,
        }));
    }
}

/// Requests and violations recorded by a [`DemandMonitor`].
#[derive(Debug, Clone)]
pub struct DemandReport {
    inner: Arc<Mutex<ReportState>>,
}

#[derive(Debug)]
struct ReportState {
    limits: DemandLimits,
    requests: Vec<Demand>,
    total: Demand,
    last_request: Option<Instant>,
    violations: Vec<DemandViolation>,
}

impl DemandReport {
    fn new(limits: DemandLimits) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ReportState {
                limits,
                requests: Vec::new(),
                total: Demand::NONE,
                last_request: None,
                violations: Vec::new(),
            })),
        }
    }

    /// Every request observed so far, in order.
    pub fn requests(&self) -> Vec<Demand> {
        self.inner.lock().requests.clone()
    }

    /// Sum of all requests.
    pub fn total_requested(&self) -> Demand {
        self.inner.lock().total
    }

    /// Every violation observed so far, in order.
    pub fn violations(&self) -> Vec<DemandViolation> {
        self.inner.lock().violations.clone()
    }

    /// Returns `true` if no limit was broken.
    pub fn is_clean(&self) -> bool {
        self.inner.lock().violations.is_empty()
    }

    fn observe(&self, demand: Demand) {
        let (found, panic_on_violation) = {
            let mut state = self.inner.lock();
            let limits = state.limits;
            let mut found = Vec::new();

            state.requests.push(demand);
            state.total += demand;

            if let Some(max) = limits.max_demand {
                if demand > max {
                    found.push(DemandViolation::MaxDemandExceeded { requested: demand, max });
                }
            }

            if let Some(budget) = limits.accumulated_demand {
                if state.total > budget {
                    found.push(DemandViolation::BudgetExceeded {
                        total: state.total,
                        budget,
                    });
                }
            }

            if let Some(min_interval) = limits.min_interval {
                let now = Instant::now();
                match state.last_request {
                    Some(last) if now.duration_since(last) < min_interval => {
                        // the reference point stays at the last accepted request
                        found.push(DemandViolation::TooFrequent {
                            elapsed: now.duration_since(last),
                            min_interval,
                        });
                    }
                    _ => state.last_request = Some(now),
                }
            }

            state.violations.extend(found.iter().copied());
            (found, limits.panic_on_violation)
        };

        for violation in &found {
            tracing::warn!(%violation, "demand limit violated");
        }
        if panic_on_violation {
            if let Some(violation) = found.first() {
                panic!("{violation}");
            }
        }
    }
}

struct MonitoredSubscriber<T, E> {
    downstream: SharedSubscriber<T, E>,
    report: DemandReport,
}

impl<T, E> Subscriber for MonitoredSubscriber<T, E> {
    type Input = T;
    type Failure = E;

    fn receive_subscription(&self, subscription: Arc<dyn Subscription>) {
        self.downstream.receive_subscription(Arc::new(MonitoredSubscription {
            upstream: subscription,
            report: self.report.clone(),
        }));
    }

    fn receive(&self, input: T) -> Demand {
        self.downstream.receive(input)
    }

    fn receive_completion(&self, completion: Completion<E>) {
        self.downstream.receive_completion(completion);
    }
}

struct MonitoredSubscription {
    upstream: Arc<dyn Subscription>,
    report: DemandReport,
}

impl Subscription for MonitoredSubscription {
    fn request(&self, demand: Demand) {
        self.report.observe(demand);
        self.upstream.request(demand);
    }

    fn cancel(&self) {
        self.upstream.cancel();
    }
}
