//! Method-call entry points on every [`Publisher`].

use crate::assign::{attach_assign, AssignMode, SharedTarget, WriteTarget};
use crate::config::DemandLimits;
use crate::demand::Demand;
use crate::handle::ResumableHandle;
use crate::instrument::DemandMonitor;
use crate::protocol::{Completion, Publisher};
use crate::sink::attach_sink;
use std::convert::Infallible;
use std::time::Duration;

/// Resumable subscribers and demand instrumentation as publisher methods.
pub trait PublisherExt: Publisher {
    /// See [`attach_sink`].
    fn resumable_sink<V, C>(self, receive_value: V, receive_completion: C) -> ResumableHandle
    where
        Self::Output: 'static,
        Self::Failure: 'static,
        V: FnMut(Self::Output) -> bool + Send + 'static,
        C: FnOnce(Completion<Self::Failure>) + Send + 'static,
    {
        attach_sink(self, receive_value, receive_completion)
    }

    /// See [`attach_assign`].
    fn resumable_assign<Root>(
        self,
        target: SharedTarget<Root>,
        write_target: WriteTarget<Root, Self::Output>,
        mode: AssignMode,
    ) -> ResumableHandle
    where
        Self: Publisher<Failure = Infallible>,
        Self::Output: 'static,
        Root: Send + Sync + 'static,
    {
        attach_assign(self, target, write_target, mode)
    }

    /// Audits upstream requests against `limits`.
    fn monitor_demand(self, limits: DemandLimits) -> DemandMonitor<Self> {
        DemandMonitor::new(self, limits)
    }

    /// Flags any single request larger than `max`.
    fn assert_max_demand(self, max: Demand) -> DemandMonitor<Self> {
        self.monitor_demand(DemandLimits::default().with_max_demand(max))
    }

    /// Flags requests once their sum exceeds `budget`.
    fn assert_accumulated_demand(self, budget: Demand) -> DemandMonitor<Self> {
        self.monitor_demand(DemandLimits::default().with_accumulated_demand(budget))
    }

    /// Flags requests arriving closer together than `interval`.
    fn assert_min_interval(self, interval: Duration) -> DemandMonitor<Self> {
        self.monitor_demand(DemandLimits::default().with_min_interval(interval))
    }

    /// [`DemandLimits::single_and_slow`].
    fn assert_single_and_slow(self) -> DemandMonitor<Self> {
        self.monitor_demand(DemandLimits::single_and_slow())
    }
}

impl<P: Publisher> PublisherExt for P {}
