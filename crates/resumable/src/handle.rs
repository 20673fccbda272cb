//! The caller-facing handle to an active resumable subscription.

use crate::state::SubscriptionStatus;
use std::fmt;
use std::sync::{Arc, Weak};

/// Cancel and resume capabilities shared by the resumable subscribers.
///
/// Both operations may be called from any thread at any time and are
/// no-ops before the subscription arrives and after termination.
pub trait Resumable: Send + Sync {
    /// Requests exactly one more value if no pull is already outstanding.
    fn resume(&self);

    /// Cancels the subscription. Idempotent.
    fn cancel(&self);

    /// Current lifecycle status.
    fn status(&self) -> SubscriptionStatus;
}

/// Sole owner of an attached resumable subscriber.
///
/// Dropping the handle cancels the subscription exactly like
/// [`cancel`](ResumableHandle::cancel). The handle is intentionally not
/// `Clone`; hand out a [`Resumer`] where only resumption is needed.
#[must_use = "dropping the handle cancels the subscription"]
pub struct ResumableHandle {
    inner: Arc<dyn Resumable>,
}

impl ResumableHandle {
    pub(crate) fn new(inner: Arc<dyn Resumable>) -> Self {
        Self { inner }
    }

    /// Requests one more value. See [`Resumable::resume`].
    #[inline]
    pub fn resume(&self) {
        self.inner.resume();
    }

    /// Cancels the subscription. See [`Resumable::cancel`].
    #[inline]
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    /// Current lifecycle status of the subscriber.
    pub fn status(&self) -> SubscriptionStatus {
        self.inner.status()
    }

    /// Returns `true` once the stream finished, failed or was cancelled.
    pub fn is_terminated(&self) -> bool {
        self.inner.status().is_terminal()
    }

    /// Returns a cloneable resume-only capability.
    ///
    /// The resumer does not keep the subscriber alive and cannot restart it:
    /// once this handle is dropped, [`Resumer::resume`] has no effect.
    pub fn resumer(&self) -> Resumer {
        Resumer {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl Drop for ResumableHandle {
    fn drop(&mut self) {
        self.inner.cancel();
    }
}

impl fmt::Debug for ResumableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResumableHandle")
            .field("status", &self.inner.status())
            .finish()
    }
}

/// Weak, cloneable resume capability obtained from
/// [`ResumableHandle::resumer`].
#[derive(Clone)]
pub struct Resumer {
    inner: Weak<dyn Resumable>,
}

impl Resumer {
    /// Resumes the subscriber if it is still alive.
    ///
    /// Returns `false` when the subscriber no longer exists. A subscriber
    /// that outlived its handle is terminal, so resuming it is a no-op.
    pub fn resume(&self) -> bool {
        match self.inner.upgrade() {
            Some(inner) => {
                inner.resume();
                true
            }
            None => false,
        }
    }

    /// Returns `true` once the subscriber is terminal or no longer exists.
    pub fn is_terminated(&self) -> bool {
        match self.inner.upgrade() {
            Some(inner) => inner.status().is_terminal(),
            None => true,
        }
    }
}

impl fmt::Debug for Resumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resumer")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}
