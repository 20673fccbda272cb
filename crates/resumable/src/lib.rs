//! Resumable subscribers for demand-driven streams
//!
//! A subscriber normally asks for the next value as soon as it has processed
//! the previous one. The subscribers in this crate can stop asking instead,
//! and pull exactly one more value later through an explicit `resume()`.
//! This lets a consumer render a value, wait for a timer or finish some
//! asynchronous work before the producer is allowed to deliver again,
//! without the producer buffering anything.
//!
//! # Key Features
//!
//! - At most one value outstanding per subscriber
//! - `resume()` and `cancel()` callable from any thread, no-ops once terminal
//! - At-most-once subscription: a second subscription is cancelled
//! - Handles cancel on drop, write targets are released on termination
//! - Demand instrumentation for development builds
//!
//! # Example
//!
//! ```
//! use resumable_rs::{PublisherExt, Sequence};
//! use std::sync::{Arc, Mutex};
//!
//! let received = Arc::new(Mutex::new(Vec::new()));
//! let sink_received = Arc::clone(&received);
//!
//! // pull the first value automatically, then wait for resume()
//! let handle = Sequence::new([1, 2, 3]).resumable_sink(
//!     move |value| {
//!         let mut received = sink_received.lock().unwrap();
//!         received.push(value);
//!         received.len() < 2
//!     },
//!     |_| {},
//! );
//!
//! assert_eq!(*received.lock().unwrap(), vec![1, 2]);
//! handle.resume();
//! assert_eq!(*received.lock().unwrap(), vec![1, 2, 3]);
//! assert!(handle.is_terminated());
//! ```

mod assign;
mod config;
mod demand;
mod error;
mod ext;
mod handle;
mod instrument;
mod invariants;
mod protocol;
mod sequence;
mod sink;
mod state;
mod subject;

pub use assign::{attach_assign, AssignMode, ResumableAssign, SharedTarget, WriteTarget};
pub use config::DemandLimits;
pub use demand::Demand;
pub use error::DemandViolation;
pub use ext::PublisherExt;
pub use handle::{Resumable, ResumableHandle, Resumer};
pub use instrument::{DemandMonitor, DemandReport};
pub use protocol::{Completion, Publisher, SharedSubscriber, Subscriber, Subscription};
pub use sequence::Sequence;
pub use sink::{attach_sink, ResumableSink};
pub use state::SubscriptionStatus;
pub use subject::PassthroughSubject;

// Lock-free cell targeted by `WriteTarget::field`
pub use crossbeam_utils::atomic::AtomicCell;
