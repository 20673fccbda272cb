//! Tokio stream adapters for resumable-rs
//!
//! This crate turns any [`futures_core::Stream`] into a demand-driven
//! [`Publisher`](resumable_rs::Publisher), so the resumable subscribers of
//! `resumable-rs` can pace an async source.
//!
//! # Features
//!
//! - **Pull only on demand**: the stream is polled only while the subscriber
//!   holds demand, a paused sink leaves it untouched
//! - **Prompt cancellation**: cancelling wakes the driver even while it is
//!   waiting on the stream, and the stream is dropped right away
//! - **Failures**: `Stream<Item = Result<T, E>>` ends with a failure
//!   completion at the first `Err`
//! - **Ticks**: [`spawn_resume_ticker`] resumes a subscriber periodically
//!
//! # Example
//!
//! ```
//! use resumable_rs::PublisherExt;
//! use resumable_stream::{spawn_resume_ticker, StreamPublisher};
//! use std::sync::{Arc, Mutex};
//! use std::time::Duration;
//!
//! #[tokio::main(flavor = "current_thread", start_paused = true)]
//! async fn main() -> Result<(), resumable_stream::StreamError> {
//!     let seen = Arc::new(Mutex::new(Vec::new()));
//!     let sink_seen = Arc::clone(&seen);
//!
//!     // one value per tick
//!     let handle = StreamPublisher::new(tokio_stream::iter(1..=3))?.resumable_sink(
//!         move |value| {
//!             sink_seen.lock().unwrap().push(value);
//!             false
//!         },
//!         |_| {},
//!     );
//!     let ticker = spawn_resume_ticker(handle.resumer(), Duration::from_millis(100));
//!
//!     tokio::time::sleep(Duration::from_millis(250)).await;
//!     assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
//!
//!     drop(handle);
//!     ticker.await.unwrap();
//!     Ok(())
//! }
//! ```

mod config;
mod driver;
mod error;
mod invariants;
mod publisher;
mod ticker;

pub use config::StreamConfig;
pub use error::StreamError;
pub use publisher::{StreamPublisher, TryStreamPublisher};
pub use ticker::spawn_resume_ticker;

// Re-export useful stream combinators
pub use tokio_stream::StreamExt;
