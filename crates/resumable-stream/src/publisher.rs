//! Publishers backed by async streams.

use crate::config::StreamConfig;
use crate::driver::spawn_driver;
use crate::error::StreamError;
use futures_core::Stream;
use resumable_rs::{Publisher, SharedSubscriber};
use std::convert::{identity, Infallible};
use std::fmt;
use tokio::runtime::Handle;

/// Publishes the items of a [`Stream`] that cannot fail.
///
/// Each subscription is delivered synchronously and then served by one
/// driver task on the runtime. The stream is polled only while the
/// subscriber holds demand, so a paused
/// [`ResumableSink`](resumable_rs::ResumableSink) leaves it untouched until
/// the next `resume()`.
///
/// # Example
///
/// ```
/// use resumable_rs::PublisherExt;
/// use resumable_stream::StreamPublisher;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), resumable_stream::StreamError> {
/// let publisher = StreamPublisher::new(tokio_stream::iter(1..=3))?;
/// let handle = publisher.resumable_sink(|value| value < 3, |_| {});
/// # drop(handle);
/// # Ok(())
/// # }
/// ```
pub struct StreamPublisher<S> {
    stream: S,
    runtime: Handle,
    config: StreamConfig,
}

impl<S> StreamPublisher<S>
where
    S: Stream + Send + 'static,
    S::Item: Send + 'static,
{
    /// Creates a publisher driven on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::NoRuntime`] when called outside a runtime.
    pub fn new(stream: S) -> Result<Self, StreamError> {
        Ok(Self::with_handle(stream, Handle::try_current()?))
    }

    /// Creates a publisher driven on the given runtime.
    pub fn with_handle(stream: S, runtime: Handle) -> Self {
        Self {
            stream,
            runtime,
            config: StreamConfig::default(),
        }
    }

    /// Replaces the driver configuration.
    #[must_use]
    pub fn with_config(mut self, config: StreamConfig) -> Self {
        self.config = config;
        self
    }
}

impl<S> Publisher for StreamPublisher<S>
where
    S: Stream + Send + 'static,
    S::Item: Send + 'static,
{
    type Output = S::Item;
    type Failure = Infallible;

    fn subscribe(self, subscriber: SharedSubscriber<S::Item, Infallible>) {
        let Self {
            stream,
            runtime,
            config,
        } = self;
        spawn_driver(&runtime, stream, subscriber, config, Ok::<S::Item, Infallible>);
    }
}

impl<S> fmt::Debug for StreamPublisher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamPublisher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Publishes a [`Stream`] of `Result`s, ending with
/// [`Completion::Failure`](resumable_rs::Completion::Failure) at the first
/// `Err`.
pub struct TryStreamPublisher<S> {
    stream: S,
    runtime: Handle,
    config: StreamConfig,
}

impl<S, T, E> TryStreamPublisher<S>
where
    S: Stream<Item = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    /// Creates a publisher driven on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::NoRuntime`] when called outside a runtime.
    pub fn new(stream: S) -> Result<Self, StreamError> {
        Ok(Self::with_handle(stream, Handle::try_current()?))
    }

    /// Creates a publisher driven on the given runtime.
    pub fn with_handle(stream: S, runtime: Handle) -> Self {
        Self {
            stream,
            runtime,
            config: StreamConfig::default(),
        }
    }

    /// Replaces the driver configuration.
    #[must_use]
    pub fn with_config(mut self, config: StreamConfig) -> Self {
        self.config = config;
        self
    }
}

impl<S, T, E> Publisher for TryStreamPublisher<S>
where
    S: Stream<Item = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = T;
    type Failure = E;

    fn subscribe(self, subscriber: SharedSubscriber<T, E>) {
        let Self {
            stream,
            runtime,
            config,
        } = self;
        spawn_driver(&runtime, stream, subscriber, config, identity);
    }
}

impl<S> fmt::Debug for TryStreamPublisher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryStreamPublisher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
