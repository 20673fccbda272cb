//! Error types for resumable-stream operations.

use thiserror::Error;
use tokio::runtime::TryCurrentError;

/// Errors that can occur when setting up a stream publisher.
#[derive(Debug, Error)]
pub enum StreamError {
    /// No tokio runtime is available to drive the stream.
    #[error("no tokio runtime available to drive the stream: {0}")]
    NoRuntime(#[from] TryCurrentError),
}

impl StreamError {
    /// Returns `true` if the error is caused by a missing runtime.
    #[inline]
    pub fn is_no_runtime(&self) -> bool {
        matches!(self, Self::NoRuntime(_))
    }
}
