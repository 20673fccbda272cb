//! Configuration for stream driving.

/// Configuration for the task that drives a stream.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Number of values delivered back to back before the driver yields to
    /// the runtime.
    ///
    /// Only matters while the subscriber keeps demand available and the
    /// stream keeps producing ready items; a paused subscriber parks the
    /// driver anyway.
    ///
    /// Default: 64
    pub yield_every: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { yield_every: 64 }
    }
}

impl StreamConfig {
    /// Creates a configuration that yields more often.
    pub fn low_latency() -> Self {
        Self { yield_every: 16 }
    }

    /// Creates a configuration that delivers longer runs between yields.
    pub fn high_throughput() -> Self {
        Self { yield_every: 256 }
    }

    /// Sets the yield interval. Zero is treated as one.
    pub fn with_yield_every(mut self, deliveries: usize) -> Self {
        self.yield_every = deliveries.max(1);
        self
    }
}
