//! Registry configuration

/// Default number of framed events buffered per subscriber
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 64;

/// Configuration for the broadcast registry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Events queued per subscriber before it is considered dead.
    ///
    /// A client that falls this far behind is dropped rather than throttled.
    pub subscriber_buffer: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            subscriber_buffer: DEFAULT_SUBSCRIBER_BUFFER,
        }
    }
}

impl RegistryConfig {
    /// Set the per-subscriber buffer capacity (minimum 1)
    pub fn subscriber_buffer(mut self, capacity: usize) -> Self {
        self.subscriber_buffer = capacity.max(1);
        self
    }
}
