//! Registry error types
//!
//! Error types for subscriber delivery.

use thiserror::Error;

/// Error returned when an event cannot be handed to a subscriber's transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// Transport closed, either by the client or by a previous failure
    #[error("subscriber transport closed")]
    Closed,
    /// Outbound buffer full; the client is not keeping up
    #[error("subscriber outbound buffer full")]
    Full,
}
