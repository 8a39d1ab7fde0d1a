//! Crate error types

use thiserror::Error;

/// Errors raised while running the server
#[derive(Debug, Error)]
pub enum Error {
    /// Binding or serving the listener failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
