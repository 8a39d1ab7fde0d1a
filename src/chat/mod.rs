//! Chat message handling
//!
//! Turns a raw submission body into the single line that gets broadcast.

pub mod message;

pub use message::{ChatMessage, DEFAULT_NAME};
