//! HTTP server
//!
//! Wires the broadcast registry into two endpoints plus a static file
//! fallback.

pub mod assets;
pub mod config;
pub mod listener;
pub mod routes;

pub use config::ServerConfig;
pub use listener::ChatServer;
pub use routes::{router, AppState};
