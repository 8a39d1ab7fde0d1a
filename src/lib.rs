//! Minimal real-time chat over Server-Sent Events
//!
//! Clients `POST /send` a `{name, message}` payload and every browser
//! connected to `GET /events` receives it as a push event.
//!
//! ```no_run
//! use webchat_rs::{ChatServer, ServerConfig};
//!
//! # async fn run() -> webchat_rs::Result<()> {
//! let server = ChatServer::new(ServerConfig::default());
//! server.run_until(async {
//!     let _ = tokio::signal::ctrl_c().await;
//! }).await
//! # }
//! ```

pub mod chat;
pub mod error;
pub mod registry;
pub mod server;
pub mod stats;

pub use chat::ChatMessage;
pub use error::{Error, Result};
pub use registry::{BroadcastRegistry, RegistryConfig, SubscriberConnection, SubscriberId};
pub use server::{ChatServer, ServerConfig};
pub use stats::BroadcastStats;
