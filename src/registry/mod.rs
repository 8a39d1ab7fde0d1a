//! Broadcast registry for chat fan-out
//!
//! The registry tracks every open push connection and delivers each
//! published line to all of them. Connections that fail a write are closed
//! and removed on the spot.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<BroadcastRegistry>
//!                   ┌──────────────────────────────┐
//!                   │ subscribers: BTreeMap<Id,    │
//!                   │   Arc<SubscriberConnection>> │
//!                   └──────────────┬───────────────┘
//!                                  │ snapshot (read lock)
//!         ┌────────────────────────┼────────────────────────┐
//!         ▼                        ▼                        ▼
//!   [Subscriber 1]           [Subscriber 2]           [Subscriber 3]
//!   mpsc::Sender ──► EventStream ──► HTTP response body ──► browser
//!         ▲
//!   POST /send ──► registry.publish(line)
//! ```
//!
//! # Shared Frames
//!
//! A line is framed once per publish. `bytes::Bytes` is reference counted,
//! so every subscriber queue holds the same allocation.

pub mod config;
pub mod error;
pub mod frame;
pub mod store;
pub mod subscriber;

pub use config::RegistryConfig;
pub use error::DeliveryError;
pub use frame::{encode_event, EVENT_NAME};
pub use store::{BroadcastRegistry, Subscription};
pub use subscriber::{EventStream, SubscriberConnection, SubscriberId};
