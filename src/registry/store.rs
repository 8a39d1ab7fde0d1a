//! Broadcast registry implementation
//!
//! The central registry that tracks live push connections and fans each
//! published line out to all of them.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::config::RegistryConfig;
use super::frame::encode_event;
use super::subscriber::{EventStream, SubscriberConnection, SubscriberId};
use crate::stats::{BroadcastCounters, BroadcastStats};

/// A freshly registered subscriber
///
/// `connection` is the registry's handle; `events` becomes the response body.
#[derive(Debug)]
pub struct Subscription {
    pub connection: Arc<SubscriberConnection>,
    pub events: EventStream,
}

impl Subscription {
    /// Handle to pass to [`BroadcastRegistry::unsubscribe`]
    pub fn id(&self) -> SubscriberId {
        self.connection.id()
    }
}

/// Registry of live subscribers
///
/// Membership is guarded by a `RwLock`. `publish` only holds the read lock
/// long enough to copy the current subscriber set, so slow sends never block
/// subscribe/unsubscribe.
pub struct BroadcastRegistry {
    /// Subscribers keyed by id; ordered by registration
    subscribers: RwLock<BTreeMap<SubscriberId, Arc<SubscriberConnection>>>,

    next_id: AtomicU64,

    /// Set by `close_all`; later subscribers are closed on arrival
    shut_down: AtomicBool,

    counters: BroadcastCounters,

    config: RegistryConfig,
}

impl BroadcastRegistry {
    /// Create a new registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            subscribers: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            shut_down: AtomicBool::new(false),
            counters: BroadcastCounters::default(),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register a new subscriber
    ///
    /// Never fails. After `close_all` the returned connection is already
    /// closed, so its stream ends immediately.
    pub async fn subscribe(&self) -> Subscription {
        let id = SubscriberId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (connection, events) = SubscriberConnection::new(id, self.config.subscriber_buffer);
        let connection = Arc::new(connection);

        let mut subscribers = self.subscribers.write().await;

        if self.shut_down.load(Ordering::Acquire) {
            connection.close();
            tracing::debug!(subscriber = %id, "Subscriber rejected: registry shut down");
        } else {
            subscribers.insert(id, Arc::clone(&connection));
            self.counters.record_subscribe();

            tracing::debug!(
                subscriber = %id,
                subscribers = subscribers.len(),
                "Subscriber added"
            );
        }

        Subscription { connection, events }
    }

    /// Deregister a subscriber
    ///
    /// Removing an absent id is a no-op. The transport is left to the caller.
    pub async fn unsubscribe(&self, id: SubscriberId) {
        let mut subscribers = self.subscribers.write().await;

        if subscribers.remove(&id).is_some() {
            tracing::debug!(
                subscriber = %id,
                subscribers = subscribers.len(),
                "Subscriber removed"
            );
        }
    }

    /// Deliver `line` to every current subscriber
    ///
    /// Best effort: a failed delivery closes and removes that subscriber
    /// and is otherwise invisible to the caller.
    pub async fn publish(&self, line: &str) {
        let frame = encode_event(line);

        let snapshot: Vec<Arc<SubscriberConnection>> =
            self.subscribers.read().await.values().cloned().collect();

        let mut failed = Vec::new();
        for connection in &snapshot {
            if let Err(e) = connection.send_frame(frame.clone()) {
                tracing::warn!(
                    subscriber = %connection.id(),
                    error = %e,
                    "Delivery failed, dropping subscriber"
                );
                connection.close();
                failed.push(connection.id());
            }
        }

        let delivered = (snapshot.len() - failed.len()) as u64;
        self.counters.record_publish(delivered, failed.len() as u64);

        if !failed.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in &failed {
                subscribers.remove(id);
            }
        }

        tracing::trace!(
            recipients = snapshot.len(),
            delivered = delivered,
            dropped = failed.len(),
            "Published"
        );
    }

    /// Number of registered subscribers
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Whether `id` is currently registered
    pub async fn contains(&self, id: SubscriberId) -> bool {
        self.subscribers.read().await.contains_key(&id)
    }

    /// Current statistics
    pub async fn stats(&self) -> BroadcastStats {
        let active = self.subscriber_count().await as u64;
        self.counters.snapshot(active)
    }

    /// Close and remove every subscriber
    ///
    /// Used on server shutdown so open response streams terminate. No
    /// pending events are drained.
    pub async fn close_all(&self) {
        let mut subscribers = self.subscribers.write().await;
        self.shut_down.store(true, Ordering::Release);

        let count = subscribers.len();
        for (_, connection) in std::mem::take(&mut *subscribers) {
            connection.close();
        }

        tracing::info!(subscribers = count, "Closed all subscribers");
    }

    /// Spawn a task that waits for `connection` to close, then deregisters it
    ///
    /// This is the suspension point of a subscription: the task sleeps until
    /// the client disconnects or a failed send closes the transport.
    pub fn spawn_disconnect_watch(
        self: &Arc<Self>,
        connection: Arc<SubscriberConnection>,
    ) -> tokio::task::JoinHandle<()> {
        let registry = Arc::clone(self);

        tokio::spawn(async move {
            connection.closed().await;
            registry.unsubscribe(connection.id()).await;
            connection.close();
        })
    }
}

impl Default for BroadcastRegistry {
    fn default() -> Self {
        Self::new()
    }
}
