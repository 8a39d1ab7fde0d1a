//! Statistics for the broadcast registry

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time view of registry activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastStats {
    /// Subscribers currently registered
    pub active_subscribers: u64,
    /// Subscribers ever registered
    pub total_subscribers: u64,
    /// Lines passed to `publish`
    pub messages_published: u64,
    /// Events handed to a subscriber's transport
    pub events_delivered: u64,
    /// Subscribers removed because a delivery failed
    pub subscribers_dropped: u64,
}

impl BroadcastStats {
    /// Average number of subscribers reached per published message
    pub fn average_fanout(&self) -> f64 {
        if self.messages_published > 0 {
            self.events_delivered as f64 / self.messages_published as f64
        } else {
            0.0
        }
    }
}

/// Live counters updated by the registry
#[derive(Debug, Default)]
pub(crate) struct BroadcastCounters {
    total_subscribers: AtomicU64,
    messages_published: AtomicU64,
    events_delivered: AtomicU64,
    subscribers_dropped: AtomicU64,
}

impl BroadcastCounters {
    pub fn record_subscribe(&self) {
        self.total_subscribers.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_publish(&self, delivered: u64, dropped: u64) {
        self.messages_published.fetch_add(1, Ordering::Relaxed);
        self.events_delivered.fetch_add(delivered, Ordering::Relaxed);
        self.subscribers_dropped.fetch_add(dropped, Ordering::Relaxed);
    }

    pub fn snapshot(&self, active_subscribers: u64) -> BroadcastStats {
        BroadcastStats {
            active_subscribers,
            total_subscribers: self.total_subscribers.load(Ordering::Relaxed),
            messages_published: self.messages_published.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
            subscribers_dropped: self.subscribers_dropped.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_empty() {
        let counters = BroadcastCounters::default();
        assert_eq!(counters.snapshot(0), BroadcastStats::default());
    }

    #[test]
    fn test_record_publish() {
        let counters = BroadcastCounters::default();
        counters.record_subscribe();
        counters.record_subscribe();
        counters.record_publish(2, 0);
        counters.record_publish(1, 1);

        let stats = counters.snapshot(1);
        assert_eq!(stats.active_subscribers, 1);
        assert_eq!(stats.total_subscribers, 2);
        assert_eq!(stats.messages_published, 2);
        assert_eq!(stats.events_delivered, 3);
        assert_eq!(stats.subscribers_dropped, 1);
    }

    #[test]
    fn test_average_fanout() {
        let stats = BroadcastStats {
            messages_published: 4,
            events_delivered: 10,
            ..Default::default()
        };
        assert_eq!(stats.average_fanout(), 2.5);
    }

    #[test]
    fn test_average_fanout_no_messages() {
        let stats = BroadcastStats::default();
        assert_eq!(stats.average_fanout(), 0.0);
    }
}
