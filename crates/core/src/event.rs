//! Domain event system — decoupled observability for the orchestrator.
//!
//! Events are published when something interesting (or degraded) happens.
//! Monitoring components subscribe and react without tight coupling; a
//! publish with no subscribers is a no-op, never an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A guest query was classified
    QueryClassified {
        tenant_id: String,
        category: String,
        language: String,
        timestamp: DateTime<Utc>,
    },

    /// A reply was returned to the caller
    TurnAnswered {
        tenant_id: String,
        category: String,
        served_from_cache: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// The shared cache tier failed and the fallback tier served the call
    CacheDegraded {
        operation: String, // "get", "set", "clear"
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// The generation backend failed or timed out
    InferenceFailed {
        tenant_id: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// The conversation store rejected a turn (reply already sent)
    TurnRecordFailed {
        tenant_id: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
/// Components can subscribe to receive all events and filter for what they care about.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // Ignore send errors (no subscribers = that's fine)
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(DomainEvent::CacheDegraded {
            operation: "get".into(),
            reason: "connection refused".into(),
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            DomainEvent::CacheDegraded { operation, .. } => {
                assert_eq!(operation, "get");
            }
            _ => panic!("Expected CacheDegraded event"),
        }
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(16);
        bus.publish(DomainEvent::InferenceFailed {
            tenant_id: "t1".into(),
            reason: "no subscribers".into(),
            timestamp: Utc::now(),
        });
    }
}
