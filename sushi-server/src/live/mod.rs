//! LiveHub: realtime back-office feed
//!
//! Order, menu and restaurant setting changes fan out over a broadcast
//! channel to every connected back-office WebSocket session.
//!
//! ```text
//! handler ── broadcast_sync ──▶ LiveHub ──▶ admin WS session (n)
//!                 │
//!                 └── ResourceVersions (per-resource counter)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Broadcast channel capacity
const BROADCAST_CAPACITY: usize = 256;

/// One row change
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LiveEvent {
    /// "order", "product", "restaurant", ...
    pub resource: String,
    /// "created" | "updated" | "deleted"
    pub action: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    pub version: u64,
}

/// Server → back-office message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveMessage {
    /// Sent on connect and after a lag: current version of every resource
    Ready { versions: HashMap<String, u64> },
    Sync(LiveEvent),
}

/// Per-resource version counters
///
/// Each resource type has its own version, which clients use to tell
/// stale data apart.
#[derive(Debug, Default)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bump a resource's version and return it (1 the first time)
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Current version, 0 for an unknown resource
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }

    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.versions
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect()
    }
}

/// Fan-out hub for [`LiveEvent`]s
#[derive(Clone)]
pub struct LiveHub {
    tx: broadcast::Sender<LiveEvent>,
    versions: Arc<ResourceVersions>,
}

impl Default for LiveHub {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            versions: Arc::new(ResourceVersions::new()),
        }
    }

    pub fn versions(&self) -> &ResourceVersions {
        &self.versions
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Bump the resource version and fan the change out. Without
    /// subscribers the event is dropped.
    pub fn publish(
        &self,
        resource: &str,
        action: &str,
        id: &str,
        data: Option<serde_json::Value>,
    ) -> LiveEvent {
        let event = LiveEvent {
            resource: resource.to_string(),
            action: action.to_string(),
            id: id.to_string(),
            data,
            version: self.versions.increment(resource),
        };
        let _ = self.tx.send(event.clone());
        event
    }

    /// Message sent to a session on connect or resync
    pub fn ready_message(&self) -> LiveMessage {
        LiveMessage::Ready {
            versions: self.versions.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_increment_per_resource() {
        let versions = ResourceVersions::new();
        assert_eq!(versions.get("order"), 0);
        assert_eq!(versions.increment("order"), 1);
        assert_eq!(versions.increment("order"), 2);
        assert_eq!(versions.increment("product"), 1);
        assert_eq!(versions.snapshot().get("order"), Some(&2));
    }

    #[tokio::test]
    async fn subscribers_receive_events_in_order() {
        let hub = LiveHub::new();
        let mut rx = hub.subscribe();
        hub.publish("order", "created", "a", None);
        hub.publish("order", "updated", "a", Some(serde_json::json!({"status": "ready"})));

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!((first.action.as_str(), first.version), ("created", 1));
        assert_eq!((second.action.as_str(), second.version), ("updated", 2));
    }

    #[test]
    fn publish_without_subscribers_still_versions() {
        let hub = LiveHub::new();
        assert_eq!(hub.subscriber_count(), 0);
        let event = hub.publish("restaurant", "updated", "1", None);
        assert_eq!(event.version, 1);
    }

    #[test]
    fn messages_are_tagged() {
        let hub = LiveHub::new();
        hub.publish("order", "created", "a", None);
        let json = serde_json::to_value(hub.ready_message()).unwrap();
        assert_eq!(json["type"], "ready");
        assert_eq!(json["versions"]["order"], 1);

        let event = hub.publish("order", "deleted", "a", None);
        let json = serde_json::to_value(LiveMessage::Sync(event)).unwrap();
        assert_eq!(json["type"], "sync");
        assert_eq!(json["action"], "deleted");
        assert!(json.get("data").is_none());
    }
}
