//! In-process domain event bus for inspection changes.
//!
//! Publishing never blocks and never fails when nobody is listening; slow
//! receivers observe `Lagged` and are expected to resynchronise by refetching.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

use super::domain::{Inspection, InspectionId, InspectionStatus};

const CHANNEL_CAPACITY: usize = 256;

/// Typed inspection events carried over the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum InspectionEvent {
    Created(Inspection),
    Updated(Inspection),
    Refresh,
    StatusChanged {
        id: InspectionId,
        status: InspectionStatus,
    },
    /// Emitted by a sync coordinator after its cached list actually changed.
    DataChanged { count: usize },
}

impl InspectionEvent {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Created(_) => "inspection_created",
            Self::Updated(_) => "inspection_updated",
            Self::Refresh => "data_refresh",
            Self::StatusChanged { .. } => "inspection_status_changed",
            Self::DataChanged { .. } => "data_changed",
        }
    }

    /// Whether a sync coordinator should refetch after seeing this event.
    pub const fn triggers_refetch(&self) -> bool {
        matches!(self, Self::Created(_) | Self::Updated(_) | Self::Refresh)
    }
}

/// Cloneable handle onto a shared broadcast channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<InspectionEvent>,
    published: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            published: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn publish(&self, event: InspectionEvent) {
        tracing::debug!(event = event.name(), "publishing inspection event");
        // no receivers is fine
        let _ = self.tx.send(event);
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<InspectionEvent> {
        self.tx.subscribe()
    }

    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(InspectionEvent::Refresh);

        let received = rx.recv().await.expect("event delivered");
        assert_eq!(received, InspectionEvent::Refresh);
        assert_eq!(bus.published(), 1);
    }

    #[test]
    fn publish_without_subscribers_is_counted() {
        let bus = EventBus::new();
        bus.publish(InspectionEvent::DataChanged { count: 2 });
        assert_eq!(bus.published(), 1);
    }

    #[test]
    fn only_domain_changes_trigger_refetch() {
        let inspection = Inspection::new("insp-1", InspectionStatus::Scheduled);
        assert!(InspectionEvent::Created(inspection.clone()).triggers_refetch());
        assert!(InspectionEvent::Updated(inspection).triggers_refetch());
        assert!(InspectionEvent::Refresh.triggers_refetch());
        assert!(!InspectionEvent::DataChanged { count: 1 }.triggers_refetch());
        assert!(!InspectionEvent::StatusChanged {
            id: InspectionId("insp-1".to_string()),
            status: InspectionStatus::Completed,
        }
        .triggers_refetch());
    }

    #[test]
    fn events_serialize_with_tag() {
        let json = serde_json::to_value(InspectionEvent::DataChanged { count: 3 })
            .expect("serializes");
        assert_eq!(json["event"], "data_changed");
        assert_eq!(json["payload"]["count"], 3);
    }
}
