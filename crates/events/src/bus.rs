//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` between the engine, which
//! publishes after each commit, and whatever background consumers the
//! binary spawns.

use chamba_core::types::{DbId, Timestamp};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// MarketplaceEvent
// ---------------------------------------------------------------------------

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    RequestCreated,
    ProposalSubmitted,
    ProposalAccepted,
    WorkStarted,
    RequestCompleted,
    RequestCancelled,
    WorkerRated,
    AvailabilityChanged,
    RatingReconciled,
}

impl EventKind {
    /// Dot-separated event name, e.g. `"service_request.created"`.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::RequestCreated => "service_request.created",
            EventKind::ProposalSubmitted => "proposal.submitted",
            EventKind::ProposalAccepted => "proposal.accepted",
            EventKind::WorkStarted => "service_request.started",
            EventKind::RequestCompleted => "service_request.completed",
            EventKind::RequestCancelled => "service_request.cancelled",
            EventKind::WorkerRated => "worker.rated",
            EventKind::AvailabilityChanged => "worker.availability_changed",
            EventKind::RatingReconciled => "worker.rating_reconciled",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A domain event published after its transaction committed.
///
/// Built with [`MarketplaceEvent::new`] and the `with_*` methods.
#[derive(Debug, Clone, Serialize)]
pub struct MarketplaceEvent {
    pub kind: EventKind,

    /// The service request the event concerns, if any.
    pub request_id: Option<DbId>,

    /// The worker the event concerns, if any.
    pub worker_id: Option<DbId>,

    /// The user whose call caused the event.
    pub actor_user_id: Option<DbId>,

    /// Event-specific data.
    pub payload: serde_json::Value,

    pub timestamp: Timestamp,
}

impl MarketplaceEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            request_id: None,
            worker_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_request(mut self, request_id: DbId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_worker(mut self, worker_id: DbId) -> Self {
        self.worker_id = Some(worker_id);
        self
    }

    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use chamba_events::bus::{EventBus, EventKind, MarketplaceEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(MarketplaceEvent::new(EventKind::RequestCreated).with_request(1));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<MarketplaceEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unread events are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Fire-and-forget: with no subscribers the event is dropped.
    pub fn publish(&self, event: MarketplaceEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MarketplaceEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let event = MarketplaceEvent::new(EventKind::ProposalAccepted)
            .with_request(42)
            .with_worker(9)
            .with_actor(7)
            .with_payload(serde_json::json!({"proposal_id": 3}));

        bus.publish(event);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.kind, EventKind::ProposalAccepted);
        assert_eq!(received.request_id, Some(42));
        assert_eq!(received.worker_id, Some(9));
        assert_eq!(received.actor_user_id, Some(7));
        assert_eq!(received.payload["proposal_id"], 3);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(MarketplaceEvent::new(EventKind::WorkStarted));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.kind, EventKind::WorkStarted);
        assert_eq!(e2.kind, EventKind::WorkStarted);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(MarketplaceEvent::new(EventKind::RequestCancelled));
    }

    #[test]
    fn event_names_are_dotted() {
        assert_eq!(EventKind::RequestCreated.name(), "service_request.created");
        assert_eq!(EventKind::WorkerRated.to_string(), "worker.rated");
    }

    #[test]
    fn serializes_kind_in_snake_case() {
        let event = MarketplaceEvent::new(EventKind::RequestCompleted).with_request(5);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "request_completed");
        assert_eq!(json["request_id"], 5);
        assert!(json["worker_id"].is_null());
    }
}
