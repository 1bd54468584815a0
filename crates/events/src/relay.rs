//! Background consumer that forwards marketplace events to the log.
//!
//! [`EventRelay`] is the hook point for collaborators that react to
//! committed changes (notifications, analytics). It runs until the
//! [`EventBus`](crate::bus::EventBus) is dropped.

use tokio::sync::broadcast;

use crate::bus::MarketplaceEvent;

/// Long-lived task that drains the bus.
pub struct EventRelay;

impl EventRelay {
    /// Run the relay loop, returning the number of events handled once the
    /// channel closes.
    pub async fn run(mut receiver: broadcast::Receiver<MarketplaceEvent>) -> u64 {
        let mut handled = 0u64;
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    handled += 1;
                    Self::relay(&event);
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event relay lagged, some events were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!(handled, "Event bus closed, relay shutting down");
                    break;
                }
            }
        }
        handled
    }

    fn relay(event: &MarketplaceEvent) {
        tracing::info!(
            event = %event.kind,
            request_id = ?event.request_id,
            worker_id = ?event.worker_id,
            actor_user_id = ?event.actor_user_id,
            payload = %event.payload,
            "Marketplace event",
        );
    }
}
