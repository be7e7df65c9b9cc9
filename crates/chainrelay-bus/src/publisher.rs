//! Event publisher with outbox fallback.
//!
//! When the broker rejects or cannot take a publication, the message is
//! written synchronously to the durable outbox before the call returns. The
//! publisher never errors on broker failure; broker loss degrades to deferred
//! delivery, not data loss.

use std::sync::Arc;

use chainrelay_core::{ChainEvent, StoreError};
use chainrelay_store::{NewOutboxMessage, OutboxStore};
use tracing::warn;

use crate::bus::MessageBus;

/// Default exchange chain events are published to.
pub const CHAIN_EVENTS_EXCHANGE: &str = "chain-events";

/// What happened to a publication.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishOutcome {
    /// The broker acknowledged the message.
    Acked,
    /// The broker was unreachable; the message sits in the outbox.
    Deferred,
}

pub struct EventPublisher {
    bus: Arc<dyn MessageBus>,
    outbox: Arc<dyn OutboxStore>,
    exchange: String,
}

impl EventPublisher {
    pub fn new(bus: Arc<dyn MessageBus>, outbox: Arc<dyn OutboxStore>) -> Self {
        Self {
            bus,
            outbox,
            exchange: CHAIN_EVENTS_EXCHANGE.to_string(),
        }
    }

    /// Publish a persisted chain event. Errors only when the outbox write
    /// itself fails; broker failure returns `Deferred`.
    pub async fn publish(&self, event: &ChainEvent) -> Result<PublishOutcome, StoreError> {
        let routing_key = event.routing_key();
        let payload = serde_json::to_value(event)?;
        match self.bus.publish(&self.exchange, &routing_key, payload).await {
            Ok(()) => Ok(PublishOutcome::Acked),
            Err(err) => {
                warn!(
                    event_id = event.id,
                    %routing_key,
                    error = %err,
                    "publish failed, deferring to outbox"
                );
                self.outbox
                    .enqueue(NewOutboxMessage {
                        event_id: event.id,
                        exchange: self.exchange.clone(),
                        routing_key,
                    })
                    .await?;
                Ok(PublishOutcome::Deferred)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::InMemoryBus;
    use chainrelay_core::Network;
    use chainrelay_store::MemoryStore;
    use serde_json::json;

    fn event(id: i64) -> ChainEvent {
        ChainEvent {
            id,
            network: Network::Aave,
            block_number: 50,
            kind: "proposal-created".into(),
            data: json!({"id": "4"}),
            hash: format!("hash-{id}"),
            entity_key: Some("proposal-4".into()),
        }
    }

    #[tokio::test]
    async fn acked_publish_writes_nothing_to_outbox() {
        let bus = Arc::new(InMemoryBus::new());
        let store = Arc::new(MemoryStore::new());
        let mut rx = bus.subscribe("chain-events.*");
        let publisher = EventPublisher::new(bus, store.clone());

        let out = publisher.publish(&event(1)).await.unwrap();
        assert_eq!(out, PublishOutcome::Acked);
        assert!(store.load_all().await.unwrap().is_empty());
        assert_eq!(rx.recv().await.unwrap().routing_key, "chain-events.aave");
    }

    #[tokio::test]
    async fn failed_publish_lands_in_outbox_before_return() {
        let bus = Arc::new(InMemoryBus::new());
        let store = Arc::new(MemoryStore::new());
        let publisher = EventPublisher::new(bus.clone(), store.clone());

        bus.set_available(false);
        let out = publisher.publish(&event(2)).await.unwrap();
        assert_eq!(out, PublishOutcome::Deferred);

        let pending = store.load_all().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].event_id, 2);
        assert_eq!(pending[0].routing_key, "chain-events.aave");
        assert_eq!(pending[0].attempts, 0);
    }
}
