//! Notification creation for subscribed users.

use std::sync::Arc;

use async_trait::async_trait;
use chainrelay_core::{ChainEvent, EventHandler, Handled, HandlerError, NotificationCategory};
use chainrelay_store::{NewNotification, NotificationInsert, NotificationStore, SubscriptionStore};
use tracing::debug;

/// Creates one notification per subscription watching the event's object.
///
/// Idempotency is the store's unique (subscription, chain event) pair, so a
/// redelivered bus message creates zero rows. This key is independent of the
/// processor's content hash; the two compose.
pub struct NotificationHandler {
    subscriptions: Arc<dyn SubscriptionStore>,
    notifications: Arc<dyn NotificationStore>,
}

impl NotificationHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionStore>,
        notifications: Arc<dyn NotificationStore>,
    ) -> Self {
        Self {
            subscriptions,
            notifications,
        }
    }
}

#[async_trait]
impl EventHandler for NotificationHandler {
    fn name(&self) -> &'static str {
        "notification"
    }

    async fn handle(&self, event: &ChainEvent) -> Result<Handled, HandlerError> {
        let matching = self
            .subscriptions
            .matching(NotificationCategory::ChainEvent, event.object_id())
            .await?;
        if matching.is_empty() {
            return Ok(Handled::Skipped);
        }

        let data = serde_json::json!({
            "network": event.network,
            "kind": event.kind,
            "block_number": event.block_number,
            "event_data": event.data,
        });
        let mut created = 0usize;
        for sub in &matching {
            let outcome = self
                .notifications
                .insert_once(NewNotification {
                    subscription_id: sub.id,
                    data: data.clone(),
                    chain_event_id: Some(event.id),
                })
                .await?;
            if matches!(outcome, NotificationInsert::Inserted(_)) {
                created += 1;
            }
        }
        debug!(
            event_id = event.id,
            subscriptions = matching.len(),
            created,
            "notifications written"
        );
        Ok(Handled::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainrelay_core::Network;
    use chainrelay_store::MemoryStore;
    use serde_json::json;

    fn event() -> ChainEvent {
        ChainEvent {
            id: 41,
            network: Network::Compound,
            block_number: 12,
            kind: "proposal-created".into(),
            data: json!({"id": "7"}),
            hash: "h41".into(),
            entity_key: Some("proposal-7".into()),
        }
    }

    #[tokio::test]
    async fn one_row_per_matching_subscription() {
        let store = Arc::new(MemoryStore::new());
        for subscriber in [1, 2, 3] {
            store
                .insert_subscription(NotificationCategory::ChainEvent, "proposal-7", subscriber)
                .await
                .unwrap();
        }
        // Watching a different object; must not fire
        store
            .insert_subscription(NotificationCategory::ChainEvent, "proposal-8", 4)
            .await
            .unwrap();

        let handler = NotificationHandler::new(store.clone(), store.clone());
        assert_eq!(handler.handle(&event()).await.unwrap(), Handled::Done);
        for subscriber in [1, 2, 3] {
            assert_eq!(store.for_subscriber(subscriber).await.unwrap().len(), 1);
        }
        assert!(store.for_subscriber(4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn redelivery_creates_zero_rows() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_subscription(NotificationCategory::ChainEvent, "proposal-7", 9)
            .await
            .unwrap();
        let handler = NotificationHandler::new(store.clone(), store.clone());

        handler.handle(&event()).await.unwrap();
        handler.handle(&event()).await.unwrap();
        assert_eq!(store.for_subscriber(9).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn no_matching_subscription_is_skipped() {
        let store = Arc::new(MemoryStore::new());
        let handler = NotificationHandler::new(store.clone(), store.clone());
        assert_eq!(handler.handle(&event()).await.unwrap(), Handled::Skipped);
    }
}
