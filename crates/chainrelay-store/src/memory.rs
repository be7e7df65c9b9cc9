//! In-memory backend. Thread-safe via `Arc<RwLock<Inner>>`; suitable for
//! tests and embedded deployments.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chainrelay_core::{
    ChainEvent, EventInsert, EventStore, NewChainEvent, Notification, NotificationCategory,
    StoreError, Subscription,
};
use chrono::Utc;

use crate::records::{
    Endpoint, ListenerConfig, NewListenerConfig, NewNotification, NewOutboxMessage,
    NotificationInsert, OutboxMessage, WebhookEndpoint,
};
use crate::traits::{
    ListenerConfigStore, NotificationStore, OutboxStore, SubscriptionStore, WebhookStore,
};

#[derive(Default)]
struct Inner {
    events: BTreeMap<i64, ChainEvent>,
    /// hash -> event id, the dedup index
    events_by_hash: HashMap<String, i64>,
    next_event_id: i64,

    outbox: BTreeMap<i64, OutboxMessage>,
    next_outbox_id: i64,

    subscriptions: BTreeMap<i64, Subscription>,
    next_subscription_id: i64,

    notifications: Vec<Notification>,
    /// (subscription_id, chain_event_id) pairs already notified
    notified_pairs: HashSet<(i64, i64)>,
    next_notification_id: i64,

    webhooks: HashMap<NotificationCategory, Vec<WebhookEndpoint>>,
    next_webhook_id: i64,

    listeners: BTreeMap<i64, ListenerConfig>,
    next_listener_id: i64,
    endpoints: BTreeMap<i64, Endpoint>,
    next_endpoint_id: i64,
}

/// Thread-safe in-memory store implementing every storage trait.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_event(&self, event: NewChainEvent) -> Result<EventInsert, StoreError> {
        let mut inner = self.write();
        if inner.events_by_hash.contains_key(&event.hash) {
            return Ok(EventInsert::Duplicate);
        }
        inner.next_event_id += 1;
        let id = inner.next_event_id;
        let row = ChainEvent {
            id,
            network: event.network,
            block_number: event.block_number,
            kind: event.kind,
            data: event.data,
            hash: event.hash,
            entity_key: event.entity_key,
        };
        inner.events_by_hash.insert(row.hash.clone(), id);
        inner.events.insert(id, row.clone());
        Ok(EventInsert::Inserted(row))
    }

    async fn event_by_hash(&self, hash: &str) -> Result<Option<ChainEvent>, StoreError> {
        let inner = self.read();
        Ok(inner
            .events_by_hash
            .get(hash)
            .and_then(|id| inner.events.get(id))
            .cloned())
    }

    async fn event_by_id(&self, id: i64) -> Result<Option<ChainEvent>, StoreError> {
        Ok(self.read().events.get(&id).cloned())
    }
}

#[async_trait]
impl OutboxStore for MemoryStore {
    async fn enqueue(&self, msg: NewOutboxMessage) -> Result<OutboxMessage, StoreError> {
        let mut inner = self.write();
        inner.next_outbox_id += 1;
        let row = OutboxMessage {
            id: inner.next_outbox_id,
            event_id: msg.event_id,
            exchange: msg.exchange,
            routing_key: msg.routing_key,
            enqueued_at: Utc::now(),
            attempts: 0,
        };
        inner.outbox.insert(row.id, row.clone());
        Ok(row)
    }

    async fn load_all(&self) -> Result<Vec<OutboxMessage>, StoreError> {
        Ok(self.read().outbox.values().cloned().collect())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.write().outbox.remove(&id);
        Ok(())
    }

    async fn bump_attempts(&self, id: i64) -> Result<(), StoreError> {
        if let Some(row) = self.write().outbox.get_mut(&id) {
            row.attempts += 1;
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn matching(
        &self,
        category: NotificationCategory,
        object_id: &str,
    ) -> Result<Vec<Subscription>, StoreError> {
        Ok(self
            .read()
            .subscriptions
            .values()
            .filter(|s| s.category == category && s.object_id == object_id)
            .cloned()
            .collect())
    }

    async fn insert_subscription(
        &self,
        category: NotificationCategory,
        object_id: &str,
        subscriber_id: i64,
    ) -> Result<Subscription, StoreError> {
        let mut inner = self.write();
        inner.next_subscription_id += 1;
        let sub = Subscription {
            id: inner.next_subscription_id,
            category,
            object_id: object_id.to_string(),
            subscriber_id,
        };
        inner.subscriptions.insert(sub.id, sub.clone());
        Ok(sub)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_once(&self, new: NewNotification) -> Result<NotificationInsert, StoreError> {
        let mut inner = self.write();
        if let Some(event_id) = new.chain_event_id {
            if inner.notified_pairs.contains(&(new.subscription_id, event_id)) {
                return Ok(NotificationInsert::Duplicate);
            }
        }
        let subscription = inner
            .subscriptions
            .get(&new.subscription_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                what: format!("subscription {}", new.subscription_id),
            })?;
        inner.next_notification_id += 1;
        let row = Notification {
            id: inner.next_notification_id,
            data: new.data,
            is_read: false,
            created_at: Utc::now(),
            subscription,
            chain_event_id: new.chain_event_id,
        };
        if let Some(event_id) = new.chain_event_id {
            inner.notified_pairs.insert((new.subscription_id, event_id));
        }
        inner.notifications.push(row.clone());
        Ok(NotificationInsert::Inserted(row))
    }

    async fn for_subscriber(&self, subscriber_id: i64) -> Result<Vec<Notification>, StoreError> {
        Ok(self
            .read()
            .notifications
            .iter()
            .filter(|n| n.subscription.subscriber_id == subscriber_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl WebhookStore for MemoryStore {
    async fn endpoints_for(
        &self,
        category: NotificationCategory,
    ) -> Result<Vec<WebhookEndpoint>, StoreError> {
        Ok(self
            .read()
            .webhooks
            .get(&category)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_endpoint(
        &self,
        category: NotificationCategory,
        url: &str,
        secret: Option<&str>,
    ) -> Result<WebhookEndpoint, StoreError> {
        let mut inner = self.write();
        inner.next_webhook_id += 1;
        let row = WebhookEndpoint {
            id: inner.next_webhook_id,
            url: url.to_string(),
            secret: secret.map(str::to_string),
        };
        inner.webhooks.entry(category).or_default().push(row.clone());
        Ok(row)
    }
}

#[async_trait]
impl ListenerConfigStore for MemoryStore {
    async fn active_configs(&self) -> Result<Vec<(ListenerConfig, Endpoint)>, StoreError> {
        let inner = self.read();
        inner
            .listeners
            .values()
            .filter(|cfg| cfg.active)
            .map(|cfg| {
                let endpoint = inner.endpoints.get(&cfg.url_id).cloned().ok_or_else(|| {
                    StoreError::NotFound {
                        what: format!("endpoint {}", cfg.url_id),
                    }
                })?;
                Ok((cfg.clone(), endpoint))
            })
            .collect()
    }

    async fn add_endpoint(&self, url: &str) -> Result<Endpoint, StoreError> {
        let mut inner = self.write();
        if let Some(existing) = inner.endpoints.values().find(|e| e.url == url) {
            return Ok(existing.clone());
        }
        inner.next_endpoint_id += 1;
        let row = Endpoint {
            id: inner.next_endpoint_id,
            url: url.to_string(),
        };
        inner.endpoints.insert(row.id, row.clone());
        Ok(row)
    }

    async fn insert_config(&self, new: NewListenerConfig) -> Result<ListenerConfig, StoreError> {
        let mut inner = self.write();
        inner.next_listener_id += 1;
        let row = ListenerConfig {
            id: inner.next_listener_id,
            chain_id: new.chain_id,
            spec: new.spec,
            contract_address: new.contract_address,
            network: new.network,
            base: new.base,
            url_id: new.url_id,
            verbose_logging: new.verbose_logging,
            active: new.active,
        };
        inner.listeners.insert(row.id, row.clone());
        Ok(row)
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<(), StoreError> {
        let mut inner = self.write();
        let row = inner
            .listeners
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound {
                what: format!("listener {id}"),
            })?;
        row.active = active;
        Ok(())
    }
}
