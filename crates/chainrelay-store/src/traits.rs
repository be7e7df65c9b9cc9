//! Storage traits, one per pipeline concern. Both backends implement all of
//! them, so wiring code holds a single store value and hands it out as
//! `Arc<dyn Trait>` per consumer.

use async_trait::async_trait;
use chainrelay_core::{NotificationCategory, StoreError, Subscription};

use crate::records::{
    Endpoint, ListenerConfig, NewListenerConfig, NewNotification, NewOutboxMessage,
    NotificationInsert, OutboxMessage, WebhookEndpoint,
};

/// Durable queue of publications the broker did not acknowledge.
#[async_trait]
pub trait OutboxStore: Send + Sync {
    /// Append a failed publication. Called synchronously in the publish path
    /// so a crash after publish failure cannot lose the message.
    async fn enqueue(&self, msg: NewOutboxMessage) -> Result<OutboxMessage, StoreError>;

    /// All pending messages, oldest first.
    async fn load_all(&self) -> Result<Vec<OutboxMessage>, StoreError>;

    /// Remove a message after the broker acknowledged its republication.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    /// Record one more failed republish attempt.
    async fn bump_attempts(&self, id: i64) -> Result<(), StoreError>;
}

/// Read-only view of user subscriptions.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Subscriptions watching the given category and object.
    async fn matching(
        &self,
        category: NotificationCategory,
        object_id: &str,
    ) -> Result<Vec<Subscription>, StoreError>;

    /// Register a subscription. Subscriptions are created by user action
    /// outside the pipeline; this exists for wiring and tests.
    async fn insert_subscription(
        &self,
        category: NotificationCategory,
        object_id: &str,
        subscriber_id: i64,
    ) -> Result<Subscription, StoreError>;
}

/// Notification rows, with at-most-once semantics per
/// (subscription, chain event) pair.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Insert a notification unless one already exists for the same
    /// subscription and chain event. Redelivered bus messages hit the
    /// `Duplicate` arm and create no row.
    async fn insert_once(&self, new: NewNotification) -> Result<NotificationInsert, StoreError>;

    /// All notifications for a subscriber, oldest first.
    async fn for_subscriber(&self, subscriber_id: i64) -> Result<Vec<chainrelay_core::Notification>, StoreError>;
}

/// Registered webhook destinations.
#[async_trait]
pub trait WebhookStore: Send + Sync {
    /// Endpoints subscribed to the given category.
    async fn endpoints_for(
        &self,
        category: NotificationCategory,
    ) -> Result<Vec<WebhookEndpoint>, StoreError>;

    async fn insert_endpoint(
        &self,
        category: NotificationCategory,
        url: &str,
        secret: Option<&str>,
    ) -> Result<WebhookEndpoint, StoreError>;
}

/// Listener configuration consumed at startup. Rows are owned by the admin
/// layer; this pipeline only reads them and toggles the two flags.
#[async_trait]
pub trait ListenerConfigStore: Send + Sync {
    /// Active configs joined with their endpoint, i.e. the listeners the
    /// engine starts.
    async fn active_configs(&self) -> Result<Vec<(ListenerConfig, Endpoint)>, StoreError>;

    /// Register an endpoint. Urls are unique; registering an existing url
    /// returns the existing row.
    async fn add_endpoint(&self, url: &str) -> Result<Endpoint, StoreError>;

    async fn insert_config(&self, new: NewListenerConfig) -> Result<ListenerConfig, StoreError>;

    /// Toggle a config's active flag.
    async fn set_active(&self, id: i64, active: bool) -> Result<(), StoreError>;
}
