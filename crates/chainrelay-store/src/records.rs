//! Row types shared by the storage traits and both backends.

use chainrelay_core::Notification;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bus publication that could not be acknowledged and was written to the
/// outbox instead. Replayed by the republish daemon until the broker accepts
/// it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxMessage {
    /// Store-assigned row id
    pub id: i64,
    /// Id of the persisted chain event this message carries
    pub event_id: i64,
    pub exchange: String,
    pub routing_key: String,
    pub enqueued_at: DateTime<Utc>,
    /// Number of failed republish attempts so far
    pub attempts: u32,
}

/// Insert payload for the outbox; the store assigns id and timestamps
/// `enqueued_at`, and attempts start at zero.
#[derive(Debug, Clone)]
pub struct NewOutboxMessage {
    pub event_id: i64,
    pub exchange: String,
    pub routing_key: String,
}

/// Insert payload for a notification. The store enforces at-most-once per
/// (subscription, chain event) pair.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub subscription_id: i64,
    pub data: serde_json::Value,
    pub chain_event_id: Option<i64>,
}

/// Result of a notification insert against the unique
/// (subscription_id, chain_event_id) pair.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationInsert {
    Inserted(Notification),
    Duplicate,
}

/// A registered webhook destination for a notification category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEndpoint {
    pub id: i64,
    pub url: String,
    /// Shared secret for the HMAC signature header; unsigned when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

/// A node endpoint. Urls are unique; many listener configs may share one
/// endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: i64,
    pub url: String,
}

/// One configured listener row. Owned by the admin layer; consumed read-only
/// by the engine, except for the active/verbose toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenerConfig {
    pub id: i64,
    /// Chain slug, e.g. "edgeware", "dydx"
    pub chain_id: String,
    /// Chain-specific spec blob (runtime types, decimals, etc.)
    pub spec: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    pub network: chainrelay_core::Network,
    /// Protocol base, e.g. "substrate", "ethereum", "cosmos"
    pub base: String,
    pub url_id: i64,
    pub verbose_logging: bool,
    /// Only active configs get a listener at startup
    pub active: bool,
}

/// Insert payload for a listener config; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewListenerConfig {
    pub chain_id: String,
    pub spec: serde_json::Value,
    pub contract_address: Option<String>,
    pub network: chainrelay_core::Network,
    pub base: String,
    pub url_id: i64,
    pub verbose_logging: bool,
    pub active: bool,
}
