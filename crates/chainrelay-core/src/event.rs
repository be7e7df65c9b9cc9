//! Raw, normalized, and persisted event types.

use crate::entity::EntityRef;
use crate::network::Network;
use serde::{Deserialize, Serialize};

/// A raw, protocol-specific event as received from a network listener.
/// This is the input to every parser; it is never persisted directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    /// Family of the network that emitted this event
    pub network: Network,
    /// Chain slug, e.g. "edgeware", "dydx", "osmosis"
    pub chain: String,
    /// Protocol-level event name, e.g. "democracy.Proposed", "VoteEmitted"
    pub name: String,
    /// Untouched protocol payload
    pub payload: serde_json::Value,
    /// Block number / height the event was observed at
    pub block_number: u64,
}

/// Parser output: a raw event mapped into the internal representation.
/// `kind` is the wire form of the family-specific event kind. Families keep
/// their own closed enumerations, so the cross-family type is a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub network: Network,
    pub kind: String,
    /// Normalized, structured payload (family-shape-specific)
    pub data: serde_json::Value,
    /// Groups chronologically related events (e.g. one proposal's lifecycle)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<EntityRef>,
}

/// A normalized, deduplicated chain event as persisted in the event store.
/// Immutable after creation; later related events get new rows linked via
/// `entity_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainEvent {
    /// Store-assigned row id
    pub id: i64,
    pub network: Network,
    pub block_number: u64,
    pub kind: String,
    pub data: serde_json::Value,
    /// Content hash over (network, kind, data), the dedup key
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_key: Option<String>,
}

impl ChainEvent {
    /// Routing key for bus publication, keyed by event category.
    pub fn routing_key(&self) -> String {
        format!("chain-events.{}", self.network)
    }

    /// The object identifier a subscription watches for this event:
    /// the entity key when one exists, otherwise the network slug.
    pub fn object_id(&self) -> &str {
        self.entity_key.as_deref().unwrap_or(self.network.as_str())
    }
}

/// Insert payload for the event store; the store assigns the row id.
#[derive(Debug, Clone)]
pub struct NewChainEvent {
    pub network: Network,
    pub block_number: u64,
    pub kind: String,
    pub data: serde_json::Value,
    pub hash: String,
    pub entity_key: Option<String>,
}
