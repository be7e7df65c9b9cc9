//! Canonical content hashing.
//!
//! The content hash is the pipeline's idempotency key: two structurally
//! identical events must collide regardless of the key order their payloads
//! arrived with. Serialization therefore sorts object keys recursively
//! before hashing.

use crate::network::Network;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Serializes a JSON value with all object keys sorted, recursively.
/// Arrays keep their order; scalars render as serde_json renders them.
pub fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, String> =
                map.iter().map(|(k, v)| (k, canonical_json(v))).collect();
            let body: Vec<String> = sorted
                .into_iter()
                .map(|(k, v)| format!("{}:{}", serde_json::to_string(k).unwrap_or_default(), v))
                .collect();
            format!("{{{}}}", body.join(","))
        }
        Value::Array(items) => {
            let body: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", body.join(","))
        }
        scalar => scalar.to_string(),
    }
}

/// Deterministic content hash over (network, kind, data).
/// Hex-encoded SHA-256; insensitive to object key order in `data`.
pub fn content_hash(network: Network, kind: &str, data: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(network.as_str().as_bytes());
    hasher.update(b"|");
    hasher.update(kind.as_bytes());
    hasher.update(b"|");
    hasher.update(canonical_json(data).as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hash_stable_under_key_reordering() {
        let a = json!({"proposer": "0xabc", "id": "7", "values": ["1", "2"]});
        let b = json!({"values": ["1", "2"], "id": "7", "proposer": "0xabc"});
        assert_eq!(
            content_hash(Network::Aave, "proposal-created", &a),
            content_hash(Network::Aave, "proposal-created", &b),
        );
    }

    #[test]
    fn hash_stable_under_nested_reordering() {
        let a = json!({"outer": {"x": 1, "y": {"b": 2, "a": 3}}});
        let b = json!({"outer": {"y": {"a": 3, "b": 2}, "x": 1}});
        assert_eq!(
            content_hash(Network::Substrate, "slash", &a),
            content_hash(Network::Substrate, "slash", &b),
        );
    }

    #[test]
    fn hash_differs_across_networks_and_kinds() {
        let data = json!({"id": "1"});
        let h1 = content_hash(Network::Aave, "proposal-created", &data);
        let h2 = content_hash(Network::Compound, "proposal-created", &data);
        let h3 = content_hash(Network::Aave, "proposal-queued", &data);
        assert_ne!(h1, h2);
        assert_ne!(h1, h3);
    }

    #[test]
    fn array_order_still_matters() {
        let a = json!({"choices": ["yes", "no"]});
        let b = json!({"choices": ["no", "yes"]});
        assert_ne!(
            content_hash(Network::Cosmos, "vote", &a),
            content_hash(Network::Cosmos, "vote", &b),
        );
    }

    #[test]
    fn canonical_form_sorts_keys() {
        let v = json!({"b": 1, "a": {"d": 2, "c": 3}});
        assert_eq!(canonical_json(&v), r#"{"a":{"c":3,"d":2},"b":1}"#);
    }
}
