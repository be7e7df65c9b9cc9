//! Entity lifecycle types.
//!
//! An entity groups chronologically related events that describe successive
//! states of one on-chain object, such as a proposal moving from created to
//! queued to executed. Each family parser derives the entity reference
//! for the kinds that participate in a lifecycle.

use crate::event::NormalizedEvent;
use serde::{Deserialize, Serialize};

/// Where in an entity's lifecycle a given event sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityEventKind {
    Create,
    Update,
    Vote,
    Complete,
}

/// Reference linking an event to the entity it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    /// Grouping key, e.g. "proposal-12", "democracy-referendum-3"
    pub key: String,
    pub lifecycle: EntityEventKind,
}

impl EntityRef {
    pub fn new(key: impl Into<String>, lifecycle: EntityEventKind) -> Self {
        Self {
            key: key.into(),
            lifecycle,
        }
    }
}

/// Returns `true` if any event in the slice completes its entity's lifecycle.
pub fn is_entity_completed(events: &[NormalizedEvent]) -> bool {
    events.iter().any(|e| {
        e.entity
            .as_ref()
            .map(|r| r.lifecycle == EntityEventKind::Complete)
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Network;

    fn ev(entity: Option<EntityRef>) -> NormalizedEvent {
        NormalizedEvent {
            network: Network::Aave,
            kind: "proposal-queued".into(),
            data: serde_json::Value::Null,
            entity,
        }
    }

    #[test]
    fn completion_detected() {
        let events = vec![
            ev(Some(EntityRef::new("proposal-1", EntityEventKind::Create))),
            ev(Some(EntityRef::new("proposal-1", EntityEventKind::Complete))),
        ];
        assert!(is_entity_completed(&events));
    }

    #[test]
    fn no_completion_without_complete_member() {
        let events = vec![
            ev(Some(EntityRef::new("proposal-1", EntityEventKind::Create))),
            ev(None),
        ];
        assert!(!is_entity_completed(&events));
    }
}
