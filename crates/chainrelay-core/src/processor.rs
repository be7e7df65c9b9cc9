//! `EventProcessor`, the pipeline's sole idempotency boundary.
//!
//! Listeners deliver at-least-once (reconnects replay recent events); the
//! processor's content-hash check turns that into at-most-once for every
//! downstream component.

use crate::error::ProcessError;
use crate::event::{ChainEvent, NewChainEvent, NormalizedEvent};
use crate::hash::content_hash;
use crate::store::{EventInsert, EventStore};
use std::sync::Arc;

/// Outcome of processing one normalized event.
#[derive(Debug, Clone, PartialEq)]
pub enum Processed {
    Created(ChainEvent),
    /// A structurally identical event was already persisted. Not an error,
    /// just the normal outcome of at-least-once delivery.
    Duplicate,
}

pub struct EventProcessor {
    store: Arc<dyn EventStore>,
}

impl EventProcessor {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Compute the content hash, persist the event unless the hash already
    /// exists, and return the persisted row or `Duplicate`.
    pub async fn process(
        &self,
        event: NormalizedEvent,
        block_number: u64,
    ) -> Result<Processed, ProcessError> {
        let hash = content_hash(event.network, &event.kind, &event.data);

        let new_event = NewChainEvent {
            network: event.network,
            block_number,
            kind: event.kind,
            data: event.data,
            hash,
            entity_key: event.entity.map(|e| e.key),
        };

        match self.store.insert_event(new_event).await? {
            EventInsert::Inserted(row) => Ok(Processed::Created(row)),
            EventInsert::Duplicate => Ok(Processed::Duplicate),
        }
    }
}
