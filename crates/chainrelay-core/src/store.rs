//! `EventStore` trait, the processor's persistence seam.
//!
//! The store enforces uniqueness on the content hash with
//! insert-conflict-returns-duplicate semantics, so the lookup-then-insert
//! race between concurrent workers is resolved inside one call.

use crate::error::StoreError;
use crate::event::{ChainEvent, NewChainEvent};
use async_trait::async_trait;

/// Result of an insert attempt against the unique hash column.
#[derive(Debug, Clone, PartialEq)]
pub enum EventInsert {
    Inserted(ChainEvent),
    Duplicate,
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Insert a new chain event. Returns `Duplicate` when a row with the
    /// same content hash already exists; performs no other action in that
    /// case.
    async fn insert_event(&self, event: NewChainEvent) -> Result<EventInsert, StoreError>;

    /// Fetch an event by its content hash.
    async fn event_by_hash(&self, hash: &str) -> Result<Option<ChainEvent>, StoreError>;

    /// Fetch an event by row id.
    async fn event_by_id(&self, id: i64) -> Result<Option<ChainEvent>, StoreError>;
}
