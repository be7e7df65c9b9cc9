//! # chainrelay-store
//!
//! Persistence backends for the ChainRelay pipeline.
//!
//! The pipeline talks to storage through a handful of narrow traits
//! ([`OutboxStore`], [`SubscriptionStore`], [`NotificationStore`],
//! [`WebhookStore`], [`ListenerConfigStore`], plus `EventStore` from
//! `chainrelay-core`). Two backends implement all of them:
//!
//! - [`MemoryStore`]: thread-safe in-process maps, for tests and embedded use
//! - [`SqliteStore`]: durable single-file database (feature `sqlite`, on by
//!   default)

mod records;
mod traits;

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryStore;
pub use records::{
    Endpoint, ListenerConfig, NewListenerConfig, NewNotification, NewOutboxMessage,
    NotificationInsert, OutboxMessage, WebhookEndpoint,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
pub use traits::{
    ListenerConfigStore, NotificationStore, OutboxStore, SubscriptionStore, WebhookStore,
};
