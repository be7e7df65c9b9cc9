//! # chainrelay-core
//!
//! Core traits, types, and primitives shared across all ChainRelay crates.
//! Every network parser, store backend, bus publisher, and handler is built
//! on top of the interfaces defined here.

pub mod entity;
pub mod error;
pub mod event;
pub mod handler;
pub mod hash;
pub mod network;
pub mod notification;
pub mod parser;
pub mod processor;
pub mod store;

pub use entity::{is_entity_completed, EntityEventKind, EntityRef};
pub use error::{
    BusError, HandlerError, ListenerError, MessageFormatError, ParseError, ProcessError,
    StoreError,
};
pub use event::{ChainEvent, NewChainEvent, NormalizedEvent, RawEvent};
pub use handler::{EventHandler, Handled};
pub use hash::{canonical_json, content_hash};
pub use network::Network;
pub use notification::{Notification, NotificationCategory, Subscription};
pub use parser::{EventParser, ParseOutcome};
pub use processor::{EventProcessor, Processed};
pub use store::{EventInsert, EventStore};
