//! # chainrelay-bus
//!
//! Publish side of the pipeline: a topic-routed [`MessageBus`] seam with an
//! in-process implementation, an [`EventPublisher`] that falls back to a
//! durable outbox when the broker is unreachable, and a [`RepublishDaemon`]
//! that drains the outbox once the broker comes back.

mod bus;
mod publisher;
mod republish;
pub mod validate;

pub use bus::{BusMessage, InMemoryBus, MessageBus};
pub use publisher::{EventPublisher, PublishOutcome};
pub use republish::{RepublishDaemon, RepublishHandle};
