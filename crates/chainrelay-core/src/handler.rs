//! `EventHandler` trait for bus subscribers.

use crate::error::HandlerError;
use crate::event::ChainEvent;
use async_trait::async_trait;

/// What a handler did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Done,
    /// The event did not match this handler's filters; no I/O was performed.
    Skipped,
}

/// A subscriber to the message bus. Handlers execute independently; a
/// failure in one must not affect delivery to the others. The dispatcher
/// isolates errors per handler.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handler name, used in logs when a handler fails.
    fn name(&self) -> &'static str;

    async fn handle(&self, event: &ChainEvent) -> Result<Handled, HandlerError>;
}
