//! `EventSource` trait, the transport seam under a listener.
//!
//! A source knows how to open one connection and turn it into a stream of
//! raw events. The `Listener` owns the reconnect loop around it.

use async_trait::async_trait;
use chainrelay_core::{ListenerError, RawEvent};
use futures::Stream;
use std::pin::Pin;

/// A stream of raw events from one connection. The stream ending, with or
/// without an error item, means the connection is gone.
pub type RawEventStream = Pin<Box<dyn Stream<Item = Result<RawEvent, ListenerError>> + Send>>;

/// Abstracts over transports (EVM WebSocket logs, JSON frame feeds, test
/// scripts).
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Chain slug this source covers, for logs.
    fn chain_slug(&self) -> &str;

    /// Open a fresh connection and start streaming.
    async fn connect(&self) -> Result<RawEventStream, ListenerError>;
}
