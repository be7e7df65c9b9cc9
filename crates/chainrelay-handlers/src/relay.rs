//! Consumer for externally produced relay messages (Discord bridge posts,
//! Snapshot proposals).
//!
//! Shape validation is a guard clause: it runs before any delivery logic,
//! and a failed check drops the message permanently at error level. A
//! structurally invalid message would fail identically on every retry.

use std::sync::Arc;

use async_trait::async_trait;
use chainrelay_bus::{validate, BusMessage};
use chainrelay_core::{HandlerError, MessageFormatError};
use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, warn};

/// Message families arriving over the relay bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayKind {
    Discord,
    Snapshot,
}

impl RelayKind {
    fn validate(&self, payload: &Value) -> Result<(), MessageFormatError> {
        match self {
            RelayKind::Discord => validate::validate_discord(payload),
            RelayKind::Snapshot => validate::validate_snapshot(payload),
        }
    }
}

/// Downstream delivery for a validated relay payload.
#[async_trait]
pub trait RelaySink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(&self, payload: &Value) -> Result<(), HandlerError>;
}

/// Validates each message for its kind and forwards it to the sink. The sink
/// never sees a malformed payload.
pub struct RelayConsumer {
    kind: RelayKind,
    sink: Arc<dyn RelaySink>,
}

impl RelayConsumer {
    pub fn new(kind: RelayKind, sink: Arc<dyn RelaySink>) -> Self {
        Self { kind, sink }
    }

    /// Validate and deliver one message. Delivery failures are logged and
    /// swallowed; format failures are rejected before delivery is attempted.
    pub async fn consume(&self, msg: &BusMessage) {
        if let Err(err) = self.kind.validate(&msg.payload) {
            error!(
                routing_key = %msg.routing_key,
                error = %err,
                "malformed relay message, dropping"
            );
            return;
        }
        match self.sink.deliver(&msg.payload).await {
            Ok(()) => {
                debug!(
                    sink = self.sink.name(),
                    routing_key = %msg.routing_key,
                    "relayed"
                );
            }
            Err(err) => {
                warn!(sink = self.sink.name(), error = %err, "relay delivery failed");
            }
        }
    }

    /// Consume bus messages until the channel closes.
    pub async fn run(&self, mut rx: UnboundedReceiver<BusMessage>) {
        while let Some(msg) = rx.recv().await {
            self.consume(&msg).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSink {
        delivered: AtomicUsize,
    }

    #[async_trait]
    impl RelaySink for CountingSink {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn deliver(&self, _payload: &Value) -> Result<(), HandlerError> {
            self.delivered.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn msg(payload: Value) -> BusMessage {
        BusMessage {
            exchange: "relay".into(),
            routing_key: "relay.discord".into(),
            payload,
        }
    }

    #[tokio::test]
    async fn malformed_message_never_reaches_the_sink() {
        let sink = Arc::new(CountingSink::default());
        let consumer = RelayConsumer::new(RelayKind::Discord, sink.clone());

        // channel_id has the wrong type
        consumer
            .consume(&msg(json!({
                "content": "gm",
                "channel_id": 123,
                "parent_channel_id": "456",
            })))
            .await;
        // missing content entirely
        consumer
            .consume(&msg(json!({
                "channel_id": "123",
                "parent_channel_id": "456",
            })))
            .await;

        assert_eq!(sink.delivered.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_message_is_delivered_once() {
        let sink = Arc::new(CountingSink::default());
        let consumer = RelayConsumer::new(RelayKind::Discord, sink.clone());

        consumer
            .consume(&msg(json!({
                "content": "gm",
                "channel_id": "123",
                "parent_channel_id": "456",
            })))
            .await;

        assert_eq!(sink.delivered.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn snapshot_guard_checks_choices() {
        let sink = Arc::new(CountingSink::default());
        let consumer = RelayConsumer::new(RelayKind::Snapshot, sink.clone());

        consumer
            .consume(&msg(json!({
                "id": "0xprop",
                "title": "t",
                "body": "b",
                "space": "dao.eth",
                "choices": [],
            })))
            .await;
        assert_eq!(sink.delivered.load(Ordering::SeqCst), 0);

        consumer
            .consume(&msg(json!({
                "id": "0xprop",
                "title": "t",
                "body": "b",
                "space": "dao.eth",
                "choices": ["yes", "no"],
            })))
            .await;
        assert_eq!(sink.delivered.load(Ordering::SeqCst), 1);
    }
}
