//! `MessageBus` trait and the in-process implementation.
//!
//! Routing follows topic semantics: a binding key is a dot-separated pattern
//! where `*` matches exactly one segment and `#` matches the rest. The
//! pipeline publishes chain events with routing keys like
//! `chain-events.aave`; a consumer binding `chain-events.*` sees all of them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chainrelay_core::BusError;
use tokio::sync::mpsc;

/// A message delivered to a bus consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct BusMessage {
    pub exchange: String,
    pub routing_key: String,
    pub payload: serde_json::Value,
}

/// Broker seam. Publication either succeeds (the broker acknowledged) or
/// fails with `BusError`; the caller decides what to do with the failure.
#[async_trait]
pub trait MessageBus: Send + Sync {
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        payload: serde_json::Value,
    ) -> Result<(), BusError>;
}

/// Returns true when `routing_key` matches the topic pattern `binding`.
pub fn binding_matches(binding: &str, routing_key: &str) -> bool {
    let mut pattern = binding.split('.');
    let mut key = routing_key.split('.');
    loop {
        match (pattern.next(), key.next()) {
            (Some("#"), _) => return true,
            (Some("*"), Some(_)) => continue,
            (Some(p), Some(k)) if p == k => continue,
            (None, None) => return true,
            _ => return false,
        }
    }
}

#[derive(Default)]
struct Bindings {
    subscribers: Vec<(String, mpsc::UnboundedSender<BusMessage>)>,
}

/// In-process topic bus. Consumers subscribe with a binding pattern and
/// receive matching publications over an unbounded channel.
///
/// `set_available(false)` makes every publish fail with
/// `BusError::Unavailable`, which is how tests exercise the outbox path.
pub struct InMemoryBus {
    bindings: RwLock<Bindings>,
    available: AtomicBool,
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBus {
    /// A fresh bus, available for publishes.
    pub fn new() -> Self {
        Self {
            bindings: RwLock::new(Bindings::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Toggle broker availability.
    pub fn set_available(&self, up: bool) {
        self.available.store(up, Ordering::SeqCst);
    }

    /// Subscribe with a topic binding pattern.
    pub fn subscribe(&self, binding: &str) -> mpsc::UnboundedReceiver<BusMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.bindings
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .subscribers
            .push((binding.to_string(), tx));
        rx
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        payload: serde_json::Value,
    ) -> Result<(), BusError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(BusError::Unavailable {
                reason: "broker marked unavailable".into(),
            });
        }
        let mut bindings = self.bindings.write().unwrap_or_else(|e| e.into_inner());
        // Drop subscribers whose receiver went away
        bindings
            .subscribers
            .retain(|(_, tx)| !tx.is_closed());
        for (binding, tx) in &bindings.subscribers {
            if binding_matches(binding, routing_key) {
                let _ = tx.send(BusMessage {
                    exchange: exchange.to_string(),
                    routing_key: routing_key.to_string(),
                    payload: payload.clone(),
                });
            }
        }
        Ok(())
    }
}
