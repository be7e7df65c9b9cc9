//! Bus consumer fanning events out to the handler set.

use std::sync::Arc;

use chainrelay_core::{ChainEvent, EventHandler, Handled};
use chainrelay_bus::BusMessage;
use futures::future;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, warn};

/// Fans one event out to every registered handler. Handlers run
/// concurrently; a slow webhook never stalls the notification writer. A
/// handler error is logged and swallowed; the remaining handlers still run.
pub struct Dispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl Dispatcher {
    pub fn new(handlers: Vec<Arc<dyn EventHandler>>) -> Self {
        Self { handlers }
    }

    /// Deliver one event to all handlers, concurrently.
    pub async fn dispatch(&self, event: &ChainEvent) {
        let outcomes = future::join_all(
            self.handlers
                .iter()
                .map(|handler| async move { (handler.name(), handler.handle(event).await) }),
        )
        .await;
        for (name, outcome) in outcomes {
            match outcome {
                Ok(Handled::Done) => {
                    debug!(handler = name, event_id = event.id, "handled");
                }
                Ok(Handled::Skipped) => {}
                Err(err) => {
                    warn!(
                        handler = name,
                        event_id = event.id,
                        error = %err,
                        "handler failed"
                    );
                }
            }
        }
    }

    /// Consume bus messages until the channel closes. A payload that does
    /// not deserialize as a chain event is rejected permanently; retrying a
    /// structurally invalid message cannot succeed.
    pub async fn run(&self, mut rx: UnboundedReceiver<BusMessage>) {
        while let Some(msg) = rx.recv().await {
            let event: ChainEvent = match serde_json::from_value(msg.payload) {
                Ok(event) => event,
                Err(err) => {
                    error!(
                        routing_key = %msg.routing_key,
                        error = %err,
                        "malformed bus message, dropping"
                    );
                    continue;
                }
            };
            self.dispatch(&event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chainrelay_core::{HandlerError, Network};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting(AtomicUsize);

    #[async_trait]
    impl EventHandler for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }
        async fn handle(&self, _event: &ChainEvent) -> Result<Handled, HandlerError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Handled::Done)
        }
    }

    struct Failing;

    #[async_trait]
    impl EventHandler for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }
        async fn handle(&self, _event: &ChainEvent) -> Result<Handled, HandlerError> {
            Err(HandlerError::Delivery {
                reason: "endpoint down".into(),
            })
        }
    }

    fn event() -> ChainEvent {
        ChainEvent {
            id: 5,
            network: Network::Aave,
            block_number: 1,
            kind: "proposal-created".into(),
            data: json!({}),
            hash: "h5".into(),
            entity_key: None,
        }
    }

    #[tokio::test]
    async fn failure_does_not_starve_siblings() {
        let counting = Arc::new(Counting(AtomicUsize::new(0)));
        let dispatcher = Dispatcher::new(vec![
            Arc::new(Failing),
            counting.clone(),
            Arc::new(Failing),
        ]);
        dispatcher.dispatch(&event()).await;
        assert_eq!(counting.0.load(Ordering::SeqCst), 1);
    }

    struct Rendezvous(Arc<tokio::sync::Barrier>);

    #[async_trait]
    impl EventHandler for Rendezvous {
        fn name(&self) -> &'static str {
            "rendezvous"
        }
        async fn handle(&self, _event: &ChainEvent) -> Result<Handled, HandlerError> {
            // completes only if another handler reaches the barrier too
            self.0.wait().await;
            Ok(Handled::Done)
        }
    }

    #[tokio::test]
    async fn handlers_run_concurrently() {
        let barrier = Arc::new(tokio::sync::Barrier::new(2));
        let dispatcher = Dispatcher::new(vec![
            Arc::new(Rendezvous(barrier.clone())),
            Arc::new(Rendezvous(barrier)),
        ]);

        // one-at-a-time dispatch would deadlock on the first handler
        tokio::time::timeout(
            std::time::Duration::from_secs(1),
            dispatcher.dispatch(&event()),
        )
        .await
        .expect("handlers did not run concurrently");
    }

    #[tokio::test]
    async fn malformed_bus_payload_is_dropped() {
        let counting = Arc::new(Counting(AtomicUsize::new(0)));
        let dispatcher = Dispatcher::new(vec![counting.clone()]);

        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        tx.send(BusMessage {
            exchange: "chain-events".into(),
            routing_key: "chain-events.aave".into(),
            payload: json!({"not": "an event"}),
        })
        .unwrap();
        tx.send(BusMessage {
            exchange: "chain-events".into(),
            routing_key: "chain-events.aave".into(),
            payload: serde_json::to_value(event()).unwrap(),
        })
        .unwrap();
        drop(tx);

        dispatcher.run(rx).await;
        assert_eq!(counting.0.load(Ordering::SeqCst), 1);
    }
}
