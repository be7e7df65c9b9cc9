//! Per-chain listener lifecycle.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::{mpsc, watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use chainrelay_core::RawEvent;

use crate::source::EventSource;

/// Connection state, readable from outside the listener task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

/// Owns one source connection and keeps it alive.
///
/// Events are forwarded to the engine channel as they arrive. On stream end
/// or error the listener reconnects with capped exponential backoff; the
/// retry counter resets once a connection yields events again.
pub struct Listener {
    chain: String,
    state: Arc<RwLock<ListenerState>>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Listener {
    /// Spawn the listener loop over `source`, forwarding events into `tx`.
    pub fn spawn(source: Arc<dyn EventSource>, tx: mpsc::UnboundedSender<RawEvent>) -> Self {
        let chain = source.chain_slug().to_string();
        let state = Arc::new(RwLock::new(ListenerState::Disconnected));
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_loop(source, tx, state.clone(), shutdown_rx));
        Self {
            chain,
            state,
            shutdown,
            task,
        }
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    pub async fn state(&self) -> ListenerState {
        *self.state.read().await
    }

    /// Stop the listener. No events are forwarded after this returns.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            if !e.is_cancelled() {
                error!(chain = %self.chain, error = %e, "listener task panicked");
            }
        }
    }
}

async fn run_loop(
    source: Arc<dyn EventSource>,
    tx: mpsc::UnboundedSender<RawEvent>,
    state: Arc<RwLock<ListenerState>>,
    mut shutdown: watch::Receiver<bool>,
) {
    let chain = source.chain_slug().to_string();
    let mut retry: u32 = 0;
    loop {
        if *shutdown.borrow() {
            break;
        }
        *state.write().await = ListenerState::Connecting;

        let connect = tokio::select! {
            res = source.connect() => res,
            _ = shutdown.changed() => break,
        };
        let mut stream = match connect {
            Ok(s) => {
                info!(chain = %chain, "listener connected");
                *state.write().await = ListenerState::Connected;
                s
            }
            Err(e) => {
                warn!(chain = %chain, retry, error = %e, "connect failed");
                *state.write().await = ListenerState::Reconnecting;
                if backoff_or_shutdown(&mut shutdown, retry).await {
                    break;
                }
                retry += 1;
                continue;
            }
        };

        loop {
            let item = tokio::select! {
                item = stream.next() => item,
                _ = shutdown.changed() => {
                    *state.write().await = ListenerState::Disconnected;
                    return;
                }
            };
            match item {
                Some(Ok(raw)) => {
                    retry = 0;
                    if tx.send(raw).is_err() {
                        // engine gone, nothing left to do
                        *state.write().await = ListenerState::Disconnected;
                        return;
                    }
                }
                Some(Err(e)) => {
                    warn!(chain = %chain, error = %e, "stream error, reconnecting");
                    break;
                }
                None => {
                    warn!(chain = %chain, "stream ended, reconnecting");
                    break;
                }
            }
        }

        *state.write().await = ListenerState::Reconnecting;
        if backoff_or_shutdown(&mut shutdown, retry).await {
            break;
        }
        retry += 1;
    }
    *state.write().await = ListenerState::Disconnected;
}

/// Sleep for the backoff delay; returns true if shutdown fired first.
async fn backoff_or_shutdown(shutdown: &mut watch::Receiver<bool>, retry: u32) -> bool {
    let delay = std::time::Duration::from_millis(500 * 2u64.pow(retry.min(6)));
    tokio::select! {
        _ = tokio::time::sleep(delay) => false,
        _ = shutdown.changed() => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chainrelay_core::{ListenerError, Network};
    use futures::stream;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::source::RawEventStream;

    fn raw(name: &str) -> RawEvent {
        RawEvent {
            network: Network::Substrate,
            chain: "edgeware".into(),
            name: name.into(),
            payload: json!({}),
            block_number: 1,
        }
    }

    /// Yields one scripted batch per connect call, then pends forever.
    struct ScriptedSource {
        connects: AtomicUsize,
        batches: Vec<Vec<RawEvent>>,
    }

    #[async_trait]
    impl EventSource for ScriptedSource {
        fn chain_slug(&self) -> &str {
            "edgeware"
        }

        async fn connect(&self) -> Result<RawEventStream, ListenerError> {
            let n = self.connects.fetch_add(1, Ordering::SeqCst);
            match self.batches.get(n) {
                Some(batch) => {
                    let items: Vec<Result<RawEvent, ListenerError>> =
                        batch.iter().cloned().map(Ok).collect();
                    Ok(Box::pin(stream::iter(items)))
                }
                None => Ok(Box::pin(stream::pending::<Result<RawEvent, ListenerError>>())),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn forwards_events_and_reconnects_after_stream_end() {
        let source = Arc::new(ScriptedSource {
            connects: AtomicUsize::new(0),
            batches: vec![vec![raw("a"), raw("b")], vec![raw("c")]],
        });
        let (tx, mut rx) = mpsc::unbounded_channel();
        let listener = Listener::spawn(source, tx);

        assert_eq!(rx.recv().await.map(|e| e.name), Some("a".to_string()));
        assert_eq!(rx.recv().await.map(|e| e.name), Some("b".to_string()));
        // second connection after the first stream ends
        assert_eq!(rx.recv().await.map(|e| e.name), Some("c".to_string()));

        listener.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn no_events_after_stop_returns() {
        let source = Arc::new(ScriptedSource {
            connects: AtomicUsize::new(0),
            batches: vec![vec![raw("a")]],
        });
        let (tx, mut rx) = mpsc::unbounded_channel();
        let listener = Listener::spawn(source, tx);

        assert_eq!(rx.recv().await.map(|e| e.name), Some("a".to_string()));
        listener.stop().await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn reports_connected_state() {
        let source = Arc::new(ScriptedSource {
            connects: AtomicUsize::new(0),
            batches: vec![vec![raw("a")]],
        });
        let (tx, mut rx) = mpsc::unbounded_channel();
        let listener = Listener::spawn(source, tx);

        rx.recv().await;
        // first stream is drained, but the second connect pends while
        // Connected was set before the batch was yielded
        let state = listener.state().await;
        assert!(matches!(
            state,
            ListenerState::Connected | ListenerState::Reconnecting
        ));
        listener.stop().await;
        assert!(rx.try_recv().is_err());
    }
}
