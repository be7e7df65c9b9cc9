//! Outbox drain daemon.
//!
//! A single task wakes on a fixed interval and walks the outbox oldest
//! first. Each message's event payload is refetched from the event store at
//! republish time; the row is removed only after the broker acknowledges.
//! Ticks run sequentially in one task, so two ticks never race over the same
//! rows.

use std::sync::Arc;
use std::time::Duration;

use chainrelay_core::{BusError, EventStore};
use chainrelay_store::OutboxStore;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::bus::MessageBus;

pub struct RepublishDaemon {
    bus: Arc<dyn MessageBus>,
    outbox: Arc<dyn OutboxStore>,
    events: Arc<dyn EventStore>,
    interval: Duration,
}

impl RepublishDaemon {
    /// Create a daemon draining the outbox every `interval_ms` milliseconds.
    /// Rejects non-positive intervals.
    pub fn new(
        bus: Arc<dyn MessageBus>,
        outbox: Arc<dyn OutboxStore>,
        events: Arc<dyn EventStore>,
        interval_ms: i64,
    ) -> Result<Self, BusError> {
        if interval_ms <= 0 {
            return Err(BusError::InvalidInterval { ms: interval_ms });
        }
        Ok(Self {
            bus,
            outbox,
            events,
            interval: Duration::from_millis(interval_ms as u64),
        })
    }

    /// Drain the outbox once. Stops at the first broker failure; the broker
    /// is down, so the remaining rows would fail too.
    pub async fn tick(&self) {
        let pending = match self.outbox.load_all().await {
            Ok(rows) => rows,
            Err(err) => {
                error!(error = %err, "failed to load outbox");
                return;
            }
        };
        if pending.is_empty() {
            return;
        }
        debug!(count = pending.len(), "draining outbox");

        for msg in pending {
            let event = match self.events.event_by_id(msg.event_id).await {
                Ok(Some(event)) => event,
                Ok(None) => {
                    // Event row is gone; the message can never succeed.
                    warn!(event_id = msg.event_id, "outbox message references a missing event, dropping");
                    if let Err(err) = self.outbox.delete(msg.id).await {
                        error!(error = %err, "failed to drop outbox message");
                    }
                    continue;
                }
                Err(err) => {
                    error!(error = %err, "failed to load event for republish");
                    return;
                }
            };

            let payload = match serde_json::to_value(&event) {
                Ok(v) => v,
                Err(err) => {
                    error!(error = %err, "failed to serialize event for republish");
                    return;
                }
            };

            match self.bus.publish(&msg.exchange, &msg.routing_key, payload).await {
                Ok(()) => {
                    if let Err(err) = self.outbox.delete(msg.id).await {
                        error!(error = %err, "republished but failed to delete outbox row");
                    }
                }
                Err(err) => {
                    warn!(
                        outbox_id = msg.id,
                        attempts = msg.attempts + 1,
                        error = %err,
                        "republish failed"
                    );
                    if let Err(err) = self.outbox.bump_attempts(msg.id).await {
                        error!(error = %err, "failed to record republish attempt");
                    }
                    return;
                }
            }
        }
    }

    /// Spawn the drain loop. The returned handle stops it.
    pub fn spawn(self) -> RepublishHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // Consume the immediate first tick
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => self.tick().await,
                }
            }
        });
        RepublishHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Handle to a running drain loop.
pub struct RepublishHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RepublishHandle {
    /// Stop the loop. When this returns, the task has exited; no publish is
    /// issued afterwards.
    pub async fn close(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}
