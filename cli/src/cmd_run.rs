//! `chainrelay run`: wire the whole pipeline from a YAML config and run it
//! until interrupted.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use chainrelay_bus::{EventPublisher, InMemoryBus, RepublishDaemon};
use chainrelay_core::{EventHandler, EventProcessor, Network};
use chainrelay_handlers::{Dispatcher, LoggingHandler, NotificationHandler, WebhookHandler};
use chainrelay_observability::{init_tracing, LogConfig};
use chainrelay_store::{ListenerConfigStore, NewListenerConfig, SqliteStore};
use chainrelay_stream::PipelineEngine;

#[derive(Debug, Deserialize)]
pub struct RunConfig {
    /// SQLite database path, ":memory:" for a throwaway store
    #[serde(default = "default_store")]
    store: String,
    #[serde(default)]
    log: LogConfig,
    #[serde(default = "default_republish_interval")]
    republish_interval_ms: i64,
    /// Networks the logging handler reports on
    #[serde(default)]
    log_networks: Vec<String>,
    /// Listener rows to seed into the store before startup
    #[serde(default)]
    listeners: Vec<ListenerEntry>,
}

#[derive(Debug, Deserialize)]
struct ListenerEntry {
    chain_id: String,
    network: Network,
    /// Protocol base: "substrate" | "ethereum" | "cosmos"
    base: String,
    url: String,
    #[serde(default)]
    contract_address: Option<String>,
    #[serde(default)]
    spec: serde_json::Value,
    #[serde(default)]
    verbose_logging: bool,
    #[serde(default = "default_true")]
    active: bool,
}

fn default_store() -> String {
    "chainrelay.db".into()
}

fn default_republish_interval() -> i64 {
    5_000
}

fn default_true() -> bool {
    true
}

pub async fn run(config_path: &str) -> Result<()> {
    let text = std::fs::read_to_string(config_path)
        .with_context(|| format!("read config '{config_path}'"))?;
    let config: RunConfig = serde_yaml::from_str(&text).context("parse run config")?;
    init_tracing(&config.log);

    let store = if config.store == ":memory:" {
        Arc::new(SqliteStore::in_memory()?)
    } else {
        Arc::new(SqliteStore::open(&config.store)?)
    };
    seed_listeners(&store, &config.listeners).await?;

    let bus = Arc::new(InMemoryBus::new());

    let handlers: Vec<Arc<dyn EventHandler>> = vec![
        Arc::new(LoggingHandler::new(config.log_networks.clone())),
        Arc::new(WebhookHandler::new(store.clone())?),
        Arc::new(NotificationHandler::new(store.clone(), store.clone())),
    ];
    let dispatcher = Dispatcher::new(handlers);
    let delivered = bus.subscribe("chain-events.#");
    let dispatcher_task = tokio::spawn(async move { dispatcher.run(delivered).await });

    let daemon = RepublishDaemon::new(
        bus.clone(),
        store.clone(),
        store.clone(),
        config.republish_interval_ms,
    )?;
    let daemon_handle = daemon.spawn();

    let processor = EventProcessor::new(store.clone());
    let publisher = EventPublisher::new(bus.clone(), store.clone());
    let engine = Arc::new(PipelineEngine::new(processor, publisher));
    let raw_events = engine.start_listeners(store.clone()).await?;
    let engine_task = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.run(raw_events).await })
    };

    info!("pipeline running, ctrl-c to stop");
    tokio::signal::ctrl_c().await.context("wait for ctrl-c")?;

    info!("shutting down");
    engine.shutdown().await;
    engine_task.await.ok();
    daemon_handle.close().await;
    dispatcher_task.abort();
    Ok(())
}

/// Register configured listeners, skipping chains that already have an
/// active config.
async fn seed_listeners(store: &Arc<SqliteStore>, entries: &[ListenerEntry]) -> Result<()> {
    let existing = store.active_configs().await?;
    for entry in entries {
        if existing.iter().any(|(c, _)| c.chain_id == entry.chain_id) {
            continue;
        }
        let endpoint = store.add_endpoint(&entry.url).await?;
        store
            .insert_config(NewListenerConfig {
                chain_id: entry.chain_id.clone(),
                spec: entry.spec.clone(),
                contract_address: entry.contract_address.clone(),
                network: entry.network,
                base: entry.base.clone(),
                url_id: endpoint.id,
                verbose_logging: entry.verbose_logging,
                active: entry.active,
            })
            .await?;
        info!(chain = %entry.chain_id, network = %entry.network, "listener config registered");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_parses_with_defaults() {
        let cfg: RunConfig = serde_yaml::from_str("store: \":memory:\"").unwrap();
        assert_eq!(cfg.store, ":memory:");
        assert_eq!(cfg.republish_interval_ms, 5_000);
        assert!(cfg.listeners.is_empty());
    }

    #[test]
    fn full_config_parses() {
        let yaml = r#"
store: events.db
republish_interval_ms: 2000
log:
  level: debug
  json: true
log_networks: [substrate, erc20]
listeners:
  - chain_id: edgeware
    network: substrate
    base: substrate
    url: wss://mainnet.edgewa.re
  - chain_id: usdc
    network: erc20
    base: ethereum
    url: wss://eth.example/ws
    contract_address: "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"
    active: false
"#;
        let cfg: RunConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.listeners.len(), 2);
        assert_eq!(cfg.listeners[0].network, Network::Substrate);
        assert!(cfg.listeners[0].active);
        assert!(!cfg.listeners[1].active);
        assert_eq!(
            cfg.listeners[1].contract_address.as_deref(),
            Some("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48")
        );
    }
}
