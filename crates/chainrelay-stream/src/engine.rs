//! Pipeline engine: raw events in, published chain events out.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use chainrelay_bus::{EventPublisher, PublishOutcome};
use chainrelay_core::{
    EventParser, EventProcessor, Network, ParseOutcome, Processed, RawEvent, StoreError,
};
use chainrelay_cosmos::CosmosParser;
use chainrelay_evm::{AaveParser, CompoundParser, Erc20Parser, Erc721Parser};
use chainrelay_store::{Endpoint, ListenerConfig, ListenerConfigStore};
use chainrelay_substrate::SubstrateParser;

use crate::listener::Listener;
use crate::source::EventSource;
use crate::ws_source::{EvmWsSource, JsonFrameSource};

/// Drives raw events through parse, dedup, and publish.
///
/// Parsing failures and unknown event names are logged and dropped; one bad
/// event never takes the pipeline down. Duplicates from reconnect replay are
/// absorbed silently.
pub struct PipelineEngine {
    parsers: HashMap<Network, Arc<dyn EventParser>>,
    processor: EventProcessor,
    publisher: EventPublisher,
    listeners: Mutex<Vec<Listener>>,
}

impl PipelineEngine {
    /// Engine with the full parser set registered.
    pub fn new(processor: EventProcessor, publisher: EventPublisher) -> Self {
        let mut parsers: HashMap<Network, Arc<dyn EventParser>> = HashMap::new();
        parsers.insert(Network::Substrate, Arc::new(SubstrateParser::new()));
        parsers.insert(Network::Aave, Arc::new(AaveParser::new()));
        parsers.insert(Network::Compound, Arc::new(CompoundParser::new()));
        parsers.insert(Network::Cosmos, Arc::new(CosmosParser::new()));
        parsers.insert(Network::Erc20, Arc::new(Erc20Parser::new()));
        parsers.insert(Network::Erc721, Arc::new(Erc721Parser::new()));
        Self {
            parsers,
            processor,
            publisher,
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Spawn a listener for every active config. Returns the channel the
    /// listeners feed; pass it to [`PipelineEngine::run`].
    pub async fn start_listeners(
        &self,
        configs: Arc<dyn ListenerConfigStore>,
    ) -> Result<mpsc::UnboundedReceiver<RawEvent>, StoreError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let active = configs.active_configs().await?;
        let mut listeners = self.listeners.lock().await;
        for (config, endpoint) in active {
            info!(
                chain = %config.chain_id,
                network = %config.network,
                url = %endpoint.url,
                "starting listener"
            );
            let source = build_source(&config, &endpoint);
            listeners.push(Listener::spawn(source, tx.clone()));
        }
        Ok(rx)
    }

    /// Consume the raw event channel until every sender is gone.
    pub async fn run(&self, mut rx: mpsc::UnboundedReceiver<RawEvent>) {
        while let Some(raw) = rx.recv().await {
            self.handle_raw(raw).await;
        }
        info!("raw event channel closed, engine loop done");
    }

    /// Process a single raw event end to end.
    pub async fn handle_raw(&self, raw: RawEvent) {
        let Some(parser) = self.parsers.get(&raw.network) else {
            warn!(network = %raw.network, "no parser registered");
            return;
        };

        let normalized = match parser.parse(&raw) {
            Ok(ParseOutcome::Event(ev)) => ev,
            Ok(ParseOutcome::Unknown) => {
                warn!(network = %raw.network, name = %raw.name, "unrecognized event, dropping");
                return;
            }
            Err(e) => {
                error!(network = %raw.network, name = %raw.name, error = %e, "parse failed");
                return;
            }
        };

        let event = match self.processor.process(normalized, raw.block_number).await {
            Ok(Processed::Created(event)) => event,
            Ok(Processed::Duplicate) => {
                debug!(network = %raw.network, name = %raw.name, "duplicate event");
                return;
            }
            Err(e) => {
                error!(network = %raw.network, error = %e, "event processing failed");
                return;
            }
        };

        match self.publisher.publish(&event).await {
            Ok(PublishOutcome::Acked) => {
                debug!(id = event.id, kind = %event.kind, "event published");
            }
            Ok(PublishOutcome::Deferred) => {
                // queued in the outbox, the republish daemon takes it from here
            }
            Err(e) => {
                error!(id = event.id, error = %e, "publish failed and outbox write failed");
            }
        }
    }

    /// Stop every listener. Already-forwarded events still drain through
    /// [`PipelineEngine::run`] before its channel closes.
    pub async fn shutdown(&self) {
        let listeners: Vec<Listener> = self.listeners.lock().await.drain(..).collect();
        for listener in listeners {
            info!(chain = %listener.chain(), "stopping listener");
            listener.stop().await;
        }
    }
}

/// Pick the transport for a listener config. Ethereum-based chains get the
/// raw log source; everything else connects to an adapter feed that already
/// emits decoded frames.
pub fn build_source(config: &ListenerConfig, endpoint: &Endpoint) -> Arc<dyn EventSource> {
    if config.base == "ethereum" {
        let mut source = EvmWsSource::new(config.network, &config.chain_id, &endpoint.url);
        if let Some(addr) = &config.contract_address {
            source = source.with_address(addr);
        }
        Arc::new(source)
    } else {
        Arc::new(JsonFrameSource::new(
            config.network,
            &config.chain_id,
            &endpoint.url,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainrelay_bus::InMemoryBus;
    use chainrelay_store::MemoryStore;
    use serde_json::json;

    fn engine_with_bus() -> (
        Arc<MemoryStore>,
        Arc<InMemoryBus>,
        PipelineEngine,
        mpsc::UnboundedReceiver<chainrelay_bus::BusMessage>,
    ) {
        let store = Arc::new(MemoryStore::new());
        let bus = Arc::new(InMemoryBus::new());
        let delivered = bus.subscribe("chain-events.#");
        let processor = EventProcessor::new(store.clone());
        let publisher = EventPublisher::new(bus.clone(), store.clone());
        (store.clone(), bus, PipelineEngine::new(processor, publisher), delivered)
    }

    fn substrate_raw(name: &str, payload: serde_json::Value) -> RawEvent {
        RawEvent {
            network: Network::Substrate,
            chain: "edgeware".into(),
            name: name.into(),
            payload,
            block_number: 500,
        }
    }

    #[tokio::test]
    async fn raw_event_flows_to_store_and_bus() {
        let (_store, _bus, engine, mut delivered) = engine_with_bus();

        engine
            .handle_raw(substrate_raw(
                "democracy.Proposed",
                json!({"data": {"proposalIndex": 7, "deposit": "1000"}}),
            ))
            .await;

        let msg = delivered.recv().await.unwrap();
        assert_eq!(msg.routing_key, "chain-events.substrate");
        assert_eq!(msg.payload["kind"], "democracy-proposed");
        assert_eq!(msg.payload["entity_key"], "democracy-proposal-7");
    }

    #[tokio::test]
    async fn unknown_event_is_dropped() {
        let (_store, _bus, engine, mut delivered) = engine_with_bus();

        engine
            .handle_raw(substrate_raw("parachains.CandidateIncluded", json!({})))
            .await;

        assert!(delivered.try_recv().is_err());
    }

    #[tokio::test]
    async fn replayed_event_publishes_once() {
        let (_store, _bus, engine, mut delivered) = engine_with_bus();
        let raw = substrate_raw(
            "balances.Transfer",
            json!({"data": {"sender": "5A", "dest": "5B", "value": "9"}}),
        );

        engine.handle_raw(raw.clone()).await;
        engine.handle_raw(raw).await;

        assert!(delivered.recv().await.is_some());
        assert!(delivered.try_recv().is_err());
    }

    #[tokio::test]
    async fn malformed_payload_is_dropped_without_rows() {
        let (_store, _bus, engine, mut delivered) = engine_with_bus();

        engine
            .handle_raw(substrate_raw("balances.Transfer", json!({"data": {}})))
            .await;

        assert!(delivered.try_recv().is_err());
    }

    #[test]
    fn source_selection_follows_base() {
        let endpoint = Endpoint {
            id: 1,
            url: "wss://node.example/ws".into(),
        };
        let config = ListenerConfig {
            id: 1,
            chain_id: "usdc".into(),
            spec: json!({}),
            contract_address: Some("0xa0b8".into()),
            network: Network::Erc20,
            base: "ethereum".into(),
            url_id: 1,
            verbose_logging: false,
            active: true,
        };
        let source = build_source(&config, &endpoint);
        assert_eq!(source.chain_slug(), "usdc");

        let config = ListenerConfig {
            chain_id: "edgeware".into(),
            network: Network::Substrate,
            base: "substrate".into(),
            contract_address: None,
            ..config
        };
        let source = build_source(&config, &endpoint);
        assert_eq!(source.chain_slug(), "edgeware");
    }
}
