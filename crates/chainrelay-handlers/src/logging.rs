//! Structured log emission for an allow-listed set of networks.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chainrelay_core::{ChainEvent, EventHandler, Handled, HandlerError};
use tracing::{info, Span};

/// Logs events whose network name is on the configured allow-list.
///
/// Matching is case-sensitive. One span per matched network is created
/// lazily on first match and reused afterwards, so the common non-match path
/// allocates nothing.
pub struct LoggingHandler {
    allowed: Vec<String>,
    spans: RwLock<HashMap<String, Span>>,
}

impl LoggingHandler {
    pub fn new(allowed: Vec<String>) -> Self {
        Self {
            allowed,
            spans: RwLock::new(HashMap::new()),
        }
    }

    fn span_for(&self, network: &str) -> Span {
        if let Some(span) = self
            .spans
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(network)
        {
            return span.clone();
        }
        let mut spans = self.spans.write().unwrap_or_else(|e| e.into_inner());
        spans
            .entry(network.to_string())
            .or_insert_with(|| tracing::info_span!("chain_events", network = %network))
            .clone()
    }
}

#[async_trait]
impl EventHandler for LoggingHandler {
    fn name(&self) -> &'static str {
        "logging"
    }

    async fn handle(&self, event: &ChainEvent) -> Result<Handled, HandlerError> {
        let network = event.network.as_str();
        if !self.allowed.iter().any(|name| name == network) {
            return Ok(Handled::Skipped);
        }
        let span = self.span_for(network);
        let _guard = span.enter();
        info!(
            kind = %event.kind,
            block = event.block_number,
            entity = event.entity_key.as_deref().unwrap_or("-"),
            "chain event"
        );
        Ok(Handled::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainrelay_core::Network;
    use serde_json::json;

    fn event(network: Network) -> ChainEvent {
        ChainEvent {
            id: 1,
            network,
            block_number: 8,
            kind: "transfer".into(),
            data: json!({}),
            hash: "h".into(),
            entity_key: None,
        }
    }

    #[tokio::test]
    async fn unlisted_network_is_skipped() {
        let handler = LoggingHandler::new(vec!["aave".into()]);
        let out = handler.handle(&event(Network::Erc20)).await.unwrap();
        assert_eq!(out, Handled::Skipped);
        assert!(handler.spans.read().unwrap().is_empty());
    }

    #[tokio::test]
    async fn match_is_case_sensitive() {
        let handler = LoggingHandler::new(vec!["Aave".into()]);
        let out = handler.handle(&event(Network::Aave)).await.unwrap();
        assert_eq!(out, Handled::Skipped);
    }

    #[tokio::test]
    async fn matched_network_reuses_one_span() {
        let handler = LoggingHandler::new(vec!["aave".into()]);
        for _ in 0..3 {
            let out = handler.handle(&event(Network::Aave)).await.unwrap();
            assert_eq!(out, Handled::Done);
        }
        assert_eq!(handler.spans.read().unwrap().len(), 1);
    }
}
