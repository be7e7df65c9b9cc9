//! WebSocket transports.
//!
//! Two sources share the connection plumbing:
//!
//! - [`EvmWsSource`] subscribes with `eth_subscribe("logs", filter)` and
//!   decodes the well-known token log signatures (Transfer / Approval /
//!   ApprovalForAll) into named payloads. Logs with an unrecognized topic
//!   keep the topic hash as the event name; the parser downstream reports
//!   them as unknown and the engine drops them.
//! - [`JsonFrameSource`] reads frames that are already decoded JSON objects
//!   `{"name": ..., "payload": ..., "blockNumber": ...}`, the shape produced
//!   by chain adapter services for the non-EVM families.

use async_trait::async_trait;
use chainrelay_core::{ListenerError, Network, RawEvent};
use futures::{channel::mpsc, SinkExt, StreamExt};
use serde_json::{json, Map, Value};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::source::{EventSource, RawEventStream};

// keccak256 signatures of the token events this source decodes
const TOPIC_TRANSFER: &str =
    "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";
const TOPIC_APPROVAL: &str =
    "0x8c5be1e5ebec7d5bd14f71427d1e84f3dd0314c0f7b2291e5b200ac8c7c3b925";
const TOPIC_APPROVAL_FOR_ALL: &str =
    "0x17307eab39ab6107e8899845ad3d59bd9653f200f220920489ca2b5937696c31";

/// EVM WebSocket log source.
pub struct EvmWsSource {
    network: Network,
    chain: String,
    rpc_url: String,
    /// Contract addresses to filter (empty = all)
    filter_addresses: Vec<String>,
}

impl EvmWsSource {
    pub fn new(network: Network, chain: impl Into<String>, rpc_url: impl Into<String>) -> Self {
        Self {
            network,
            chain: chain.into(),
            rpc_url: rpc_url.into(),
            filter_addresses: vec![],
        }
    }

    /// Add a contract address filter.
    pub fn with_address(mut self, addr: impl Into<String>) -> Self {
        self.filter_addresses.push(addr.into());
        self
    }
}

#[async_trait]
impl EventSource for EvmWsSource {
    fn chain_slug(&self) -> &str {
        &self.chain
    }

    async fn connect(&self) -> Result<RawEventStream, ListenerError> {
        let (ws, _) = connect_async(&self.rpc_url).await.map_err(|e| {
            ListenerError::ConnectionFailed {
                url: self.rpc_url.clone(),
                reason: e.to_string(),
            }
        })?;
        info!(url = %self.rpc_url, chain = %self.chain, "websocket connected");

        let (mut write, mut read) = ws.split();
        let filter = if self.filter_addresses.is_empty() {
            json!({})
        } else {
            json!({ "address": self.filter_addresses })
        };
        let sub_msg = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_subscribe",
            "params": ["logs", filter]
        });
        write
            .send(Message::Text(sub_msg.to_string()))
            .await
            .map_err(|_| ListenerError::Closed)?;

        let (mut tx, rx) = mpsc::channel::<Result<RawEvent, ListenerError>>(512);
        let network = self.network;
        let chain = self.chain.clone();
        tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                match msg {
                    Err(e) => {
                        warn!(chain = %chain, error = %e, "websocket error");
                        let _ = tx.send(Err(ListenerError::Closed)).await;
                        break;
                    }
                    Ok(Message::Text(text)) => {
                        debug!(chain = %chain, "ws frame: {}", frame_preview(&text));
                        if let Some(raw) = parse_eth_subscription_log(&text, network, &chain) {
                            if tx.send(Ok(raw)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Ok(Message::Close(_)) => {
                        info!(chain = %chain, "websocket closed by server");
                        let _ = tx.send(Err(ListenerError::Closed)).await;
                        break;
                    }
                    Ok(Message::Ping(data)) => {
                        let _ = write.send(Message::Pong(data)).await;
                    }
                    Ok(_) => {}
                }
            }
        });

        Ok(Box::pin(rx))
    }
}

/// Truncate a frame for debug logging without splitting a UTF-8 character.
fn frame_preview(text: &str) -> &str {
    if text.len() <= 120 {
        return text;
    }
    let mut end = 120;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Parse an `eth_subscription` log message. Returns `None` for subscription
/// confirmations, removed (reorged) logs, and frames with no topics.
fn parse_eth_subscription_log(text: &str, network: Network, chain: &str) -> Option<RawEvent> {
    let v: Value = serde_json::from_str(text).ok()?;
    if v.get("method")?.as_str()? != "eth_subscription" {
        return None;
    }
    let result = v.get("params")?.get("result")?;
    if result.get("removed").and_then(Value::as_bool).unwrap_or(false) {
        return None;
    }

    let address = result.get("address")?.as_str()?.to_lowercase();
    let topics: Vec<&str> = result
        .get("topics")?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .collect();
    let topic0 = *topics.first()?;
    let data_hex = result.get("data").and_then(Value::as_str).unwrap_or("0x");
    let block_number = hex_to_u64(result.get("blockNumber").and_then(Value::as_str));

    let (name, payload) = decode_token_log(topic0, &topics, data_hex, &address);
    Some(RawEvent {
        network,
        chain: chain.to_string(),
        name,
        payload,
        block_number,
    })
}

/// Decode the three token signatures into named fields. Anything else keeps
/// the topic hash as its name and the raw log as payload.
fn decode_token_log(
    topic0: &str,
    topics: &[&str],
    data_hex: &str,
    address: &str,
) -> (String, Value) {
    let mut payload = Map::new();
    payload.insert("contract".into(), Value::String(address.to_string()));

    match topic0 {
        TOPIC_TRANSFER if topics.len() >= 3 => {
            payload.insert("from".into(), Value::String(topic_address(topics[1])));
            payload.insert("to".into(), Value::String(topic_address(topics[2])));
            if topics.len() >= 4 {
                // ERC721: the token id is the third indexed argument
                payload.insert("tokenId".into(), Value::String(quantity(topics[3])));
            } else {
                payload.insert("value".into(), Value::String(quantity(data_hex)));
            }
            ("Transfer".to_string(), Value::Object(payload))
        }
        TOPIC_APPROVAL if topics.len() >= 3 => {
            payload.insert("owner".into(), Value::String(topic_address(topics[1])));
            payload.insert("spender".into(), Value::String(topic_address(topics[2])));
            if topics.len() >= 4 {
                payload.insert("tokenId".into(), Value::String(quantity(topics[3])));
            } else {
                payload.insert("value".into(), Value::String(quantity(data_hex)));
            }
            ("Approval".to_string(), Value::Object(payload))
        }
        TOPIC_APPROVAL_FOR_ALL if topics.len() >= 3 => {
            payload.insert("owner".into(), Value::String(topic_address(topics[1])));
            payload.insert("operator".into(), Value::String(topic_address(topics[2])));
            let approved = data_hex.trim_start_matches("0x").trim_start_matches('0');
            payload.insert("approved".into(), Value::Bool(!approved.is_empty()));
            ("ApprovalForAll".to_string(), Value::Object(payload))
        }
        other => {
            payload.insert(
                "topics".into(),
                Value::Array(
                    topics
                        .iter()
                        .map(|t| Value::String((*t).to_string()))
                        .collect(),
                ),
            );
            payload.insert("data".into(), Value::String(data_hex.to_string()));
            (other.to_string(), Value::Object(payload))
        }
    }
}

/// A 32-byte topic holding an address: keep the low 20 bytes.
fn topic_address(topic: &str) -> String {
    let hex = topic.trim_start_matches("0x");
    if hex.len() >= 40 {
        format!("0x{}", hex[hex.len() - 40..].to_lowercase())
    } else {
        topic.to_lowercase()
    }
}

/// A 32-byte quantity as a decimal string; values beyond u128 keep their hex
/// form.
fn quantity(word: &str) -> String {
    let hex = word.trim_start_matches("0x");
    match u128::from_str_radix(hex, 16) {
        Ok(v) => v.to_string(),
        Err(_) => word.to_string(),
    }
}

fn hex_to_u64(s: Option<&str>) -> u64 {
    s.and_then(|h| u64::from_str_radix(h.trim_start_matches("0x"), 16).ok())
        .unwrap_or(0)
}

/// Generic WebSocket source for feeds that already speak the internal frame
/// shape.
pub struct JsonFrameSource {
    network: Network,
    chain: String,
    url: String,
}

impl JsonFrameSource {
    pub fn new(network: Network, chain: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            network,
            chain: chain.into(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl EventSource for JsonFrameSource {
    fn chain_slug(&self) -> &str {
        &self.chain
    }

    async fn connect(&self) -> Result<RawEventStream, ListenerError> {
        let (ws, _) = connect_async(&self.url).await.map_err(|e| {
            ListenerError::ConnectionFailed {
                url: self.url.clone(),
                reason: e.to_string(),
            }
        })?;
        info!(url = %self.url, chain = %self.chain, "frame feed connected");

        let (_, mut read) = ws.split();
        let (mut tx, rx) = mpsc::channel::<Result<RawEvent, ListenerError>>(512);
        let network = self.network;
        let chain = self.chain.clone();
        tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                match msg {
                    Err(e) => {
                        warn!(chain = %chain, error = %e, "frame feed error");
                        let _ = tx.send(Err(ListenerError::Closed)).await;
                        break;
                    }
                    Ok(Message::Text(text)) => match parse_json_frame(&text, network, &chain) {
                        Some(raw) => {
                            if tx.send(Ok(raw)).await.is_err() {
                                break;
                            }
                        }
                        None => {
                            error!(chain = %chain, "malformed frame, dropping");
                        }
                    },
                    Ok(Message::Close(_)) => {
                        let _ = tx.send(Err(ListenerError::Closed)).await;
                        break;
                    }
                    Ok(_) => {}
                }
            }
        });

        Ok(Box::pin(rx))
    }
}

fn parse_json_frame(text: &str, network: Network, chain: &str) -> Option<RawEvent> {
    let v: Value = serde_json::from_str(text).ok()?;
    let name = v.get("name")?.as_str()?.to_string();
    let payload = v.get("payload")?.clone();
    let block_number = v.get("blockNumber").and_then(Value::as_u64).unwrap_or(0);
    Some(RawEvent {
        network,
        chain: chain.to_string(),
        name,
        payload,
        block_number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_erc20_transfer_log() {
        let msg = format!(
            r#"{{
                "jsonrpc":"2.0","method":"eth_subscription",
                "params":{{"subscription":"0xabc","result":{{
                    "address":"0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
                    "topics":[
                        "{TOPIC_TRANSFER}",
                        "0x000000000000000000000000aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
                        "0x000000000000000000000000bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"
                    ],
                    "data":"0x00000000000000000000000000000000000000000000000000000000000003e8",
                    "blockNumber":"0x1234","removed":false
                }}}}
            }}"#
        );
        let raw = parse_eth_subscription_log(&msg, Network::Erc20, "usdc").unwrap();
        assert_eq!(raw.name, "Transfer");
        assert_eq!(raw.block_number, 0x1234);
        assert_eq!(raw.payload["from"], "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        assert_eq!(raw.payload["value"], "1000");
        assert_eq!(
            raw.payload["contract"],
            "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"
        );
    }

    #[test]
    fn erc721_transfer_carries_token_id() {
        let (name, payload) = decode_token_log(
            TOPIC_TRANSFER,
            &[
                TOPIC_TRANSFER,
                "0x000000000000000000000000aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
                "0x000000000000000000000000bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
                "0x0000000000000000000000000000000000000000000000000000000000000007",
            ],
            "0x",
            "0xcafe",
        );
        assert_eq!(name, "Transfer");
        assert_eq!(payload["tokenId"], "7");
    }

    #[test]
    fn unknown_topic_keeps_hash_as_name() {
        let msg = r#"{
            "jsonrpc":"2.0","method":"eth_subscription",
            "params":{"subscription":"0x1","result":{
                "address":"0x1","topics":["0xfeedface"],"data":"0x","removed":false,
                "blockNumber":"0x1"
            }}
        }"#;
        let raw = parse_eth_subscription_log(msg, Network::Erc20, "usdc").unwrap();
        assert_eq!(raw.name, "0xfeedface");
    }

    #[test]
    fn skips_confirmation_and_removed_logs() {
        let confirmation = r#"{"jsonrpc":"2.0","id":1,"result":"0xsubid"}"#;
        assert!(parse_eth_subscription_log(confirmation, Network::Erc20, "usdc").is_none());

        let removed = r#"{
            "jsonrpc":"2.0","method":"eth_subscription",
            "params":{"subscription":"0x1","result":{
                "address":"0x1","topics":["0x1"],"data":"0x","removed":true,
                "blockNumber":"0x1"
            }}
        }"#;
        assert!(parse_eth_subscription_log(removed, Network::Erc20, "usdc").is_none());
    }

    #[test]
    fn frame_preview_never_splits_a_character() {
        let mut frame = "a".repeat(119);
        frame.push('é');
        frame.push_str(&"b".repeat(50));

        let preview = frame_preview(&frame);
        assert_eq!(preview.len(), 119);
        assert!(frame.starts_with(preview));

        let short = "short frame";
        assert_eq!(frame_preview(short), short);

        let ascii = "c".repeat(200);
        assert_eq!(frame_preview(&ascii).len(), 120);
    }

    #[test]
    fn json_frame_round_trip() {
        let frame = r#"{"name":"democracy.Proposed","payload":{"data":{"proposalIndex":3,"deposit":"100"}},"blockNumber":42}"#;
        let raw = parse_json_frame(frame, Network::Substrate, "edgeware").unwrap();
        assert_eq!(raw.name, "democracy.Proposed");
        assert_eq!(raw.block_number, 42);
        assert_eq!(raw.payload["data"]["proposalIndex"], 3);

        assert!(parse_json_frame("not json", Network::Substrate, "edgeware").is_none());
        assert!(parse_json_frame(r#"{"payload":{}}"#, Network::Substrate, "edgeware").is_none());
    }
}
