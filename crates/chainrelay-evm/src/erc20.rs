//! ERC20 token event parser.

use crate::fields::{address, passthrough};
use chainrelay_core::{
    EventParser, Network, NormalizedEvent, ParseError, ParseOutcome, RawEvent,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Erc20EventKind {
    Transfer,
    Approval,
}

impl Erc20EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Erc20EventKind::Transfer => "transfer",
            Erc20EventKind::Approval => "approval",
        }
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "Transfer" => Some(Erc20EventKind::Transfer),
            "Approval" => Some(Erc20EventKind::Approval),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Erc20Parser;

impl Erc20Parser {
    pub fn new() -> Self {
        Self
    }
}

impl EventParser for Erc20Parser {
    fn network(&self) -> Network {
        Network::Erc20
    }

    fn parse(&self, raw: &RawEvent) -> Result<ParseOutcome, ParseError> {
        let Some(kind) = Erc20EventKind::from_event_name(&raw.name) else {
            return Ok(ParseOutcome::Unknown);
        };

        let payload = &raw.payload;
        let mut data = Map::new();
        match kind {
            Erc20EventKind::Transfer => {
                data.insert("from".into(), Value::String(address(payload, "from")?));
                data.insert("to".into(), Value::String(address(payload, "to")?));
                passthrough(&mut data, payload, "value");
            }
            Erc20EventKind::Approval => {
                data.insert("owner".into(), Value::String(address(payload, "owner")?));
                data.insert("spender".into(), Value::String(address(payload, "spender")?));
                passthrough(&mut data, payload, "value");
            }
        }
        // Token contract identity distinguishes otherwise identical transfers.
        passthrough(&mut data, payload, "contract");

        Ok(ParseOutcome::Event(NormalizedEvent {
            network: Network::Erc20,
            kind: kind.as_str().to_string(),
            data: Value::Object(data),
            entity: None,
        }))
    }
}
