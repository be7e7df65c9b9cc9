//! ERC721 token event parser.

use crate::fields::{address, id_string, passthrough};
use chainrelay_core::{
    EventParser, Network, NormalizedEvent, ParseError, ParseOutcome, RawEvent,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Erc721EventKind {
    Transfer,
    Approval,
    ApprovalForAll,
}

impl Erc721EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Erc721EventKind::Transfer => "transfer",
            Erc721EventKind::Approval => "approval",
            Erc721EventKind::ApprovalForAll => "approval-for-all",
        }
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "Transfer" => Some(Erc721EventKind::Transfer),
            "Approval" => Some(Erc721EventKind::Approval),
            "ApprovalForAll" => Some(Erc721EventKind::ApprovalForAll),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Erc721Parser;

impl Erc721Parser {
    pub fn new() -> Self {
        Self
    }
}

impl EventParser for Erc721Parser {
    fn network(&self) -> Network {
        Network::Erc721
    }

    fn parse(&self, raw: &RawEvent) -> Result<ParseOutcome, ParseError> {
        let Some(kind) = Erc721EventKind::from_event_name(&raw.name) else {
            return Ok(ParseOutcome::Unknown);
        };

        let payload = &raw.payload;
        let mut data = Map::new();
        match kind {
            Erc721EventKind::Transfer => {
                data.insert("from".into(), Value::String(address(payload, "from")?));
                data.insert("to".into(), Value::String(address(payload, "to")?));
                data.insert(
                    "tokenId".into(),
                    Value::String(id_string(payload, "tokenId")?),
                );
            }
            Erc721EventKind::Approval => {
                data.insert("owner".into(), Value::String(address(payload, "owner")?));
                data.insert("approved".into(), Value::String(address(payload, "approved")?));
                data.insert(
                    "tokenId".into(),
                    Value::String(id_string(payload, "tokenId")?),
                );
            }
            Erc721EventKind::ApprovalForAll => {
                data.insert("owner".into(), Value::String(address(payload, "owner")?));
                data.insert("operator".into(), Value::String(address(payload, "operator")?));
                passthrough(&mut data, payload, "approved");
            }
        }
        passthrough(&mut data, payload, "contract");

        Ok(ParseOutcome::Event(NormalizedEvent {
            network: Network::Erc721,
            kind: kind.as_str().to_string(),
            data: Value::Object(data),
            entity: None,
        }))
    }
}
