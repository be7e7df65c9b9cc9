//! # chainrelay-cosmos
//!
//! Cosmos-family governance event parser. Recognizes the `gov` module's
//! proposal lifecycle messages as surfaced through Tendermint event
//! attributes.

use chainrelay_core::{
    EntityEventKind, EntityRef, EventParser, Network, NormalizedEvent, ParseError, ParseOutcome,
    RawEvent,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Closed set of recognized Cosmos governance events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CosmosEventKind {
    SubmitProposal,
    Deposit,
    Vote,
}

impl CosmosEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CosmosEventKind::SubmitProposal => "submit-proposal",
            CosmosEventKind::Deposit => "deposit",
            CosmosEventKind::Vote => "vote",
        }
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "submit_proposal" => Some(CosmosEventKind::SubmitProposal),
            "proposal_deposit" => Some(CosmosEventKind::Deposit),
            "proposal_vote" => Some(CosmosEventKind::Vote),
            _ => None,
        }
    }

    fn lifecycle(&self) -> EntityEventKind {
        match self {
            CosmosEventKind::SubmitProposal => EntityEventKind::Create,
            CosmosEventKind::Deposit => EntityEventKind::Update,
            CosmosEventKind::Vote => EntityEventKind::Vote,
        }
    }
}

/// Parser for Cosmos gov module events.
#[derive(Debug, Default, Clone, Copy)]
pub struct CosmosParser;

impl CosmosParser {
    pub fn new() -> Self {
        Self
    }
}

fn proposal_id(payload: &Value) -> Result<String, ParseError> {
    match payload.get("proposal_id") {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(ParseError::InvalidField {
            field: "proposal_id".into(),
            reason: "expected a string or number".into(),
        }),
        None => Err(ParseError::MissingField {
            field: "proposal_id".into(),
        }),
    }
}

fn copy_str(data: &mut Map<String, Value>, payload: &Value, field: &str) {
    if let Some(Value::String(s)) = payload.get(field) {
        data.insert(field.to_string(), Value::String(s.clone()));
    }
}

impl EventParser for CosmosParser {
    fn network(&self) -> Network {
        Network::Cosmos
    }

    fn parse(&self, raw: &RawEvent) -> Result<ParseOutcome, ParseError> {
        let Some(kind) = CosmosEventKind::from_event_name(&raw.name) else {
            return Ok(ParseOutcome::Unknown);
        };

        let payload = &raw.payload;
        let id = proposal_id(payload)?;
        let mut data = Map::new();
        data.insert("proposalId".into(), Value::String(id.clone()));

        match kind {
            CosmosEventKind::SubmitProposal => {
                copy_str(&mut data, payload, "proposal_type");
                copy_str(&mut data, payload, "proposer");
                copy_str(&mut data, payload, "content");
            }
            CosmosEventKind::Deposit => {
                copy_str(&mut data, payload, "depositor");
                copy_str(&mut data, payload, "amount");
            }
            CosmosEventKind::Vote => {
                copy_str(&mut data, payload, "voter");
                copy_str(&mut data, payload, "option");
            }
        }

        Ok(ParseOutcome::Event(NormalizedEvent {
            network: Network::Cosmos,
            kind: kind.as_str().to_string(),
            data: Value::Object(data),
            entity: Some(EntityRef::new(format!("proposal-{id}"), kind.lifecycle())),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(name: &str, payload: Value) -> RawEvent {
        RawEvent {
            network: Network::Cosmos,
            chain: "osmosis".into(),
            name: name.into(),
            payload,
            block_number: 42,
        }
    }

    #[test]
    fn submit_proposal_creates_entity() {
        let out = CosmosParser::new()
            .parse(&raw(
                "submit_proposal",
                json!({"proposal_id": "55", "proposer": "osmo1abc", "proposal_type": "Text"}),
            ))
            .unwrap();
        let ParseOutcome::Event(ev) = out else {
            panic!("expected parsed event");
        };
        assert_eq!(ev.kind, "submit-proposal");
        assert_eq!(ev.data["proposalId"], "55");
        let entity = ev.entity.unwrap();
        assert_eq!(entity.key, "proposal-55");
        assert_eq!(entity.lifecycle, EntityEventKind::Create);
    }

    #[test]
    fn vote_links_to_same_entity() {
        let out = CosmosParser::new()
            .parse(&raw(
                "proposal_vote",
                json!({"proposal_id": 55, "voter": "osmo1def", "option": "VOTE_OPTION_YES"}),
            ))
            .unwrap();
        let ParseOutcome::Event(ev) = out else {
            panic!("expected parsed event");
        };
        assert_eq!(ev.entity.unwrap().key, "proposal-55");
    }

    #[test]
    fn unknown_module_event_is_sentinel() {
        let out = CosmosParser::new()
            .parse(&raw("ibc_transfer", json!({})))
            .unwrap();
        assert_eq!(out, ParseOutcome::Unknown);
    }

    #[test]
    fn missing_proposal_id_is_malformed() {
        let err = CosmosParser::new()
            .parse(&raw("proposal_deposit", json!({"depositor": "osmo1x"})))
            .unwrap_err();
        assert!(err.to_string().contains("proposal_id"));
    }
}
