//! Compound-style (GovernorAlpha/Bravo) governance parser.

use crate::fields::{address, id_string, passthrough};
use chainrelay_core::{
    EntityEventKind, EntityRef, EventParser, Network, NormalizedEvent, ParseError, ParseOutcome,
    RawEvent,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Closed set of recognized Compound governance events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompoundEventKind {
    ProposalCreated,
    VoteCast,
    ProposalQueued,
    ProposalExecuted,
    ProposalCanceled,
    DelegateChanged,
    DelegateVotesChanged,
}

impl CompoundEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompoundEventKind::ProposalCreated => "proposal-created",
            CompoundEventKind::VoteCast => "vote-cast",
            CompoundEventKind::ProposalQueued => "proposal-queued",
            CompoundEventKind::ProposalExecuted => "proposal-executed",
            CompoundEventKind::ProposalCanceled => "proposal-canceled",
            CompoundEventKind::DelegateChanged => "delegate-changed",
            CompoundEventKind::DelegateVotesChanged => "delegate-votes-changed",
        }
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "ProposalCreated" => Some(CompoundEventKind::ProposalCreated),
            "VoteCast" => Some(CompoundEventKind::VoteCast),
            "ProposalQueued" => Some(CompoundEventKind::ProposalQueued),
            "ProposalExecuted" => Some(CompoundEventKind::ProposalExecuted),
            "ProposalCanceled" => Some(CompoundEventKind::ProposalCanceled),
            "DelegateChanged" => Some(CompoundEventKind::DelegateChanged),
            "DelegateVotesChanged" => Some(CompoundEventKind::DelegateVotesChanged),
            _ => None,
        }
    }

    fn lifecycle(&self) -> Option<EntityEventKind> {
        match self {
            CompoundEventKind::ProposalCreated => Some(EntityEventKind::Create),
            CompoundEventKind::VoteCast => Some(EntityEventKind::Vote),
            CompoundEventKind::ProposalQueued => Some(EntityEventKind::Update),
            CompoundEventKind::ProposalExecuted | CompoundEventKind::ProposalCanceled => {
                Some(EntityEventKind::Complete)
            }
            CompoundEventKind::DelegateChanged | CompoundEventKind::DelegateVotesChanged => None,
        }
    }
}

/// Parser for Compound governance contract logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct CompoundParser;

impl CompoundParser {
    pub fn new() -> Self {
        Self
    }

    fn normalize(
        &self,
        kind: CompoundEventKind,
        payload: &Value,
    ) -> Result<NormalizedEvent, ParseError> {
        let mut data = Map::new();
        let mut entity = None;

        match kind {
            CompoundEventKind::ProposalCreated => {
                let id = id_string(payload, "id")?;
                data.insert("id".into(), Value::String(id.clone()));
                data.insert("proposer".into(), Value::String(address(payload, "proposer")?));
                for f in [
                    "targets",
                    "values",
                    "signatures",
                    "calldatas",
                    "startBlock",
                    "endBlock",
                    "description",
                ] {
                    passthrough(&mut data, payload, f);
                }
                entity = lifecycle_ref(kind, &id);
            }
            CompoundEventKind::VoteCast => {
                let id = id_string(payload, "proposalId")?;
                data.insert("id".into(), Value::String(id.clone()));
                data.insert("voter".into(), Value::String(address(payload, "voter")?));
                passthrough(&mut data, payload, "support");
                passthrough(&mut data, payload, "votes");
                entity = lifecycle_ref(kind, &id);
            }
            CompoundEventKind::ProposalQueued => {
                let id = id_string(payload, "id")?;
                data.insert("id".into(), Value::String(id.clone()));
                passthrough(&mut data, payload, "eta");
                entity = lifecycle_ref(kind, &id);
            }
            CompoundEventKind::ProposalExecuted | CompoundEventKind::ProposalCanceled => {
                let id = id_string(payload, "id")?;
                data.insert("id".into(), Value::String(id.clone()));
                entity = lifecycle_ref(kind, &id);
            }
            CompoundEventKind::DelegateChanged => {
                data.insert(
                    "delegator".into(),
                    Value::String(address(payload, "delegator")?),
                );
                data.insert(
                    "toDelegate".into(),
                    Value::String(address(payload, "toDelegate")?),
                );
                passthrough(&mut data, payload, "fromDelegate");
            }
            CompoundEventKind::DelegateVotesChanged => {
                data.insert("delegate".into(), Value::String(address(payload, "delegate")?));
                passthrough(&mut data, payload, "previousBalance");
                passthrough(&mut data, payload, "newBalance");
            }
        }

        Ok(NormalizedEvent {
            network: Network::Compound,
            kind: kind.as_str().to_string(),
            data: Value::Object(data),
            entity,
        })
    }
}

fn lifecycle_ref(kind: CompoundEventKind, id: &str) -> Option<EntityRef> {
    kind.lifecycle()
        .map(|lc| EntityRef::new(format!("proposal-{id}"), lc))
}

impl EventParser for CompoundParser {
    fn network(&self) -> Network {
        Network::Compound
    }

    fn parse(&self, raw: &RawEvent) -> Result<ParseOutcome, ParseError> {
        match CompoundEventKind::from_event_name(&raw.name) {
            Some(kind) => Ok(ParseOutcome::Event(self.normalize(kind, &raw.payload)?)),
            None => Ok(ParseOutcome::Unknown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(name: &str, payload: Value) -> RawEvent {
        RawEvent {
            network: Network::Compound,
            chain: "uniswap".into(),
            name: name.into(),
            payload,
            block_number: 500,
        }
    }

    #[test]
    fn vote_cast_uses_proposal_id_field() {
        let out = CompoundParser::new()
            .parse(&raw(
                "VoteCast",
                json!({"proposalId": 12, "voter": "0xV", "support": true, "votes": "100"}),
            ))
            .unwrap();
        let ParseOutcome::Event(ev) = out else {
            panic!("expected parsed event");
        };
        assert_eq!(ev.kind, "vote-cast");
        assert_eq!(ev.data["id"], "12");
        assert_eq!(ev.entity.unwrap().lifecycle, EntityEventKind::Vote);
    }

    #[test]
    fn canceled_completes_lifecycle() {
        let out = CompoundParser::new()
            .parse(&raw("ProposalCanceled", json!({"id": 12})))
            .unwrap();
        let ParseOutcome::Event(ev) = out else {
            panic!("expected parsed event");
        };
        let entity = ev.entity.unwrap();
        assert_eq!(entity.key, "proposal-12");
        assert_eq!(entity.lifecycle, EntityEventKind::Complete);
    }

    #[test]
    fn unknown_name_tolerated() {
        let out = CompoundParser::new()
            .parse(&raw("NewVoteWeightingScheme", json!({})))
            .unwrap();
        assert_eq!(out, ParseOutcome::Unknown);
    }

    #[test]
    fn delegate_changed_has_no_entity() {
        let out = CompoundParser::new()
            .parse(&raw(
                "DelegateChanged",
                json!({"delegator": "0xA", "toDelegate": "0xB", "fromDelegate": "0x0"}),
            ))
            .unwrap();
        let ParseOutcome::Event(ev) = out else {
            panic!("expected parsed event");
        };
        assert!(ev.entity.is_none());
    }
}
