//! Aave-style governance parser.

use crate::fields::{address, id_string, passthrough};
use chainrelay_core::{
    EntityEventKind, EntityRef, EventParser, Network, NormalizedEvent, ParseError, ParseOutcome,
    RawEvent,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Closed set of recognized Aave governance events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AaveEventKind {
    ProposalCreated,
    VoteEmitted,
    ProposalQueued,
    ProposalExecuted,
    ProposalCanceled,
    DelegateChanged,
    DelegatedPowerChanged,
}

impl AaveEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AaveEventKind::ProposalCreated => "proposal-created",
            AaveEventKind::VoteEmitted => "vote-emitted",
            AaveEventKind::ProposalQueued => "proposal-queued",
            AaveEventKind::ProposalExecuted => "proposal-executed",
            AaveEventKind::ProposalCanceled => "proposal-canceled",
            AaveEventKind::DelegateChanged => "delegate-changed",
            AaveEventKind::DelegatedPowerChanged => "delegated-power-changed",
        }
    }

    /// Map a raw contract event name onto the closed set.
    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "ProposalCreated" => Some(AaveEventKind::ProposalCreated),
            "VoteEmitted" => Some(AaveEventKind::VoteEmitted),
            "ProposalQueued" => Some(AaveEventKind::ProposalQueued),
            "ProposalExecuted" => Some(AaveEventKind::ProposalExecuted),
            "ProposalCanceled" => Some(AaveEventKind::ProposalCanceled),
            "DelegateChanged" => Some(AaveEventKind::DelegateChanged),
            "DelegatedPowerChanged" => Some(AaveEventKind::DelegatedPowerChanged),
            _ => None,
        }
    }

    fn lifecycle(&self) -> Option<EntityEventKind> {
        match self {
            AaveEventKind::ProposalCreated => Some(EntityEventKind::Create),
            AaveEventKind::VoteEmitted => Some(EntityEventKind::Vote),
            AaveEventKind::ProposalQueued => Some(EntityEventKind::Update),
            AaveEventKind::ProposalExecuted | AaveEventKind::ProposalCanceled => {
                Some(EntityEventKind::Complete)
            }
            AaveEventKind::DelegateChanged | AaveEventKind::DelegatedPowerChanged => None,
        }
    }
}

/// Parser for Aave governance contract logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct AaveParser;

impl AaveParser {
    pub fn new() -> Self {
        Self
    }

    fn normalize(&self, kind: AaveEventKind, payload: &Value) -> Result<NormalizedEvent, ParseError> {
        let mut data = Map::new();
        let mut entity = None;

        match kind {
            AaveEventKind::ProposalCreated => {
                let id = id_string(payload, "id")?;
                data.insert("id".into(), Value::String(id.clone()));
                data.insert("proposer".into(), Value::String(address(payload, "proposer")?));
                for f in [
                    "executor",
                    "targets",
                    "values",
                    "signatures",
                    "calldatas",
                    "startBlock",
                    "endBlock",
                    "strategy",
                    "ipfsHash",
                ] {
                    passthrough(&mut data, payload, f);
                }
                entity = lifecycle_ref(kind, &id);
            }
            AaveEventKind::VoteEmitted => {
                let id = id_string(payload, "id")?;
                data.insert("id".into(), Value::String(id.clone()));
                data.insert("voter".into(), Value::String(address(payload, "voter")?));
                passthrough(&mut data, payload, "support");
                passthrough(&mut data, payload, "votingPower");
                entity = lifecycle_ref(kind, &id);
            }
            AaveEventKind::ProposalQueued => {
                let id = id_string(payload, "id")?;
                data.insert("id".into(), Value::String(id.clone()));
                passthrough(&mut data, payload, "executionTime");
                entity = lifecycle_ref(kind, &id);
            }
            AaveEventKind::ProposalExecuted | AaveEventKind::ProposalCanceled => {
                let id = id_string(payload, "id")?;
                data.insert("id".into(), Value::String(id.clone()));
                entity = lifecycle_ref(kind, &id);
            }
            AaveEventKind::DelegateChanged => {
                data.insert("delegator".into(), Value::String(address(payload, "delegator")?));
                data.insert("delegatee".into(), Value::String(address(payload, "delegatee")?));
                passthrough(&mut data, payload, "type");
            }
            AaveEventKind::DelegatedPowerChanged => {
                data.insert("who".into(), Value::String(address(payload, "user")?));
                passthrough(&mut data, payload, "amount");
                passthrough(&mut data, payload, "type");
            }
        }

        Ok(NormalizedEvent {
            network: Network::Aave,
            kind: kind.as_str().to_string(),
            data: Value::Object(data),
            entity,
        })
    }
}

fn lifecycle_ref(kind: AaveEventKind, id: &str) -> Option<EntityRef> {
    kind.lifecycle()
        .map(|lc| EntityRef::new(format!("proposal-{id}"), lc))
}

impl EventParser for AaveParser {
    fn network(&self) -> Network {
        Network::Aave
    }

    fn parse(&self, raw: &RawEvent) -> Result<ParseOutcome, ParseError> {
        match AaveEventKind::from_event_name(&raw.name) {
            Some(kind) => Ok(ParseOutcome::Event(self.normalize(kind, &raw.payload)?)),
            None => Ok(ParseOutcome::Unknown),
        }
    }
}
