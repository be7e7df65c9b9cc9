//! # chainrelay-substrate
//!
//! Substrate-family event parser. Covers staking, balances, democracy,
//! preimage, treasury, and offence events.
//!
//! Substrate runtimes changed how event fields are delivered: current
//! runtimes attach a named `data` object, older ones only a positional
//! `params` array. The parser prefers the named form and falls back to the
//! positional form only when the named form is absent entirely: a missing
//! field inside a present `data` object is a malformed payload, not a reason
//! to fall back.

mod fields;
mod kind;

pub use kind::SubstrateEventKind;

use chainrelay_core::{
    EntityEventKind, EntityRef, EventParser, Network, NormalizedEvent, ParseError, ParseOutcome,
    RawEvent,
};
use fields::Fields;
use serde_json::{Map, Value};

/// Parser for Substrate chain events.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubstrateParser;

impl SubstrateParser {
    pub fn new() -> Self {
        Self
    }

    fn normalize(
        &self,
        kind: SubstrateEventKind,
        payload: &Value,
    ) -> Result<NormalizedEvent, ParseError> {
        let fields = Fields::from_payload(payload);
        let mut data = Map::new();
        let mut entity = None;

        use SubstrateEventKind as K;
        match kind {
            K::BalanceTransfer => {
                data.insert("sender".into(), fields.string("sender", 0)?);
                data.insert("dest".into(), fields.string("dest", 1)?);
                data.insert("value".into(), fields.balance("value", 2)?);
            }
            K::Slash => {
                data.insert("validator".into(), fields.string("validator", 0)?);
                data.insert("amount".into(), fields.balance("amount", 1)?);
            }
            K::Reward => {
                data.insert("validator".into(), fields.string("validator", 0)?);
                data.insert("amount".into(), fields.balance("amount", 1)?);
            }
            K::Bonded | K::Unbonded => {
                data.insert("stash".into(), fields.string("stash", 0)?);
                data.insert("amount".into(), fields.balance("amount", 1)?);
            }
            K::Offence => {
                data.insert("kind".into(), fields.string("kind", 0)?);
                data.insert("opaqueTimeSlot".into(), fields.string("opaqueTimeSlot", 1)?);
            }
            K::DemocracyProposed => {
                let index = fields.index("proposalIndex", 0)?;
                data.insert("proposalIndex".into(), Value::String(index.clone()));
                data.insert("deposit".into(), fields.balance("deposit", 1)?);
                entity = Some(EntityRef::new(
                    format!("democracy-proposal-{index}"),
                    EntityEventKind::Create,
                ));
            }
            K::DemocracySeconded => {
                let index = fields.index("proposalIndex", 0)?;
                data.insert("proposalIndex".into(), Value::String(index.clone()));
                data.insert("who".into(), fields.string("who", 1)?);
                entity = Some(EntityRef::new(
                    format!("democracy-proposal-{index}"),
                    EntityEventKind::Vote,
                ));
            }
            K::DemocracyTabled => {
                let index = fields.index("proposalIndex", 0)?;
                data.insert("proposalIndex".into(), Value::String(index.clone()));
                entity = Some(EntityRef::new(
                    format!("democracy-proposal-{index}"),
                    EntityEventKind::Complete,
                ));
            }
            K::DemocracyStarted => {
                let index = fields.index("referendumIndex", 0)?;
                data.insert("referendumIndex".into(), Value::String(index.clone()));
                data.insert("voteThreshold".into(), fields.string("voteThreshold", 1)?);
                entity = Some(EntityRef::new(
                    format!("democracy-referendum-{index}"),
                    EntityEventKind::Create,
                ));
            }
            K::DemocracyVoted => {
                let index = fields.index("referendumIndex", 0)?;
                data.insert("referendumIndex".into(), Value::String(index.clone()));
                data.insert("who".into(), fields.string("who", 1)?);
                entity = Some(EntityRef::new(
                    format!("democracy-referendum-{index}"),
                    EntityEventKind::Vote,
                ));
            }
            K::DemocracyPassed => {
                let index = fields.index("referendumIndex", 0)?;
                data.insert("referendumIndex".into(), Value::String(index.clone()));
                entity = Some(EntityRef::new(
                    format!("democracy-referendum-{index}"),
                    EntityEventKind::Update,
                ));
            }
            K::DemocracyNotPassed | K::DemocracyCancelled | K::DemocracyExecuted => {
                let index = fields.index("referendumIndex", 0)?;
                data.insert("referendumIndex".into(), Value::String(index.clone()));
                entity = Some(EntityRef::new(
                    format!("democracy-referendum-{index}"),
                    EntityEventKind::Complete,
                ));
            }
            K::PreimageNoted => {
                let hash = fields.index("proposalHash", 0)?;
                data.insert("proposalHash".into(), Value::String(hash.clone()));
                data.insert("noter".into(), fields.string("noter", 1)?);
                entity = Some(EntityRef::new(
                    format!("democracy-preimage-{hash}"),
                    EntityEventKind::Create,
                ));
            }
            K::PreimageUsed | K::PreimageInvalid | K::PreimageReaped => {
                let hash = fields.index("proposalHash", 0)?;
                data.insert("proposalHash".into(), Value::String(hash.clone()));
                entity = Some(EntityRef::new(
                    format!("democracy-preimage-{hash}"),
                    EntityEventKind::Complete,
                ));
            }
            K::TreasuryProposed => {
                let index = fields.index("proposalIndex", 0)?;
                data.insert("proposalIndex".into(), Value::String(index.clone()));
                data.insert("proposer".into(), fields.string("proposer", 1)?);
                data.insert("value".into(), fields.balance("value", 2)?);
                entity = Some(EntityRef::new(
                    format!("treasury-proposal-{index}"),
                    EntityEventKind::Create,
                ));
            }
            K::TreasuryAwarded | K::TreasuryRejected => {
                let index = fields.index("proposalIndex", 0)?;
                data.insert("proposalIndex".into(), Value::String(index.clone()));
                entity = Some(EntityRef::new(
                    format!("treasury-proposal-{index}"),
                    EntityEventKind::Complete,
                ));
            }
        }

        Ok(NormalizedEvent {
            network: Network::Substrate,
            kind: kind.as_str().to_string(),
            data: Value::Object(data),
            entity,
        })
    }
}

impl EventParser for SubstrateParser {
    fn network(&self) -> Network {
        Network::Substrate
    }

    fn parse(&self, raw: &RawEvent) -> Result<ParseOutcome, ParseError> {
        match SubstrateEventKind::from_event_name(&raw.name) {
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
            network: Network::Substrate,
            chain: "edgeware".into(),
            name: name.into(),
            payload,
            block_number: 777,
        }
    }

    #[test]
    fn named_data_preferred() {
        let out = SubstrateParser::new()
            .parse(&raw(
                "balances.Transfer",
                json!({"data": {"sender": "5A", "dest": "5B", "value": "100"}}),
            ))
            .unwrap();
        let ParseOutcome::Event(ev) = out else {
            panic!("expected parsed event");
        };
        assert_eq!(ev.kind, "balance-transfer");
        assert_eq!(ev.data["sender"], "5A");
        assert_eq!(ev.data["value"], "100");
    }

    #[test]
    fn positional_params_used_only_when_data_absent() {
        let out = SubstrateParser::new()
            .parse(&raw(
                "balances.Transfer",
                json!({"params": ["5A", "5B", "100"]}),
            ))
            .unwrap();
        let ParseOutcome::Event(ev) = out else {
            panic!("expected parsed event");
        };
        assert_eq!(ev.data["dest"], "5B");
    }

    #[test]
    fn missing_field_in_named_data_does_not_fall_back() {
        // `data` is present but incomplete; `params` has the field. The
        // parser must treat this as malformed, not silently use the legacy
        // path.
        let err = SubstrateParser::new()
            .parse(&raw(
                "balances.Transfer",
                json!({"data": {"sender": "5A"}, "params": ["5A", "5B", "100"]}),
            ))
            .unwrap_err();
        assert!(err.to_string().contains("dest"));
    }

    #[test]
    fn democracy_lifecycle_entities() {
        let parser = SubstrateParser::new();

        let started = parser
            .parse(&raw(
                "democracy.Started",
                json!({"data": {"referendumIndex": 3, "voteThreshold": "Simplemajority"}}),
            ))
            .unwrap();
        let ParseOutcome::Event(ev) = started else {
            panic!("expected parsed event");
        };
        let entity = ev.entity.unwrap();
        assert_eq!(entity.key, "democracy-referendum-3");
        assert_eq!(entity.lifecycle, EntityEventKind::Create);

        let executed = parser
            .parse(&raw(
                "democracy.Executed",
                json!({"data": {"referendumIndex": 3}}),
            ))
            .unwrap();
        let ParseOutcome::Event(ev) = executed else {
            panic!("expected parsed event");
        };
        let entity = ev.entity.unwrap();
        assert_eq!(entity.key, "democracy-referendum-3");
        assert_eq!(entity.lifecycle, EntityEventKind::Complete);
    }

    #[test]
    fn unknown_pallet_event_is_sentinel() {
        let out = SubstrateParser::new()
            .parse(&raw("parachains.CandidateIncluded", json!({})))
            .unwrap();
        assert_eq!(out, ParseOutcome::Unknown);
    }

    #[test]
    fn payload_without_either_form_is_malformed() {
        let err = SubstrateParser::new()
            .parse(&raw("staking.Slash", json!({"unexpected": true})))
            .unwrap_err();
        assert!(err.to_string().contains("validator"));
    }
}
