//! `EventParser` trait with one implementation per network family.

use crate::error::ParseError;
use crate::event::{NormalizedEvent, RawEvent};
use crate::network::Network;

/// Result of parsing a raw event.
///
/// `Unknown` is a sentinel, not an error: networks add event types over time
/// and the pipeline must degrade gracefully. Callers log a warning and drop
/// the event.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Event(NormalizedEvent),
    Unknown,
}

/// Maps raw, network-specific event payloads into the internal
/// representation. Pure: identical inputs always produce identical outputs.
///
/// Each family owns its own closed `EventKind` enumeration; there is no
/// shared enumeration across families.
pub trait EventParser: Send + Sync {
    /// The family this parser covers.
    fn network(&self) -> Network;

    /// Parse a raw event. Returns `Ok(ParseOutcome::Unknown)` for event names
    /// outside the family's closed set; returns `Err` only when a recognized
    /// event carries a malformed payload.
    fn parse(&self, raw: &RawEvent) -> Result<ParseOutcome, ParseError>;
}
