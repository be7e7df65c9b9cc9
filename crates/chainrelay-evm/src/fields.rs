//! Payload field extraction shared by the EVM sub-family parsers.

use chainrelay_core::ParseError;
use serde_json::Value;

/// Fetch a required field from a decoded log payload.
pub(crate) fn require<'a>(payload: &'a Value, field: &str) -> Result<&'a Value, ParseError> {
    payload.get(field).ok_or_else(|| ParseError::MissingField {
        field: field.to_string(),
    })
}

/// Proposal/token ids arrive as JSON numbers from some providers and decimal
/// strings from others; normalize both to a string.
pub(crate) fn id_string(payload: &Value, field: &str) -> Result<String, ParseError> {
    match require(payload, field)? {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(ParseError::InvalidField {
            field: field.to_string(),
            reason: "expected a string or number".into(),
        }),
    }
}

/// Required address field, lowercased for stable hashing.
pub(crate) fn address(payload: &Value, field: &str) -> Result<String, ParseError> {
    let raw = require(payload, field)?
        .as_str()
        .ok_or_else(|| ParseError::InvalidField {
            field: field.to_string(),
            reason: "expected a string".into(),
        })?;
    Ok(raw.to_ascii_lowercase())
}

/// Copy an optional field through as-is.
pub(crate) fn passthrough(data: &mut serde_json::Map<String, Value>, payload: &Value, field: &str) {
    if let Some(v) = payload.get(field) {
        data.insert(field.to_string(), v.clone());
    }
}
