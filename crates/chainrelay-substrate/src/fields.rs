//! Dual-path field extraction for Substrate payloads.

use chainrelay_core::ParseError;
use serde_json::{Map, Value};

/// Field accessor over the two payload forms a Substrate node can deliver.
///
/// The named `data` object is the preferred method; the positional `params`
/// array is the legacy fallback, consulted only when `data` is absent.
pub(crate) struct Fields<'a> {
    named: Option<&'a Map<String, Value>>,
    positional: Option<&'a [Value]>,
}

impl<'a> Fields<'a> {
    pub(crate) fn from_payload(payload: &'a Value) -> Self {
        Self {
            named: payload.get("data").and_then(Value::as_object),
            positional: payload.get("params").and_then(Value::as_array).map(|v| &v[..]),
        }
    }

    /// Raw field lookup: named form first; positional form only when the
    /// named form is unavailable for the whole payload.
    fn get(&self, name: &str, position: usize) -> Result<&'a Value, ParseError> {
        if let Some(named) = self.named {
            return named.get(name).ok_or_else(|| ParseError::MissingField {
                field: name.to_string(),
            });
        }
        self.positional
            .and_then(|params| params.get(position))
            .ok_or_else(|| ParseError::MissingField {
                field: name.to_string(),
            })
    }

    /// Field rendered as a JSON string (accounts, hashes, thresholds).
    pub(crate) fn string(&self, name: &str, position: usize) -> Result<Value, ParseError> {
        let v = self.get(name, position)?;
        match v {
            Value::String(s) => Ok(Value::String(s.clone())),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            _ => Err(ParseError::InvalidField {
                field: name.to_string(),
                reason: "expected a string".into(),
            }),
        }
    }

    /// Balance fields keep their decimal-string form to avoid precision loss.
    pub(crate) fn balance(&self, name: &str, position: usize) -> Result<Value, ParseError> {
        self.string(name, position)
    }

    /// Index/hash fields used to build entity keys; returned as `String`.
    pub(crate) fn index(&self, name: &str, position: usize) -> Result<String, ParseError> {
        match self.string(name, position)? {
            Value::String(s) => Ok(s),
            _ => unreachable!("string() only returns Value::String"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn named_wins_over_positional() {
        let payload = json!({"data": {"who": "named"}, "params": ["positional"]});
        let fields = Fields::from_payload(&payload);
        assert_eq!(fields.string("who", 0).unwrap(), "named");
    }

    #[test]
    fn positional_index_out_of_range_is_missing_field() {
        let payload = json!({"params": ["only-one"]});
        let fields = Fields::from_payload(&payload);
        let err = fields.string("dest", 1).unwrap_err();
        assert!(err.to_string().contains("dest"));
    }

    #[test]
    fn numbers_render_as_strings() {
        let payload = json!({"data": {"referendumIndex": 12}});
        let fields = Fields::from_payload(&payload);
        assert_eq!(fields.index("referendumIndex", 0).unwrap(), "12");
    }
}
