//! Bus message shape validation.
//!
//! Consumers of externally produced messages validate shape before any
//! handler logic runs. A failed check rejects the message permanently:
//! a structurally invalid message would fail identically on every retry.

use chainrelay_core::MessageFormatError;
use serde_json::Value;

fn require_string(
    message_type: &'static str,
    obj: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<(), MessageFormatError> {
    match obj.get(field) {
        Some(Value::String(_)) => Ok(()),
        Some(_) => Err(MessageFormatError::WrongType {
            message_type,
            field,
        }),
        None => Err(MessageFormatError::MissingField {
            message_type,
            field,
        }),
    }
}

/// Validate a Discord bridge message: `content`, `channel_id` and
/// `parent_channel_id` must all be strings.
pub fn validate_discord(payload: &Value) -> Result<(), MessageFormatError> {
    const TYPE: &str = "discord";
    let obj = payload
        .as_object()
        .ok_or(MessageFormatError::NotAnObject { message_type: TYPE })?;
    require_string(TYPE, obj, "content")?;
    require_string(TYPE, obj, "channel_id")?;
    require_string(TYPE, obj, "parent_channel_id")?;
    Ok(())
}

/// Validate a Snapshot proposal message: `id`, `title`, `body` and `space`
/// must be strings and `choices` a non-empty array.
pub fn validate_snapshot(payload: &Value) -> Result<(), MessageFormatError> {
    const TYPE: &str = "snapshot";
    let obj = payload
        .as_object()
        .ok_or(MessageFormatError::NotAnObject { message_type: TYPE })?;
    require_string(TYPE, obj, "id")?;
    require_string(TYPE, obj, "title")?;
    require_string(TYPE, obj, "body")?;
    require_string(TYPE, obj, "space")?;
    match obj.get("choices") {
        Some(Value::Array(choices)) if !choices.is_empty() => Ok(()),
        Some(_) => Err(MessageFormatError::WrongType {
            message_type: TYPE,
            field: "choices",
        }),
        None => Err(MessageFormatError::MissingField {
            message_type: TYPE,
            field: "choices",
        }),
    }
}
