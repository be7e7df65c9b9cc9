//! Error types for the ChainRelay pipeline.

use thiserror::Error;

/// Errors from parsing a recognized raw event whose payload is malformed.
/// An unrecognized event name is *not* an error; parsers return
/// `ParseOutcome::Unknown` for those.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors from the event processor.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{what} not found")]
    NotFound { what: String },
}

/// Errors from the message bus.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("Broker unreachable: {reason}")]
    Unavailable { reason: String },

    #[error("Channel closed")]
    Closed,

    #[error("Republish interval must be positive, got {ms}ms")]
    InvalidInterval { ms: i64 },
}

/// Errors from a single handler. Isolated by the dispatcher, so a failure in
/// one handler never affects delivery to the others.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Delivery failed: {reason}")]
    Delivery { reason: String },

    #[error("{0}")]
    Other(String),
}

/// Errors from a network listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("Connection failed: {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Connection closed unexpectedly")]
    Closed,
}

/// A bus message failed shape validation. Rejected before any handler logic
/// runs and never retried, since a structurally invalid message cannot
/// succeed later.
#[derive(Debug, Error)]
pub enum MessageFormatError {
    #[error("{message_type} message is not a JSON object")]
    NotAnObject { message_type: &'static str },

    #[error("{message_type} message missing required field '{field}'")]
    MissingField {
        message_type: &'static str,
        field: &'static str,
    },

    #[error("{message_type} message field '{field}' has the wrong type")]
    WrongType {
        message_type: &'static str,
        field: &'static str,
    },
}
