//! Error types for homework-bot
//!
//! The taxonomy is closed: everything a polling cycle can run into is one of
//! [`Error::Transport`], [`Error::Shape`], [`Error::UnknownStatus`] or
//! [`Error::Delivery`]. [`Error::Config`] only ever surfaces at startup.
//!
//! Every variant carries owned, comparable payloads (no boxed sources) so the
//! poller can tell whether the error it is about to report is the same one it
//! reported last cycle without comparing rendered text.

use thiserror::Error;

/// Result type alias for homework-bot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for homework-bot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The environment variable that caused the error (e.g., "TELEGRAM_TOKEN")
        key: Option<String>,
    },

    /// The homework API could not be queried
    #[error("homework API request failed: {0}")]
    Transport(#[from] TransportError),

    /// The homework API answered with a payload of the wrong shape
    #[error("unexpected API response: {0}")]
    Shape(#[from] ShapeError),

    /// A homework record carries a status outside the known set
    #[error("unrecognized status {status:?} for homework {homework_name:?}")]
    UnknownStatus {
        /// Name of the homework the status belongs to
        homework_name: String,
        /// The status value as sent by the API
        status: String,
    },

    /// A notification could not be delivered to the chat
    #[error("notification delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

/// Failures talking to the homework API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, connect, TLS, timeout)
    #[error("{endpoint} unreachable (from_date={from_date}): {reason}")]
    Unreachable {
        /// Endpoint that was queried
        endpoint: String,
        /// Cursor sent as `from_date`
        from_date: i64,
        /// Underlying client error
        reason: String,
    },

    /// The API answered with something other than 200 OK
    #[error("{endpoint} returned HTTP {status} (from_date={from_date})")]
    UnexpectedStatus {
        /// Endpoint that was queried
        endpoint: String,
        /// Cursor sent as `from_date`
        from_date: i64,
        /// HTTP status code received
        status: u16,
    },

    /// The body was not valid JSON
    #[error("{endpoint} sent an undecodable body (from_date={from_date}): {reason}")]
    Decode {
        /// Endpoint that was queried
        endpoint: String,
        /// Cursor sent as `from_date`
        from_date: i64,
        /// Decoder error
        reason: String,
    },
}

/// Structural problems in an API payload or a homework record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// Expected a JSON object
    #[error("{context} is {found}, expected an object")]
    NotAnObject {
        /// What was being inspected ("response", "homework record")
        context: &'static str,
        /// JSON type actually found
        found: &'static str,
    },

    /// A required key is absent
    #[error("{context} has no `{key}` key")]
    MissingKey {
        /// What was being inspected
        context: &'static str,
        /// The missing key
        key: &'static str,
    },

    /// A key is present but holds the wrong JSON type
    #[error("`{key}` in {context} is {found}, expected {expected}")]
    WrongType {
        /// What was being inspected
        context: &'static str,
        /// The offending key
        key: &'static str,
        /// JSON type that was required
        expected: &'static str,
        /// JSON type actually found
        found: &'static str,
    },
}

/// Failures delivering a message to the chat
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The bot API could not be reached or its answer could not be read
    #[error("bot API unreachable: {reason}")]
    Unreachable {
        /// Underlying client error
        reason: String,
    },

    /// The bot API refused the message
    #[error("bot API rejected the message (HTTP {status}): {description}")]
    Rejected {
        /// HTTP status code received
        status: u16,
        /// Description returned by the bot API, if any
        description: String,
    },
}

impl Error {
    /// Machine-readable error code, used as a structured log field
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Transport(TransportError::Unreachable { .. }) => "api_unreachable",
            Error::Transport(TransportError::UnexpectedStatus { .. }) => "api_bad_status",
            Error::Transport(TransportError::Decode { .. }) => "api_bad_body",
            Error::Shape(ShapeError::NotAnObject { .. }) => "not_an_object",
            Error::Shape(ShapeError::MissingKey { .. }) => "missing_key",
            Error::Shape(ShapeError::WrongType { .. }) => "wrong_type",
            Error::UnknownStatus { .. } => "unknown_status",
            Error::Delivery(DeliveryError::Unreachable { .. }) => "bot_unreachable",
            Error::Delivery(DeliveryError::Rejected { .. }) => "bot_rejected",
        }
    }

    /// Shorthand for a configuration error tied to an environment variable
    pub(crate) fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// Name of a JSON value's type, for error messages
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
