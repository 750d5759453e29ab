//! Wire value definitions
//!
//! A single tagged union represents both decoded wire data and command
//! results. Values are immutable once constructed and cloned at handler
//! boundaries.

/// A protocol value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Status text, e.g. `+OK`
    Simple(String),

    /// Error message, e.g. `-ERR ...`
    Error(String),

    /// Signed integer reply
    Integer(i64),

    /// Length-prefixed string payload
    Bulk(String),

    /// The absent-bulk marker (`$-1`)
    Null,

    /// Ordered sequence of values
    Array(Vec<Value>),
}

impl Value {
    /// The canonical `+OK` status reply
    pub fn ok() -> Self {
        Value::Simple("OK".to_string())
    }

    /// Build an error reply
    pub fn error(message: impl Into<String>) -> Self {
        Value::Error(message.into())
    }

    /// Build a bulk string value
    pub fn bulk(payload: impl Into<String>) -> Self {
        Value::Bulk(payload.into())
    }

    /// The payload if this is a bulk string
    pub fn as_bulk(&self) -> Option<&str> {
        match self {
            Value::Bulk(payload) => Some(payload),
            _ => None,
        }
    }

    /// True if this is an error reply
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}
