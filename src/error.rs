use thiserror::Error;

/// Structural failures: a state, value or path that does not fit its schema.
///
/// Validation failures are never reported through this type; they travel as
/// [`Validation::Invalid`](crate::Validation::Invalid) data.
#[derive(Error, Debug)]
pub enum FormError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Missing state for field: {0}")]
    MissingField(String),

    #[error("Field '{field}' expected {expected} state, found {found}")]
    ShapeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Form value must be an object, found {0}")]
    NotAnObject(&'static str),

    #[error("Field '{field}' expected an array, found {found}")]
    ExpectedArray { field: String, found: &'static str },

    #[error("Field '{field}' has no item at index {index} (length {len})")]
    IndexOutOfBounds {
        field: String,
        index: usize,
        len: usize,
    },

    #[error("Invalid field path: {0}")]
    InvalidPath(String),

    #[error("Invalid render config: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Session closed")]
    SessionClosed,
}

/// Short name of a JSON value's kind, used in error messages.
pub(crate) fn kind_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
