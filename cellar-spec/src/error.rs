use thiserror::Error;

/// Result alias for backend operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Canonical error surface for the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid route configuration: {0}")]
    Configuration(String),
    #[error("{operation} requires a client token")]
    Authentication { operation: &'static str },
    #[error("field {field} must be a {expected}")]
    FieldType { field: String, expected: &'static str },
    #[error("{0}")]
    Validation(String),
    #[error("no secret at {path}")]
    NotFound { path: String },
    #[error("no route matches {path}")]
    UnroutedPath { path: String },
    #[error("operation {operation} is not supported on this path")]
    UnsupportedOperation { operation: &'static str },
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}
