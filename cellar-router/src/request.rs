use cellar_spec::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Verbs the host dispatches into the backend.
///
/// `Write` covers both create and update; the host does not distinguish
/// them, so the router resolves which applies via the route's existence
/// predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Write,
    Delete,
    List,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
            Self::List => "list",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inbound request, as handed over by the host process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub operation: Operation,
    pub path: String,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_token: Option<String>,
}

impl Request {
    pub fn new(operation: Operation, path: impl Into<String>) -> Self {
        Self {
            operation,
            path: path.into(),
            fields: BTreeMap::new(),
            client_token: None,
        }
    }

    pub fn read(path: impl Into<String>) -> Self {
        Self::new(Operation::Read, path)
    }

    pub fn write(path: impl Into<String>) -> Self {
        Self::new(Operation::Write, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Operation::Delete, path)
    }

    pub fn list(path: impl Into<String>) -> Self {
        Self::new(Operation::List, path)
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.client_token = Some(token.into());
        self
    }

    /// Decodes a request from the host's wire payload.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|err| Error::Serialization(err.to_string()))
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|err| Error::Serialization(err.to_string()))
    }

    /// The caller identity, if a non-empty token was attached.
    pub(crate) fn token(&self) -> Option<&str> {
        self.client_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_round_trip() {
        let request = Request::write("test/")
            .with_field("secret_key", json!("secret_value"))
            .with_token("test_token");

        let encoded = request.to_json().expect("encode");
        let decoded = Request::from_json(&encoded).expect("decode");

        assert_eq!(decoded.operation, Operation::Write);
        assert_eq!(decoded.path, "test/");
        assert_eq!(decoded.fields["secret_key"], json!("secret_value"));
        assert_eq!(decoded.client_token.as_deref(), Some("test_token"));
    }

    #[test]
    fn malformed_payload_is_a_serialization_error() {
        let err = Request::from_json(b"{not json").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let request = Request::read("test/").with_token("   ");
        assert!(request.token().is_none());
    }
}
