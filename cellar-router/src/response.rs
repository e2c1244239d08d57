use cellar_spec::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Field carrying the key sequence of a list result.
pub const KEYS_FIELD: &str = "keys";

/// Field carrying the explanatory message of a soft failure.
pub const ERROR_FIELD: &str = "error";

/// Result payload returned to the host on success.
///
/// Writes and deletes with nothing to report return no response at all
/// (`Ok(None)` from dispatch); success is signaled by absence of error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub data: BTreeMap<String, Value>,
}

impl Response {
    pub fn with_data(data: BTreeMap<String, Value>) -> Self {
        Self { data }
    }

    /// List result: the ordered key sequence travels under `keys`.
    pub fn with_keys(keys: Vec<String>) -> Self {
        let mut data = BTreeMap::new();
        data.insert(KEYS_FIELD.to_string(), Value::from(keys));
        Self { data }
    }

    /// Soft failure for reads of a nonexistent path: an explanatory message
    /// in the payload rather than a failed call.
    pub fn not_found(message: impl Into<String>) -> Self {
        let mut data = BTreeMap::new();
        data.insert(ERROR_FIELD.to_string(), Value::from(message.into()));
        Self { data }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// The key sequence of a list result, if this is one.
    pub fn keys(&self) -> Option<Vec<&str>> {
        self.data
            .get(KEYS_FIELD)
            .and_then(Value::as_array)
            .map(|keys| keys.iter().filter_map(Value::as_str).collect())
    }

    pub fn is_error(&self) -> bool {
        self.data.contains_key(ERROR_FIELD)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.data.get(ERROR_FIELD).and_then(Value::as_str)
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|err| Error::Serialization(err.to_string()))
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|err| Error::Serialization(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_travel_under_the_keys_field() {
        let response = Response::with_keys(vec!["key1".into(), "key2".into()]);
        assert_eq!(response.keys(), Some(vec!["key1", "key2"]));
        assert!(!response.is_error());
    }

    #[test]
    fn not_found_is_a_soft_error() {
        let response = Response::not_found("no value at path test/");
        assert!(response.is_error());
        assert_eq!(response.error_message(), Some("no value at path test/"));
    }
}
