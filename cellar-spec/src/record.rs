use crate::error::{Error, Result};
use crate::path::SecretPath;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Concrete secret record: one addressable secret and its named fields.
///
/// Updates replace the attribute set wholesale; there is no field-level
/// patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecretRecord {
    path: SecretPath,
    attributes: BTreeMap<String, Value>,
}

impl SecretRecord {
    /// Builds a record. The attribute payload must not be empty.
    pub fn new(path: SecretPath, attributes: BTreeMap<String, Value>) -> Result<Self> {
        if attributes.is_empty() {
            return Err(Error::Validation(
                "data must be provided to store in secret".into(),
            ));
        }

        Ok(Self { path, attributes })
    }

    pub fn path(&self) -> &SecretPath {
        &self.path
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Names of every attribute on the record, sorted.
    pub fn attribute_names(&self) -> Vec<String> {
        self.attributes.keys().cloned().collect()
    }

    pub fn into_attributes(self) -> BTreeMap<String, Value> {
        self.attributes
    }
}
