use cellar_spec::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// Declared scalar type for a request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Boolean,
}

impl FieldKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

/// Field declarations for one route: name to expected scalar type.
///
/// Checked once per request, before the handler runs. Undeclared supplied
/// fields pass through untouched; they are the write payload or the read
/// selectors, not schema violations.
#[derive(Debug, Clone, Default)]
pub struct FieldSchema {
    fields: BTreeMap<String, FieldKind>,
}

impl FieldSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), kind);
        self
    }

    pub fn declares(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn validate(&self, supplied: &BTreeMap<String, Value>) -> Result<()> {
        for (name, kind) in &self.fields {
            if let Some(value) = supplied.get(name) {
                if !kind.matches(value) {
                    return Err(Error::FieldType {
                        field: name.clone(),
                        expected: kind.as_str(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> FieldSchema {
        FieldSchema::new().field("path", FieldKind::String)
    }

    #[test]
    fn accepts_matching_types() {
        let mut supplied = BTreeMap::new();
        supplied.insert("path".to_string(), json!("test/"));
        schema().validate(&supplied).expect("valid");
    }

    #[test]
    fn rejects_mismatched_types() {
        let mut supplied = BTreeMap::new();
        supplied.insert("path".to_string(), json!(42));

        let err = schema().validate(&supplied).unwrap_err();
        assert_eq!(
            err,
            Error::FieldType {
                field: "path".to_string(),
                expected: "string",
            }
        );
    }

    #[test]
    fn absent_and_undeclared_fields_pass() {
        let mut supplied = BTreeMap::new();
        supplied.insert("secret_key".to_string(), json!("secret_value"));
        schema().validate(&supplied).expect("valid");
    }
}
