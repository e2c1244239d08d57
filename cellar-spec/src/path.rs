use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Path identity of a secret within the backend's namespace.
///
/// Immutable once constructed; a record keeps the path it was created with
/// for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SecretPath(String);

impl SecretPath {
    /// Parses a path, rejecting empty input and unsupported characters.
    ///
    /// A trailing `/` is legal; mounts commonly address container-style
    /// paths such as `test/`.
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(Error::Validation("secret path must not be empty".into()));
        }

        if !raw
            .chars()
            .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '/'))
        {
            return Err(Error::Validation(format!(
                "secret path contains invalid characters: {raw}"
            )));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this path lives under the given prefix.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// Convert into the underlying string representation.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SecretPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SecretPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SecretPath::parse(s)
    }
}

impl TryFrom<&str> for SecretPath {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        SecretPath::parse(value)
    }
}

impl TryFrom<String> for SecretPath {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        SecretPath::parse(&value)
    }
}

impl Serialize for SecretPath {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SecretPath {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        SecretPath::parse(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_format_round_trip() {
        let fixtures = ["test/", "kv/db-password", "configs/alpha.v2"];

        for fixture in fixtures {
            let path = SecretPath::parse(fixture).expect("parse");
            assert_eq!(path.to_string(), fixture);
        }
    }

    #[test]
    fn rejects_empty_path() {
        let err = SecretPath::parse("   ").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn rejects_invalid_characters() {
        let err = SecretPath::parse("test/UPPER").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn prefix_matching() {
        let path = SecretPath::parse("test/key1").expect("parse");
        assert!(path.starts_with("test/"));
        assert!(!path.starts_with("other/"));
    }
}
