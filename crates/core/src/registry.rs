//! Namespaced registry keys.
//!
//! Registry keys are stable string identifiers used for authoring item
//! catalogs and recipe tables (e.g., `smeltery:iron_ore`). They are ordered
//! and validated so configuration files resolve deterministically.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default namespace used when a key omits an explicit namespace.
pub const DEFAULT_NAMESPACE: &str = "smeltery";

/// Error returned when parsing an invalid [`RegistryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryKeyError {
    /// Nothing but whitespace was supplied.
    #[error("registry key cannot be empty")]
    Empty,
    /// One half of `namespace:path` is empty.
    #[error("registry key {0:?} has an empty namespace or path")]
    MissingPart(String),
    /// A character outside `a-z0-9_./-` was found.
    #[error("registry key {key:?} contains invalid character {found:?}")]
    InvalidChar {
        /// Offending key.
        key: String,
        /// First invalid character.
        found: char,
    },
}

/// A namespaced key of the form `namespace:path`.
///
/// Ordering is lexical by `(namespace, path)` and is stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegistryKey {
    namespace: String,
    path: String,
}

impl RegistryKey {
    /// Parse `namespace:path`, or a bare `path` in [`DEFAULT_NAMESPACE`].
    pub fn parse(input: &str) -> Result<Self, RegistryKeyError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RegistryKeyError::Empty);
        }

        let (namespace, path) = input.split_once(':').unwrap_or((DEFAULT_NAMESPACE, input));
        let (namespace, path) = (namespace.trim(), path.trim());
        if namespace.is_empty() || path.is_empty() {
            return Err(RegistryKeyError::MissingPart(input.to_string()));
        }

        let allowed = |c: char| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.' | '/');
        if let Some(found) = namespace.chars().chain(path.chars()).find(|c| !allowed(*c)) {
            return Err(RegistryKeyError::InvalidChar {
                key: input.to_string(),
                found,
            });
        }

        Ok(Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    /// Registry key namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Registry key path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for RegistryKey {
    type Err = RegistryKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RegistryKey {
    type Error = RegistryKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RegistryKey> for String {
    fn from(key: RegistryKey) -> Self {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_namespaced_key() {
        let key = RegistryKey::parse("mod:iron_ore").unwrap();
        assert_eq!(key.namespace(), "mod");
        assert_eq!(key.path(), "iron_ore");
        assert_eq!(key.to_string(), "mod:iron_ore");
    }

    #[test]
    fn parses_with_default_namespace() {
        let key = RegistryKey::parse("coal").unwrap();
        assert_eq!(key.to_string(), "smeltery:coal");
    }

    #[test]
    fn rejects_empty_and_invalid() {
        assert_eq!(RegistryKey::parse("  "), Err(RegistryKeyError::Empty));
        assert!(matches!(
            RegistryKey::parse("smeltery:"),
            Err(RegistryKeyError::MissingPart(_))
        ));
        assert!(matches!(
            RegistryKey::parse("Coal"),
            Err(RegistryKeyError::InvalidChar { found: 'C', .. })
        ));
    }
}
