//! Configuration for the header parser.

use std::collections::{BTreeMap, BTreeSet};

use crate::constants::{CONTENT_LENGTH, USER_AGENT};
use crate::header::ValueKind;

/// Configuration for [`HeaderParser`](crate::HeaderParser).
///
/// Header names and enumeration literals are matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderParserConfig {
    /// Headers whose value is kept as one opaque value.
    ///
    /// Default: `User-Agent`
    unsplittable: BTreeSet<String>,

    /// Headers holding exactly one typed value.
    ///
    /// Default: `Content-Length` as an integer
    typed: BTreeMap<String, ValueKind>,

    /// Bare parameter tokens recognized as enumeration literals, keyed by
    /// lower-cased literal.
    ///
    /// Default: none
    enumerations: BTreeMap<String, String>,
}

impl Default for HeaderParserConfig {
    fn default() -> Self {
        Self::empty()
            .with_unsplittable(USER_AGENT)
            .with_typed(CONTENT_LENGTH, ValueKind::Integer)
    }
}

impl HeaderParserConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration with no special headers at all.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            unsplittable: BTreeSet::new(),
            typed: BTreeMap::new(),
            enumerations: BTreeMap::new(),
        }
    }

    /// Keeps the value of `name` unsplit.
    #[must_use]
    pub fn with_unsplittable(mut self, name: &str) -> Self {
        self.unsplittable.insert(name.to_ascii_lowercase());
        self
    }

    /// Parses `name` as a typed header of `kind`.
    #[must_use]
    pub fn with_typed(mut self, name: &str, kind: ValueKind) -> Self {
        self.typed.insert(name.to_ascii_lowercase(), kind);
        self
    }

    /// Parses `name` as an ordinary header again.
    #[must_use]
    pub fn without_typed(mut self, name: &str) -> Self {
        self.typed.remove(&name.to_ascii_lowercase());
        self
    }

    /// Recognizes `literal` as an enumeration value of bare parameter tokens.
    #[must_use]
    pub fn with_enumeration(mut self, literal: &str) -> Self {
        self.enumerations
            .insert(literal.to_ascii_lowercase(), literal.to_string());
        self
    }

    /// Returns true if the value of `name` is kept unsplit.
    #[must_use]
    pub fn is_unsplittable(&self, name: &str) -> bool {
        self.unsplittable.contains(&name.to_ascii_lowercase())
    }

    /// Returns the payload kind of a typed header.
    #[must_use]
    pub fn typed_kind(&self, name: &str) -> Option<ValueKind> {
        self.typed.get(&name.to_ascii_lowercase()).copied()
    }

    /// Returns the configured spelling of an enumeration literal.
    #[must_use]
    pub fn enumeration(&self, token: &str) -> Option<&str> {
        self.enumerations
            .get(&token.to_ascii_lowercase())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = HeaderParserConfig::default();
        assert!(config.is_unsplittable("user-agent"));
        assert!(!config.is_unsplittable("Accept"));
        assert_eq!(config.typed_kind("CONTENT-LENGTH"), Some(ValueKind::Integer));
        assert_eq!(config.enumeration("gzip"), None);
    }

    #[test]
    fn builder_pattern() {
        let config = HeaderParserConfig::new()
            .with_unsplittable("Server")
            .with_typed("Max-Forwards", ValueKind::Integer)
            .without_typed("Content-Length")
            .with_enumeration("Gzip");

        assert!(config.is_unsplittable("server"));
        assert_eq!(config.typed_kind("max-forwards"), Some(ValueKind::Integer));
        assert_eq!(config.typed_kind("Content-Length"), None);
        assert_eq!(config.enumeration("GZIP"), Some("Gzip"));
    }

    #[test]
    fn empty_config_has_no_special_headers() {
        let config = HeaderParserConfig::empty();
        assert!(!config.is_unsplittable(USER_AGENT));
        assert_eq!(config.typed_kind(CONTENT_LENGTH), None);
    }
}
