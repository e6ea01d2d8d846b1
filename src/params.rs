//! Ordered multi-value parameter container.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::charset::{is_ftp_parameter_char, is_query_char, is_text_char};
use crate::error::{Component, ParseError, ParseErrorKind};
use crate::escape;

/// The two wire spellings of a parameter multimap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterStyle {
    /// `key=value&key=value`, the HTTP query string
    Query,
    /// `key=value;key=value`, the FTP-family path parameters
    Path,
}

impl ParameterStyle {
    /// Returns the character separating two pairs.
    #[must_use]
    pub const fn pair_separator(self) -> char {
        match self {
            Self::Query => '&',
            Self::Path => ';',
        }
    }

    /// Returns true if `c` may appear unescaped in a key or value.
    #[must_use]
    pub const fn is_allowed(self, c: char) -> bool {
        match self {
            Self::Query => is_query_char(c),
            Self::Path => is_ftp_parameter_char(c),
        }
    }

    const fn component(self) -> Component {
        match self {
            Self::Query => Component::Query,
            Self::Path => Component::Parameters,
        }
    }
}

/// Key-unique, multi-value parameters of an address.
///
/// Each key maps to a *set* of values: adding a pair that is already
/// present changes nothing. Keys and values are kept sorted, so two
/// multimaps with the same content compare, hash and print the same
/// regardless of insertion order.
///
/// # Examples
///
/// ```
/// use http_grammar::{ParameterMultimap, ParameterStyle};
///
/// let params = ParameterMultimap::parse("b=2&a=1&b=1", ParameterStyle::Query).unwrap();
/// assert_eq!(params.len(), 2);
/// assert_eq!(params.first("b"), Some("1"));
/// assert_eq!(params.to_string(), "a=1&b=1&b=2");
/// assert_eq!(params.to_string_with(ParameterStyle::Path), "a=1;b=1;b=2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ParameterMultimap {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl ParameterMultimap {
    /// Creates an empty multimap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `key=value` pairs separated per `style` (without the leading
    /// `?` or `;`).
    ///
    /// A key without `=` is stored with an empty value. Empty pairs are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if a pair has a value but no key, holds a
    /// control character or space, or contains a bad escape.
    pub fn parse(input: &str, style: ParameterStyle) -> Result<Self, ParseError> {
        let chars: Vec<char> = input.chars().collect();
        Self::scan(&chars, 0, chars.len(), style).map_err(|kind| ParseError::new(input, kind))
    }

    /// Parses like [`parse`](Self::parse), returning `None` on malformed input.
    #[must_use]
    pub fn try_parse(input: &str, style: ParameterStyle) -> Option<Self> {
        Self::parse(input, style).ok()
    }

    /// Scans `chars[start..end]` into a multimap.
    pub(crate) fn scan(
        chars: &[char],
        start: usize,
        end: usize,
        style: ParameterStyle,
    ) -> Result<Self, ParseErrorKind> {
        let separator = style.pair_separator();
        let mut params = Self::new();
        let mut key = String::new();
        let mut value = String::new();
        let mut in_value = false;
        let mut pair_start = start;
        let mut index = start;

        while index < end {
            let c = chars[index];
            if c == separator {
                params.commit(&mut key, &mut value, in_value, pair_start)?;
                in_value = false;
                index += 1;
                pair_start = index;
                continue;
            }
            if c == '=' && !in_value {
                in_value = true;
                index += 1;
                continue;
            }

            let target = if in_value { &mut value } else { &mut key };
            if c == '%' {
                let (decoded, next) = escape::decode_escape_at(&chars[..end], index)
                    .map_err(|reason| ParseErrorKind::InvalidEscape {
                        position: index,
                        reason,
                    })?;
                target.push_str(&decoded);
                index = next;
                continue;
            }
            if !is_text_char(c) {
                return Err(ParseErrorKind::UnexpectedChar {
                    found: c,
                    position: index,
                    component: style.component(),
                });
            }
            target.push(c);
            index += 1;
        }

        params.commit(&mut key, &mut value, in_value, pair_start)?;
        Ok(params)
    }

    fn commit(
        &mut self,
        key: &mut String,
        value: &mut String,
        in_value: bool,
        pair_start: usize,
    ) -> Result<(), ParseErrorKind> {
        if key.is_empty() {
            if in_value || !value.is_empty() {
                return Err(ParseErrorKind::EmptyParameterName {
                    position: pair_start,
                });
            }
            return Ok(());
        }
        self.add(std::mem::take(key), std::mem::take(value));
        Ok(())
    }

    /// Adds a pair, returning false if it was already present.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        self.entries.entry(key.into()).or_default().insert(value.into())
    }

    /// Returns the multimap with the pair added.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(key, value);
        self
    }

    /// Adds every pair of `other`.
    pub fn merge(&mut self, other: &Self) {
        for (key, values) in &other.entries {
            self.entries
                .entry(key.clone())
                .or_default()
                .extend(values.iter().cloned());
        }
    }

    /// Returns the values of a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(key)
    }

    /// Returns the smallest value of a key.
    #[must_use]
    pub fn first(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns true if the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes a key and all of its values.
    pub fn remove(&mut self, key: &str) -> Option<BTreeSet<String>> {
        self.entries.remove(key)
    }

    /// Returns true if there are no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of key/value pairs.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    /// Returns the keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns every key/value pair, sorted by key then value.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(key, values)| {
            values
                .iter()
                .map(move |value| (key.as_str(), value.as_str()))
        })
    }

    /// Serializes the pairs with the separators of `style`.
    ///
    /// Keys and values are percent-encoded; an empty value is written as a
    /// bare key.
    #[must_use]
    pub fn to_string_with(&self, style: ParameterStyle) -> String {
        let separator = style.pair_separator().to_string();
        self.iter()
            .map(|(key, value)| {
                let key = escape::encode(key, |c| style.is_allowed(c));
                if value.is_empty() {
                    key
                } else {
                    format!("{key}={}", escape::encode(value, |c| style.is_allowed(c)))
                }
            })
            .collect::<Vec<_>>()
            .join(&separator)
    }
}

impl fmt::Display for ParameterMultimap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(ParameterStyle::Query))
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterMultimap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.add(key, value);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty() {
        let params = ParameterMultimap::parse("", ParameterStyle::Query).unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn parse_multiple_params() {
        let params = ParameterMultimap::parse("version=2.0&ttl=300", ParameterStyle::Query).unwrap();
        assert_eq!(params.first("version"), Some("2.0"));
        assert_eq!(params.first("ttl"), Some("300"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn parse_param_without_value() {
        let params = ParameterMultimap::parse("flag", ParameterStyle::Query).unwrap();
        assert_eq!(params.first("flag"), Some(""));
    }

    #[test]
    fn parse_percent_encoded() {
        let params = ParameterMultimap::parse("name=%41%42%43&q=a%26b", ParameterStyle::Query).unwrap();
        assert_eq!(params.first("name"), Some("ABC"));
        assert_eq!(params.first("q"), Some("a&b"));
    }

    #[test]
    fn parse_path_style() {
        let params = ParameterMultimap::parse("type=i;mode=a", ParameterStyle::Path).unwrap();
        assert_eq!(params.first("type"), Some("i"));
        assert_eq!(params.first("mode"), Some("a"));
    }

    #[test]
    fn value_keeps_later_equals_signs() {
        let params = ParameterMultimap::parse("expr=a=b", ParameterStyle::Query).unwrap();
        assert_eq!(params.first("expr"), Some("a=b"));
    }

    #[test]
    fn empty_pairs_are_skipped() {
        let params = ParameterMultimap::parse("a=1&&b=2&", ParameterStyle::Query).unwrap();
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn value_without_key_fails() {
        let result = ParameterMultimap::parse("a=1&=2", ParameterStyle::Query);
        assert!(matches!(
            result,
            Err(ParseError {
                kind: ParseErrorKind::EmptyParameterName { position: 4 },
                ..
            })
        ));
    }

    #[test]
    fn space_fails() {
        let result = ParameterMultimap::parse("a=b c", ParameterStyle::Query);
        assert!(matches!(
            result,
            Err(ParseError {
                kind: ParseErrorKind::UnexpectedChar { found: ' ', position: 3, .. },
                ..
            })
        ));
    }

    #[test]
    fn invalid_encoding_fails() {
        let result = ParameterMultimap::parse("name=%GG", ParameterStyle::Query);
        assert!(matches!(
            result,
            Err(ParseError {
                kind: ParseErrorKind::InvalidEscape { position: 5, .. },
                ..
            })
        ));
    }

    #[test]
    fn duplicate_pair_collapses() {
        let mut params = ParameterMultimap::new();
        assert!(params.add("a", "1"));
        assert!(!params.add("a", "1"));
        assert_eq!(params.get("a").map(BTreeSet::len), Some(1));
        assert!(params.add("a", "2"));
        assert_eq!(params.get("a").map(BTreeSet::len), Some(2));
    }

    #[test]
    fn insertion_order_is_irrelevant() {
        let left = ParameterMultimap::new().with("a", "1").with("b", "2").with("a", "0");
        let right = ParameterMultimap::new().with("b", "2").with("a", "0").with("a", "1");
        assert_eq!(left, right);
        assert_eq!(left.to_string(), right.to_string());
    }

    #[test]
    fn display_encodes_reserved_characters() {
        let params = ParameterMultimap::new().with("q", "a&b c").with("flag", "");
        assert_eq!(params.to_string(), "flag&q=a%26b%20c");
        assert_eq!(
            ParameterMultimap::new().with("k", "x;y").to_string_with(ParameterStyle::Path),
            "k=x%3By"
        );
    }

    #[test]
    fn merge_unions_values() {
        let mut left = ParameterMultimap::new().with("a", "1");
        let right = ParameterMultimap::new().with("a", "2").with("b", "3");
        left.merge(&right);
        assert_eq!(left.pair_count(), 3);
        assert_eq!(left.to_string(), "a=1&a=2&b=3");
    }

    #[test]
    fn iter_returns_sorted_pairs() {
        let params: ParameterMultimap = [("b", "2"), ("a", "1")].into_iter().collect();
        let items: Vec<_> = params.iter().collect();
        assert_eq!(items, vec![("a", "1"), ("b", "2")]);
    }
}
