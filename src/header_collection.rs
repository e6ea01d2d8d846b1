//! A block of headers keyed by case-insensitive name.

use std::fmt;

use crate::constants::CONTENT_LENGTH;
use crate::error::{HeaderError, ParseError};
use crate::header::{Header, TypedValue};
use crate::header_parser::HeaderParser;

/// Headers keyed by case-insensitive name, one [`Header`] per name.
///
/// Headers keep their insertion order for printing. Equality ignores that
/// order.
///
/// # Examples
///
/// ```
/// use http_grammar::HeaderCollection;
///
/// let mut headers = HeaderCollection::parse("Accept: text/html\r\nAccept: */*\r\n").unwrap();
/// assert_eq!(headers.get("accept").map(|h| h.values().len()), Some(2));
///
/// headers.set_content_length(12);
/// assert_eq!(headers.content_length(), Some(12));
/// assert_eq!(
///     headers.to_string(),
///     "Accept: text/html, */*\r\nContent-Length: 12\r\n"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct HeaderCollection {
    headers: Vec<Header>,
}

impl HeaderCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a header block with the default [`HeaderParser`].
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if a line is malformed.
    pub fn parse(block: &str) -> Result<Self, ParseError> {
        HeaderParser::default().parse_headers(block)
    }

    /// Parses like [`parse`](Self::parse), returning `None` on malformed
    /// input.
    #[must_use]
    pub fn try_parse(block: &str) -> Option<Self> {
        Self::parse(block).ok()
    }

    /// Adds a header, merging its values into an existing header of the
    /// same name.
    ///
    /// # Errors
    ///
    /// Returns `HeaderError` if one of the two headers is typed and the
    /// other holds a value the typed one cannot take, leaving the
    /// collection unchanged.
    pub fn add(&mut self, header: Header) -> Result<(), HeaderError> {
        match self.position(header.name()) {
            Some(index) => {
                let merged = self.headers[index].merge(&header)?;
                self.headers[index] = merged;
            }
            None => self.headers.push(header),
        }
        Ok(())
    }

    /// Replaces the header of the same name, returning the old one.
    pub fn set(&mut self, header: Header) -> Option<Header> {
        match self.position(header.name()) {
            Some(index) => Some(std::mem::replace(&mut self.headers[index], header)),
            None => {
                self.headers.push(header);
                None
            }
        }
    }

    /// Looks a header up by case-insensitive name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Header> {
        self.headers.iter().find(|header| header.is_named(name))
    }

    /// Removes a header by case-insensitive name.
    pub fn remove(&mut self, name: &str) -> Option<Header> {
        self.position(name).map(|index| self.headers.remove(index))
    }

    /// Returns true if a header with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Header> {
        self.headers.iter()
    }

    /// Returns the number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Returns the typed `Content-Length`, if present.
    #[must_use]
    pub fn content_length(&self) -> Option<i64> {
        self.get(CONTENT_LENGTH)
            .and_then(Header::typed_value)
            .and_then(TypedValue::as_integer)
    }

    /// Sets a typed `Content-Length`, replacing any existing one.
    pub fn set_content_length(&mut self, length: i64) {
        self.set(Header::content_length(length));
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header.is_named(name))
    }
}

impl PartialEq for HeaderCollection {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .headers
                .iter()
                .all(|header| other.get(header.name()) == Some(header))
    }
}

impl Eq for HeaderCollection {}

impl fmt::Display for HeaderCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for header in &self.headers {
            write!(f, "{header}\r\n")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a HeaderCollection {
    type Item = &'a Header;
    type IntoIter = std::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.headers.iter()
    }
}

impl Extend<Header> for HeaderCollection {
    /// Sets each header in turn; later headers replace earlier ones.
    fn extend<I: IntoIterator<Item = Header>>(&mut self, iter: I) {
        for header in iter {
            self.set(header);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HeaderValue;

    fn accept(values: &[&str]) -> Header {
        Header::new("Accept", values.iter().map(|v| HeaderValue::new(*v))).unwrap()
    }

    #[test]
    fn add_merges_unique_values() {
        let mut headers = HeaderCollection::new();
        headers.add(accept(&["a", "b"])).unwrap();
        headers
            .add(Header::new("ACCEPT", [HeaderValue::new("b"), HeaderValue::new("c")]).unwrap())
            .unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("accept"), Some(&accept(&["a", "b", "c"])));
    }

    #[test]
    fn set_replaces_outright() {
        let mut headers = HeaderCollection::new();
        assert!(headers.set(accept(&["a"])).is_none());
        let old = headers.set(accept(&["z"]));
        assert_eq!(old, Some(accept(&["a"])));
        assert_eq!(headers.get("Accept"), Some(&accept(&["z"])));
    }

    #[test]
    fn remove_and_contains() {
        let mut headers = HeaderCollection::new();
        headers.set(accept(&["a"]));
        assert!(headers.contains("accept"));
        assert!(headers.remove("ACCEPT").is_some());
        assert!(headers.is_empty());
        assert!(headers.remove("accept").is_none());
    }

    #[test]
    fn content_length_helpers() {
        let mut headers = HeaderCollection::new();
        assert_eq!(headers.content_length(), None);
        headers.set_content_length(5);
        headers.set_content_length(7);
        assert_eq!(headers.content_length(), Some(7));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn equality_ignores_order() {
        let mut a = HeaderCollection::new();
        a.set(accept(&["a"]));
        a.set_content_length(1);
        let mut b = HeaderCollection::new();
        b.set_content_length(1);
        b.set(accept(&["a"]));
        assert_eq!(a, b);
        assert_ne!(a.to_string(), b.to_string());
    }

    #[test]
    fn prints_crlf_terminated_lines() {
        let mut headers = HeaderCollection::new();
        headers.set(accept(&["a", "b"]));
        headers.set_content_length(0);
        assert_eq!(headers.to_string(), "Accept: a, b\r\nContent-Length: 0\r\n");
        assert_eq!(HeaderCollection::parse(&headers.to_string()).unwrap(), headers);
    }

    #[test]
    fn extend_sets_headers() {
        let mut headers = HeaderCollection::new();
        headers.extend([accept(&["a"]), accept(&["b"])]);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("accept"), Some(&accept(&["b"])));
        assert_eq!((&headers).into_iter().count(), 1);
    }
}
