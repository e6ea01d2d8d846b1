//! HTTP/HTTPS addresses and relative references.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use tracing::trace;

use crate::address::sealed::{AddressParts, Sealed};
use crate::address::{Address, find_scheme_delimiter, hash_of};
use crate::charset::{is_fragment_char, is_http_path_char};
use crate::constants::{HTTP_DEFAULT_PORT, HTTP_SCHEME, HTTPS_DEFAULT_PORT, HTTPS_SCHEME};
use crate::engine::{self, Grammar, ScanState};
use crate::error::{AddressError, Component, ParseError, ParseErrorKind};
use crate::escape;
use crate::params::{ParameterMultimap, ParameterStyle};

/// What [`HttpAddress::with_fragment`] does when a fragment already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FragmentPolicy {
    /// Fail with [`AddressError::FragmentPresent`]
    #[default]
    Throw,
    /// Substitute the new fragment
    Replace,
    /// Concatenate the old and new fragment text
    Append,
    /// Turn the old fragment into a trailing path segment, then substitute
    MoveAsSegment,
}

/// Grammar for `http`/`https` and relative references.
pub(crate) struct HttpGrammar;

impl Grammar for HttpGrammar {
    type Output = HttpAddress;

    const NAME: &'static str = "http";
    const SUPPORTS_LOGIN: bool = false;
    const SUPPORTS_RELATIVE: bool = true;

    fn default_port(scheme: &str) -> Option<u16> {
        match scheme {
            HTTP_SCHEME => Some(HTTP_DEFAULT_PORT),
            HTTPS_SCHEME => Some(HTTPS_DEFAULT_PORT),
            _ => None,
        }
    }

    fn ends_authority(c: char) -> bool {
        matches!(c, '/' | '?' | '#')
    }

    fn parse_path(
        state: &mut ScanState,
        chars: &[char],
        start: usize,
    ) -> Result<(), ParseErrorKind> {
        let mut index = engine::scan_segments(state, chars, start, |c| c == '?' || c == '#')?;

        if chars.get(index) == Some(&'?') {
            let query_end = chars[index..]
                .iter()
                .position(|&c| c == '#')
                .map_or(chars.len(), |offset| index + offset);
            let query =
                ParameterMultimap::scan(chars, index + 1, query_end, ParameterStyle::Query)?;
            state.parameters = (!query.is_empty()).then_some(query);
            index = query_end;
        }

        if chars.get(index) == Some(&'#') {
            state.fragment = Some(engine::scan_text(chars, index + 1, Component::Fragment)?);
        }
        Ok(())
    }

    fn create_instance(mut state: ScanState, raw: &str) -> HttpAddress {
        let parts = AddressParts::from_state(&mut state, raw, is_http_path_char);
        HttpAddress::assemble(parts, state.parameters, state.fragment)
    }
}

/// A parsed HTTP or HTTPS address, or a relative reference.
///
/// Relative references (`path[?query][#fragment]`) have no scheme, host or
/// port and exist to be joined onto an absolute address with
/// [`concat`](Self::concat).
///
/// # Examples
///
/// ```
/// use http_grammar::{Address, HttpAddress};
///
/// let address = HttpAddress::parse("HTTP://Example.com:80/a/./b/../c?x=1#top").unwrap();
/// assert_eq!(address.as_str(), "http://example.com/a/c?x=1#top");
/// assert_eq!(address.segments(), ["a", "c"]);
/// assert_eq!(address.port(), Some(80));
///
/// let relative = HttpAddress::parse("d/e").unwrap();
/// assert!(!relative.is_absolute());
/// assert_eq!(address.concat(&relative).unwrap().as_str(), "http://example.com/a/c/d/e?x=1#top");
/// ```
#[derive(Debug, Clone)]
pub struct HttpAddress {
    parts: AddressParts,
    query: Option<ParameterMultimap>,
    fragment: Option<String>,
    canonical: String,
    hash: u64,
}

impl HttpAddress {
    /// Parses an absolute HTTP/HTTPS address or a relative reference.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if:
    /// - The input is empty
    /// - The scheme is neither `http` nor `https`
    /// - Login credentials are present
    /// - A component holds an illegal character or a bad escape
    /// - The port is not a number up to 65535
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        Self::parse_with_delimiter(input, find_scheme_delimiter(input))
    }

    /// Parses like [`parse`](Self::parse), returning `None` on malformed input.
    #[must_use]
    pub fn try_parse(input: &str) -> Option<Self> {
        Self::parse(input).ok()
    }

    /// Parses with a caller-located scheme delimiter.
    ///
    /// `delimiter` is the byte index of `://`, or `None` to parse the whole
    /// input as a relative reference.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` as [`parse`](Self::parse) does, and with
    /// [`ParseErrorKind::MissingScheme`] if `://` is not at `delimiter`.
    pub fn parse_with_delimiter(input: &str, delimiter: Option<usize>) -> Result<Self, ParseError> {
        engine::parse::<HttpGrammar>(input, delimiter)
    }

    /// Splits a relative reference on its first `?` and `#`, decoding each
    /// part separately.
    ///
    /// A `#` with nothing after it yields an empty fragment.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the reference is absolute, empty, or any part
    /// holds an illegal character or bad escape.
    pub fn from_reference(reference: &str) -> Result<Self, ParseError> {
        trace!(input = reference, "converting relative reference");
        if reference.is_empty() {
            return Err(ParseError::new(reference, ParseErrorKind::Empty));
        }
        if find_scheme_delimiter(reference).is_some() {
            let scheme = reference.split(':').next().unwrap_or_default();
            return Err(ParseError::new(
                reference,
                ParseErrorKind::UnsupportedScheme {
                    scheme: scheme.to_ascii_lowercase(),
                },
            ));
        }

        let (rest, fragment) = match reference.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (reference, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };

        let fail = |kind| ParseError::new(reference, kind);
        let mut state = ScanState::default();
        let path_chars: Vec<char> = path.chars().collect();
        engine::scan_segments(&mut state, &path_chars, 0, |_| false).map_err(fail)?;
        if let Some(query) = query {
            let query = ParameterMultimap::parse(query, ParameterStyle::Query)
                .map_err(|err| fail(err.kind))?;
            state.parameters = (!query.is_empty()).then_some(query);
        }
        if let Some(fragment) = fragment {
            let chars: Vec<char> = fragment.chars().collect();
            state.fragment = Some(engine::scan_text(&chars, 0, Component::Fragment).map_err(fail)?);
        }
        Ok(HttpGrammar::create_instance(state, reference))
    }

    pub(crate) fn assemble(
        mut parts: AddressParts,
        query: Option<ParameterMultimap>,
        fragment: Option<String>,
    ) -> Self {
        let query = query.filter(|query| !query.is_empty());

        let mut canonical = String::new();
        parts.write_authority(&mut canonical, None);
        canonical.push_str(&parts.path);
        if let Some(query) = &query {
            canonical.push('?');
            canonical.push_str(&query.to_string());
        }
        if let Some(fragment) = &fragment {
            canonical.push('#');
            canonical.push_str(&escape::encode(fragment, is_fragment_char));
        }
        // An empty reference prints as `.`, which reads back to the same value.
        if canonical.is_empty() {
            canonical.push('.');
        }

        if parts.original.is_empty() {
            parts.original.clone_from(&canonical);
        }
        let hash = hash_of(&canonical);
        Self {
            parts,
            query,
            fragment,
            canonical,
            hash,
        }
    }

    /// Returns true if the address has a scheme and host.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        !self.parts.scheme.is_empty()
    }

    /// Returns the query parameters, if present.
    ///
    /// An empty query (`?` with nothing after it) counts as absent.
    #[must_use]
    pub const fn query(&self) -> Option<&ParameterMultimap> {
        self.query.as_ref()
    }

    /// Returns the decoded fragment, if present.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Strips scheme and authority, keeping path, query and fragment.
    #[must_use]
    pub fn as_relative(&self) -> Self {
        if !self.is_absolute() {
            return self.clone();
        }
        let mut parts = self.parts.with_segments(self.parts.segments.clone(), is_http_path_char);
        parts.scheme.clear();
        parts.host.clear();
        parts.port = None;
        Self::assemble(parts, self.query.clone(), self.fragment.clone())
    }

    /// Attaches, replaces or removes the fragment.
    ///
    /// Without an existing fragment, `fragment` is attached as is. With one,
    /// `None` removes it and `Some` is resolved by `policy`.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::FragmentPresent` under
    /// [`FragmentPolicy::Throw`], or the segment error of
    /// [`add_segment`](Address::add_segment) if
    /// [`FragmentPolicy::MoveAsSegment`] moves a `.` or `..` fragment.
    ///
    /// # Examples
    ///
    /// ```
    /// use http_grammar::{Address, FragmentPolicy, HttpAddress};
    ///
    /// let address = HttpAddress::parse("http://h/docs#intro").unwrap();
    ///
    /// let appended = address.with_fragment(Some("-more"), FragmentPolicy::Append).unwrap();
    /// assert_eq!(appended.as_str(), "http://h/docs#intro-more");
    ///
    /// let moved = address.with_fragment(Some("top"), FragmentPolicy::MoveAsSegment).unwrap();
    /// assert_eq!(moved.as_str(), "http://h/docs/intro#top");
    /// ```
    pub fn with_fragment(
        &self,
        fragment: Option<&str>,
        policy: FragmentPolicy,
    ) -> Result<Self, AddressError> {
        let Some(existing) = &self.fragment else {
            return Ok(self.replace_fragment(fragment.map(ToString::to_string)));
        };
        let Some(fragment) = fragment else {
            return Ok(self.replace_fragment(None));
        };

        match policy {
            FragmentPolicy::Throw => Err(AddressError::FragmentPresent {
                existing: existing.clone(),
            }),
            FragmentPolicy::Replace => Ok(self.replace_fragment(Some(fragment.to_string()))),
            FragmentPolicy::Append => Ok(self.replace_fragment(Some(format!("{existing}{fragment}")))),
            FragmentPolicy::MoveAsSegment => {
                let moved = if existing.is_empty() {
                    self.clone()
                } else {
                    self.add_segment(existing)?
                };
                Ok(moved.replace_fragment(Some(fragment.to_string())))
            }
        }
    }

    fn replace_fragment(&self, fragment: Option<String>) -> Self {
        let parts = self.parts.with_segments(self.parts.segments.clone(), is_http_path_char);
        Self::assemble(parts, self.query.clone(), fragment)
    }

    /// Joins an absolute address and a relative reference.
    ///
    /// The operands may come in either order. The result has the absolute
    /// operand's authority, its segments followed by the relative operand's
    /// segments, the union of both queries and whichever fragment exists.
    ///
    /// # Errors
    ///
    /// Returns `AddressError` if:
    /// - Both or neither operands are absolute
    /// - Both operands carry a fragment
    pub fn concat(&self, other: &Self) -> Result<Self, AddressError> {
        let (absolute, relative) = match (self.is_absolute(), other.is_absolute()) {
            (true, false) => (self, other),
            (false, true) => (other, self),
            (left, right) => {
                return Err(AddressError::AbsoluteOperands {
                    absolute: usize::from(left) + usize::from(right),
                });
            }
        };
        if absolute.fragment.is_some() && relative.fragment.is_some() {
            return Err(AddressError::ConflictingFragments);
        }

        let mut segments = absolute.parts.segments.clone();
        if !relative.parts.segments.is_empty() && segments.last().is_some_and(String::is_empty) {
            segments.pop();
        }
        segments.extend(relative.parts.segments.iter().cloned());

        let query = match (&absolute.query, &relative.query) {
            (Some(left), Some(right)) => {
                let mut merged = left.clone();
                merged.merge(right);
                Some(merged)
            }
            (left, right) => left.clone().or_else(|| right.clone()),
        };
        let fragment = absolute.fragment.clone().or_else(|| relative.fragment.clone());

        let parts = absolute.parts.with_segments(segments, is_http_path_char);
        Ok(Self::assemble(parts, query, fragment))
    }
}

impl Sealed for HttpAddress {
    fn parts(&self) -> &AddressParts {
        &self.parts
    }

    fn rebuild(&self, segments: Vec<String>, parameters: Option<ParameterMultimap>) -> Self {
        let parts = self.parts.with_segments(segments, is_http_path_char);
        Self::assemble(parts, parameters, self.fragment.clone())
    }
}

impl Address for HttpAddress {
    fn as_str(&self) -> &str {
        &self.canonical
    }

    fn parameters(&self) -> Option<&ParameterMultimap> {
        self.query.as_ref()
    }
}

impl TryFrom<&url::Url> for HttpAddress {
    type Error = ParseError;

    /// Decomposes an absolute `Url` component by component.
    fn try_from(url: &url::Url) -> Result<Self, Self::Error> {
        trace!(input = url.as_str(), "converting url");
        let fail = |kind| ParseError::new(url.as_str(), kind);

        let scheme = url.scheme();
        if HttpGrammar::default_port(scheme).is_none() {
            return Err(fail(ParseErrorKind::UnsupportedScheme {
                scheme: scheme.to_string(),
            }));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(fail(ParseErrorKind::LoginNotSupported {
                scheme: scheme.to_string(),
            }));
        }
        let host = url.host_str().ok_or_else(|| fail(ParseErrorKind::MissingHost))?;

        let mut state = ScanState {
            scheme: scheme.to_string(),
            host: host.to_ascii_lowercase(),
            port: url.port(),
            rooted: true,
            ..ScanState::default()
        };
        for segment in url.path_segments().into_iter().flatten() {
            let decoded = escape::decode(segment).map_err(|reason| {
                fail(ParseErrorKind::InvalidEscape {
                    position: 0,
                    reason,
                })
            })?;
            state.segments.push(decoded);
        }
        if let Some(query) = url.query() {
            let query = ParameterMultimap::parse(query, ParameterStyle::Query)
                .map_err(|err| fail(err.kind))?;
            state.parameters = (!query.is_empty()).then_some(query);
        }
        if let Some(fragment) = url.fragment() {
            let decoded = escape::decode(fragment).map_err(|reason| {
                fail(ParseErrorKind::InvalidEscape {
                    position: 0,
                    reason,
                })
            })?;
            state.fragment = Some(decoded);
        }

        Ok(HttpGrammar::create_instance(state, url.as_str()))
    }
}

impl TryFrom<url::Url> for HttpAddress {
    type Error = ParseError;

    fn try_from(url: url::Url) -> Result<Self, Self::Error> {
        Self::try_from(&url)
    }
}

impl fmt::Display for HttpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl FromStr for HttpAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for HttpAddress {
    fn as_ref(&self) -> &str {
        &self.canonical
    }
}

impl TryFrom<&str> for HttpAddress {
    type Error = ParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl PartialEq for HttpAddress {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.canonical == other.canonical
    }
}

impl Eq for HttpAddress {}

impl Hash for HttpAddress {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl PartialOrd for HttpAddress {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HttpAddress {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for HttpAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.canonical)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for HttpAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
