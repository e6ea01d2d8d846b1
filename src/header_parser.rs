//! Header block, line, value and parameter parsing.
//!
//! All scanners share one quote/escape-aware state machine. Outside quoted
//! strings and angle-bracketed literals a backslash escapes the next
//! character and `,` and `;` separate list items. Inside a quoted string a
//! backslash only keeps the next `"` from closing it. An angle-bracketed
//! literal runs to the first `>` and opens only where a value can begin:
//! at the start, or after `=`, `;` or `,`.

use tracing::{debug, trace};

use crate::charset::is_token_char;
use crate::config::HeaderParserConfig;
use crate::error::{ParseError, ParseErrorKind};
use crate::header::{
    Header, HeaderParameter, HeaderParameterCollection, HeaderValue, ParameterValue, TypedValue,
    parse_decimal, parse_integer,
};
use crate::header_collection::HeaderCollection;

/// Parses raw header text into the header model.
///
/// A parser holds only its configuration and can be shared freely; every
/// call scans with fresh state.
///
/// # Examples
///
/// ```
/// use http_grammar::{HeaderParser, ParameterValue};
///
/// let parser = HeaderParser::default();
/// let value = parser.parse_value(r#"foo; a="x;y"; b=<http://h/p>"#).unwrap();
/// assert_eq!(value.value(), "foo");
/// assert_eq!(
///     value.parameter("a").and_then(|p| p.value()),
///     Some(&ParameterValue::Quoted("x;y".to_string()))
/// );
/// assert_eq!(
///     value.parameter("b").and_then(|p| p.value()),
///     Some(&ParameterValue::Uri("http://h/p".to_string()))
/// );
///
/// let header = parser.parse_header(r#"Accept: a, b;x="1,2""#).unwrap();
/// assert_eq!(header.values().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HeaderParser {
    config: HeaderParserConfig,
}

impl HeaderParser {
    /// Creates a parser with the given configuration.
    #[must_use]
    pub const fn new(config: HeaderParserConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &HeaderParserConfig {
        &self.config
    }

    /// Parses a block of `Name: value` lines.
    ///
    /// Lines end in LF or CRLF. A line starting with a space or tab
    /// continues the previous header. Blank lines are skipped. Repeated
    /// headers are merged.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if a line is malformed or a continuation line
    /// has no header to continue.
    pub fn parse_headers(&self, block: &str) -> Result<HeaderCollection, ParseError> {
        trace!(len = block.len(), "parsing header block");
        let headers = self
            .scan_headers(block)
            .map_err(|kind| reject(block, kind))?;
        trace!(headers = headers.len(), "parsed header block");
        Ok(headers)
    }

    /// Parses like [`parse_headers`](Self::parse_headers), returning `None`
    /// on malformed input.
    #[must_use]
    pub fn try_parse_headers(&self, block: &str) -> Option<HeaderCollection> {
        self.parse_headers(block).ok()
    }

    /// Parses one unfolded `Name: value` line.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if:
    /// - The line has no `name:` prefix or the name is not a token
    /// - A quoted string is unterminated or the line ends in a backslash
    /// - A typed header has several values or an unconvertible value
    pub fn parse_header(&self, line: &str) -> Result<Header, ParseError> {
        trace!(input = line, "parsing header");
        self.scan_header(line).map_err(|kind| reject(line, kind))
    }

    /// Parses like [`parse_header`](Self::parse_header), returning `None`
    /// on malformed input.
    #[must_use]
    pub fn try_parse_header(&self, line: &str) -> Option<Header> {
        self.parse_header(line).ok()
    }

    /// Parses a single `value[; name[=value]]*` item.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if a quoted string is unterminated, the text
    /// ends in a backslash, or a parameter has no name.
    pub fn parse_value(&self, text: &str) -> Result<HeaderValue, ParseError> {
        self.scan_value(text.trim())
            .map_err(|kind| reject(text, kind))
    }

    /// Parses like [`parse_value`](Self::parse_value), returning `None` on
    /// malformed input.
    #[must_use]
    pub fn try_parse_value(&self, text: &str) -> Option<HeaderValue> {
        self.parse_value(text).ok()
    }

    /// Parses a single `name[=value]` parameter.
    ///
    /// The value kind follows its surface syntax: a quoted string, an
    /// angle-bracketed URI, an integer, a decimal, a configured
    /// enumeration literal, and otherwise a plain token.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the name is empty or the value is not
    /// properly quoted or escaped.
    pub fn parse_parameter(&self, text: &str) -> Result<HeaderParameter, ParseError> {
        self.scan_parameter(text.trim())
            .map_err(|kind| reject(text, kind))
    }

    /// Parses like [`parse_parameter`](Self::parse_parameter), returning
    /// `None` on malformed input.
    #[must_use]
    pub fn try_parse_parameter(&self, text: &str) -> Option<HeaderParameter> {
        self.parse_parameter(text).ok()
    }

    fn scan_headers(&self, block: &str) -> Result<HeaderCollection, ParseErrorKind> {
        let mut lines: Vec<String> = Vec::new();
        for raw in block.split('\n') {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            if line.trim().is_empty() {
                continue;
            }
            if line.starts_with([' ', '\t']) {
                let Some(current) = lines.last_mut() else {
                    return Err(ParseErrorKind::DanglingContinuation);
                };
                current.push(' ');
                current.push_str(line.trim());
            } else {
                lines.push(line.to_string());
            }
        }

        let mut headers = HeaderCollection::new();
        for line in &lines {
            let header = self.scan_header(line)?;
            headers.add(header).map_err(ParseErrorKind::Header)?;
        }
        Ok(headers)
    }

    fn scan_header(&self, line: &str) -> Result<Header, ParseErrorKind> {
        let missing_name = || ParseErrorKind::MissingHeaderName {
            line: line.to_string(),
        };
        let (name, rest) = line.split_once(':').ok_or_else(missing_name)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(missing_name());
        }
        if !name.chars().all(is_token_char) {
            return Err(ParseErrorKind::InvalidHeaderName {
                name: name.to_string(),
            });
        }
        let rest = rest.trim();

        if let Some(kind) = self.config.typed_kind(name) {
            let pieces = list_items(rest)?;
            if pieces.len() > 1 {
                return Err(ParseErrorKind::TooManyValues {
                    name: name.to_string(),
                    count: pieces.len(),
                });
            }
            let value = pieces
                .first()
                .map(|text| {
                    TypedValue::parse(kind, text)
                        .map(HeaderValue::typed)
                        .ok_or_else(|| ParseErrorKind::InvalidTypedValue {
                            name: name.to_string(),
                            kind,
                            value: (*text).to_string(),
                        })
                })
                .transpose()?;
            return Header::typed(name, kind, value).map_err(ParseErrorKind::Header);
        }

        if self.config.is_unsplittable(name) {
            let value = (!rest.is_empty()).then(|| HeaderValue::opaque(rest));
            return Header::new(name, value).map_err(ParseErrorKind::Header);
        }

        let values = list_items(rest)?
            .into_iter()
            .map(|text| self.scan_value(text))
            .collect::<Result<Vec<_>, _>>()?;
        Header::new(name, values).map_err(ParseErrorKind::Header)
    }

    fn scan_value(&self, text: &str) -> Result<HeaderValue, ParseErrorKind> {
        let mut pieces = split_top_level(text, ';')?.into_iter();
        let value = unescape_value(pieces.next().unwrap_or_default().trim())?;

        let mut parameters = HeaderParameterCollection::new();
        for piece in pieces.map(str::trim).filter(|piece| !piece.is_empty()) {
            parameters.insert(self.scan_parameter(piece)?);
        }
        Ok(HeaderValue::new(value).with_parameters(parameters))
    }

    fn scan_parameter(&self, text: &str) -> Result<HeaderParameter, ParseErrorKind> {
        let (name, rest) = match find_plain(text, '=')? {
            Some(index) => (&text[..index], Some(text[index + 1..].trim())),
            None => (text, None),
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(ParseErrorKind::EmptyParameterName { position: 0 });
        }
        let value = rest.map(|rest| self.parameter_value(rest)).transpose()?;
        HeaderParameter::new(name, value).map_err(ParseErrorKind::Header)
    }

    fn parameter_value(&self, rest: &str) -> Result<ParameterValue, ParseErrorKind> {
        if let Some(inner) = quoted_inner(rest) {
            return Ok(ParameterValue::Quoted(unquote(inner)));
        }
        if let Some(uri) = rest.strip_prefix('<').and_then(|r| r.strip_suffix('>')) {
            return Ok(ParameterValue::Uri(uri.to_string()));
        }
        if let Some(value) = parse_integer(rest) {
            return Ok(ParameterValue::Integer(value));
        }
        if let Some(value) = parse_decimal(rest) {
            return Ok(ParameterValue::Decimal(value));
        }
        if let Some(literal) = self.config.enumeration(rest) {
            return Ok(ParameterValue::Enumeration(literal.to_string()));
        }
        unescape_value(rest).map(ParameterValue::Token)
    }
}

fn reject(input: &str, kind: ParseErrorKind) -> ParseError {
    debug!(input, error = %kind, "rejected header text");
    ParseError::new(input, kind)
}

/// How the scanner classified one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    /// Outside any region and not escaped
    Plain,
    /// A backslash outside any region
    Escape,
    /// The character after an outside backslash
    Escaped,
    /// Inside a quoted string or angle-bracketed literal, delimiters included
    Region,
}

/// `<` opens a literal only where a value can begin.
const fn opens_angle(last: Option<char>) -> bool {
    matches!(last, None | Some('=' | ';' | ','))
}

fn classify(text: &str, mut visit: impl FnMut(usize, char, Class)) -> Result<(), ParseErrorKind> {
    let mut quoted = false;
    let mut angled = false;
    let mut escaped = false;
    let mut last: Option<char> = None;

    for (index, c) in text.char_indices() {
        if quoted {
            visit(index, c, Class::Region);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                quoted = false;
                last = Some('"');
            }
        } else if angled {
            visit(index, c, Class::Region);
            if c == '>' {
                angled = false;
                last = Some('>');
            }
        } else if escaped {
            visit(index, c, Class::Escaped);
            escaped = false;
            last = Some('\\');
        } else {
            match c {
                '\\' => {
                    visit(index, c, Class::Escape);
                    escaped = true;
                }
                '"' => {
                    visit(index, c, Class::Region);
                    quoted = true;
                }
                '<' if opens_angle(last) => {
                    visit(index, c, Class::Region);
                    angled = true;
                }
                _ => {
                    visit(index, c, Class::Plain);
                    if !c.is_whitespace() {
                        last = Some(c);
                    }
                }
            }
        }
    }

    // An unclosed angle bracket simply runs to the end.
    if quoted {
        return Err(ParseErrorKind::UnterminatedQuote);
    }
    if escaped {
        return Err(ParseErrorKind::DanglingEscape);
    }
    Ok(())
}

/// Splits at every plain occurrence of `separator`.
fn split_top_level(text: &str, separator: char) -> Result<Vec<&str>, ParseErrorKind> {
    let mut cuts = Vec::new();
    classify(text, |index, c, class| {
        if class == Class::Plain && c == separator {
            cuts.push(index);
        }
    })?;

    let mut pieces = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for cut in cuts {
        pieces.push(&text[start..cut]);
        start = cut + separator.len_utf8();
    }
    pieces.push(&text[start..]);
    Ok(pieces)
}

/// The trimmed, non-empty items of a comma-separated list.
fn list_items(text: &str) -> Result<Vec<&str>, ParseErrorKind> {
    Ok(split_top_level(text, ',')?
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect())
}

fn find_plain(text: &str, target: char) -> Result<Option<usize>, ParseErrorKind> {
    let mut found = None;
    classify(text, |index, c, class| {
        if found.is_none() && class == Class::Plain && c == target {
            found = Some(index);
        }
    })?;
    Ok(found)
}

/// Drops escaping backslashes outside regions; regions stay verbatim.
fn unescape_value(text: &str) -> Result<String, ParseErrorKind> {
    let mut out = String::with_capacity(text.len());
    classify(text, |_, c, class| {
        if class != Class::Escape {
            out.push(c);
        }
    })?;
    Ok(out)
}

/// Returns the text between the quotes if `text` is exactly one quoted
/// string.
fn quoted_inner(text: &str) -> Option<&str> {
    let body = text.strip_prefix('"')?;
    let mut escaped = false;
    for (index, c) in body.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return (index + 1 == body.len()).then(|| &body[..index]);
        }
    }
    None
}

fn unquote(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut escaped = false;
    for c in inner.chars() {
        if !escaped && c == '\\' {
            escaped = true;
        } else {
            out.push(c);
            escaped = false;
        }
    }
    out
}

/// Prints a header value so that scanning it yields `value` again.
pub(crate) fn escape_value(value: &str) -> String {
    escape_from(value, None)
}

/// Prints a bare parameter token that follows `=`.
///
/// A leading `"` or `<` is escaped so the token does not read back as a
/// quoted string or URI literal.
pub(crate) fn escape_token(token: &str) -> String {
    for opener in ['"', '<'] {
        if let Some(rest) = token.strip_prefix(opener) {
            let mut out = String::with_capacity(token.len() + 2);
            out.push('\\');
            out.push(opener);
            out.push_str(&escape_from(rest, Some('\\')));
            return out;
        }
    }
    escape_from(token, Some('='))
}

/// The inverse of [`classify`] followed by [`unescape_value`], starting
/// after the significant character `last`.
fn escape_from(value: &str, mut last: Option<char>) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());
    let mut index = 0;

    while index < chars.len() {
        let c = chars[index];
        let region_end = match c {
            '"' => closing_quote(&chars, index + 1),
            '<' if opens_angle(last) => chars[index + 1..]
                .iter()
                .position(|&c| c == '>')
                .map(|offset| index + 1 + offset),
            _ => None,
        };

        if let Some(end) = region_end {
            out.extend(&chars[index..=end]);
            last = Some(chars[end]);
            index = end + 1;
            continue;
        }

        match c {
            '\\' | ';' | ',' | '"' | '<' if c != '<' || opens_angle(last) => {
                out.push('\\');
                out.push(c);
                last = Some('\\');
            }
            _ => {
                out.push(c);
                if !c.is_whitespace() {
                    last = Some(c);
                }
            }
        }
        index += 1;
    }
    out
}

fn closing_quote(chars: &[char], start: usize) -> Option<usize> {
    let mut escaped = false;
    for (index, &c) in chars.iter().enumerate().skip(start) {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return Some(index);
        }
    }
    None
}
