//! Header value model.
//!
//! A [`Header`] is a case-insensitive name with an ordered list of
//! [`HeaderValue`]s. Each value carries a [`HeaderParameterCollection`].
//! Typed headers (such as `Content-Length`) hold exactly one
//! [`TypedValue`] at all times.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use ordered_float::NotNan;

use crate::charset::is_token_char;
use crate::constants::CONTENT_LENGTH;
use crate::error::HeaderError;
use crate::header_parser::{escape_token, escape_value};

/// The payload type of a typed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// A signed 64-bit integer
    Integer,
    /// A finite decimal number
    Decimal,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => f.write_str("integer"),
            Self::Decimal => f.write_str("decimal"),
        }
    }
}

/// The payload of a typed header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypedValue {
    /// An integer payload
    Integer(i64),
    /// A decimal payload
    Decimal(NotNan<f64>),
}

impl TypedValue {
    /// Converts `text` to a payload of `kind`.
    ///
    /// Decimal payloads also accept integer text.
    #[must_use]
    pub fn parse(kind: ValueKind, text: &str) -> Option<Self> {
        match kind {
            ValueKind::Integer => parse_integer(text).map(Self::Integer),
            ValueKind::Decimal => parse_decimal(text)
                .or_else(|| parse_integer(text).and_then(integer_to_decimal))
                .map(Self::Decimal),
        }
    }

    /// Returns the zero value of `kind`.
    #[must_use]
    pub fn default_for(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Integer => Self::Integer(0),
            ValueKind::Decimal => Self::Decimal(NotNan::default()),
        }
    }

    /// Returns the kind of this payload.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Integer(_) => ValueKind::Integer,
            Self::Decimal(_) => ValueKind::Decimal,
        }
    }

    /// Returns the integer payload, if this is one.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Decimal(_) => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Decimal(value) => f.write_str(&format_decimal(*value)),
        }
    }
}

/// Parses `[+-]digits` as an `i64`.
pub(crate) fn parse_integer(text: &str) -> Option<i64> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Parses `[+-]digits.digits` as a finite `f64`.
pub(crate) fn parse_decimal(text: &str) -> Option<NotNan<f64>> {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (whole, fraction) = unsigned.split_once('.')?;
    let is_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(whole) || !is_digits(fraction) {
        return None;
    }
    let value: f64 = text.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    NotNan::new(value).ok()
}

#[allow(clippy::cast_precision_loss)]
fn integer_to_decimal(value: i64) -> Option<NotNan<f64>> {
    NotNan::new(value as f64).ok()
}

/// Formats a decimal so that it always reads back as a decimal.
fn format_decimal(value: NotNan<f64>) -> String {
    let text = value.into_inner().to_string();
    if text.contains('.') {
        text
    } else {
        format!("{text}.0")
    }
}

/// The value of a header parameter, chosen by its surface syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParameterValue {
    /// A double-quoted string, stored unquoted and unescaped
    Quoted(String),
    /// An angle-bracketed URI literal, stored without the brackets
    Uri(String),
    /// An integer literal
    Integer(i64),
    /// A decimal literal
    Decimal(NotNan<f64>),
    /// A bare token matching a configured enumeration literal
    Enumeration(String),
    /// Any other bare token
    Token(String),
}

impl ParameterValue {
    /// Returns the textual payload of string-like values.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Quoted(text) | Self::Uri(text) | Self::Enumeration(text) | Self::Token(text) => {
                Some(text)
            }
            Self::Integer(_) | Self::Decimal(_) => None,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quoted(text) => {
                f.write_str("\"")?;
                for c in text.chars() {
                    if matches!(c, '"' | '\\') {
                        f.write_str("\\")?;
                    }
                    write!(f, "{c}")?;
                }
                f.write_str("\"")
            }
            Self::Uri(uri) => write!(f, "<{uri}>"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Decimal(value) => f.write_str(&format_decimal(*value)),
            Self::Enumeration(literal) => f.write_str(literal),
            Self::Token(token) => f.write_str(&escape_token(token)),
        }
    }
}

/// A `name[=value]` parameter of a header value.
///
/// The name is compared case-insensitively.
#[derive(Debug, Clone)]
pub struct HeaderParameter {
    name: String,
    value: Option<ParameterValue>,
}

impl HeaderParameter {
    /// Creates a parameter.
    ///
    /// # Errors
    ///
    /// Returns `HeaderError::EmptyParameterName` if `name` is empty, or
    /// `HeaderError::InvalidParameterName` if it is not a token.
    pub fn new(
        name: impl Into<String>,
        value: Option<ParameterValue>,
    ) -> Result<Self, HeaderError> {
        let name = name.into();
        if name.is_empty() {
            return Err(HeaderError::EmptyParameterName);
        }
        if !name.chars().all(is_token_char) {
            return Err(HeaderError::InvalidParameterName { name });
        }
        Ok(Self { name, value })
    }

    /// Returns the name as written.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value, or `None` for a bare `name`.
    #[must_use]
    pub const fn value(&self) -> Option<&ParameterValue> {
        self.value.as_ref()
    }

    fn key(&self) -> String {
        self.name.to_ascii_lowercase()
    }
}

impl PartialEq for HeaderParameter {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name) && self.value == other.value
    }
}

impl Eq for HeaderParameter {}

impl Hash for HeaderParameter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
        self.value.hash(state);
    }
}

impl fmt::Display for HeaderParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={value}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// The parameters of one header value, unique by case-insensitive name.
///
/// Order is irrelevant; iteration and printing follow name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct HeaderParameterCollection {
    parameters: BTreeMap<String, HeaderParameter>,
}

impl HeaderParameterCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a parameter, returning the one it replaced.
    pub fn insert(&mut self, parameter: HeaderParameter) -> Option<HeaderParameter> {
        self.parameters.insert(parameter.key(), parameter)
    }

    /// Looks a parameter up by case-insensitive name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&HeaderParameter> {
        self.parameters.get(&name.to_ascii_lowercase())
    }

    /// Returns true if a parameter with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes a parameter by case-insensitive name.
    pub fn remove(&mut self, name: &str) -> Option<HeaderParameter> {
        self.parameters.remove(&name.to_ascii_lowercase())
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Iterates in name order.
    pub fn iter(&self) -> impl Iterator<Item = &HeaderParameter> {
        self.parameters.values()
    }
}

impl FromIterator<HeaderParameter> for HeaderParameterCollection {
    fn from_iter<I: IntoIterator<Item = HeaderParameter>>(iter: I) -> Self {
        let mut collection = Self::new();
        for parameter in iter {
            collection.insert(parameter);
        }
        collection
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueForm {
    /// `value; param=...`, escaped on output
    Structured,
    /// Printed verbatim
    Opaque,
    Typed(TypedValue),
}

/// One comma-separated value of a header.
///
/// Two values are equal if their text and parameter sets are equal.
///
/// # Examples
///
/// ```
/// use http_grammar::{HeaderParameter, HeaderValue, ParameterValue};
/// use ordered_float::NotNan;
///
/// let charset = ParameterValue::Token("utf-8".to_string());
/// let q = ParameterValue::Decimal(NotNan::new(0.5).unwrap());
/// let value = HeaderValue::new("text/html")
///     .with_parameter(HeaderParameter::new("charset", Some(charset)).unwrap())
///     .with_parameter(HeaderParameter::new("q", Some(q)).unwrap());
/// assert_eq!(value.to_string(), "text/html; charset=utf-8; q=0.5");
/// ```
#[derive(Debug, Clone)]
pub struct HeaderValue {
    value: String,
    form: ValueForm,
    parameters: HeaderParameterCollection,
}

impl HeaderValue {
    /// Creates a value without parameters.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            form: ValueForm::Structured,
            parameters: HeaderParameterCollection::new(),
        }
    }

    /// Creates a value that is printed verbatim and never carries parameters.
    #[must_use]
    pub fn opaque(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            form: ValueForm::Opaque,
            parameters: HeaderParameterCollection::new(),
        }
    }

    /// Creates a typed value.
    #[must_use]
    pub fn typed(value: TypedValue) -> Self {
        Self {
            value: value.to_string(),
            form: ValueForm::Typed(value),
            parameters: HeaderParameterCollection::new(),
        }
    }

    /// Adds a parameter, replacing one of the same name.
    ///
    /// Opaque and typed values ignore parameters.
    #[must_use]
    pub fn with_parameter(mut self, parameter: HeaderParameter) -> Self {
        if self.form == ValueForm::Structured {
            self.parameters.insert(parameter);
        }
        self
    }

    pub(crate) fn with_parameters(mut self, parameters: HeaderParameterCollection) -> Self {
        self.parameters = parameters;
        self
    }

    /// Returns the value text without parameters.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the parameters.
    #[must_use]
    pub const fn parameters(&self) -> &HeaderParameterCollection {
        &self.parameters
    }

    /// Looks a parameter up by case-insensitive name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&HeaderParameter> {
        self.parameters.get(name)
    }

    /// Returns the typed payload, if this is a typed value.
    #[must_use]
    pub const fn typed_value(&self) -> Option<&TypedValue> {
        match &self.form {
            ValueForm::Typed(value) => Some(value),
            ValueForm::Structured | ValueForm::Opaque => None,
        }
    }
}

impl PartialEq for HeaderValue {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.parameters == other.parameters
    }
}

impl Eq for HeaderValue {}

impl Hash for HeaderValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
        self.parameters.hash(state);
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.form {
            ValueForm::Structured => f.write_str(&escape_value(&self.value))?,
            ValueForm::Opaque | ValueForm::Typed(_) => f.write_str(&self.value)?,
        }
        for parameter in self.parameters.iter() {
            write!(f, "; {parameter}")?;
        }
        Ok(())
    }
}

/// A header: a case-insensitive name and its values.
///
/// Headers are immutable; the `with_*` and `without_*` operations return a
/// new header.
///
/// # Examples
///
/// ```
/// use http_grammar::{Header, HeaderValue};
///
/// let header = Header::content_length(0);
/// assert_eq!(header.values().len(), 1);
/// assert!(header.without_value(&HeaderValue::new("0")).is_err());
///
/// let accept = Header::new("Accept", [HeaderValue::new("text/html")]).unwrap()
///     .with_value(HeaderValue::new("application/json")).unwrap();
/// assert_eq!(accept.to_string(), "Accept: text/html, application/json");
/// ```
#[derive(Debug, Clone)]
pub struct Header {
    name: String,
    kind: Option<ValueKind>,
    values: Vec<HeaderValue>,
}

impl Header {
    /// Creates an untyped header. Duplicate values are dropped.
    ///
    /// # Errors
    ///
    /// Returns `HeaderError` if:
    /// - `name` is empty
    /// - A value is a typed value
    pub fn new(
        name: impl Into<String>,
        values: impl IntoIterator<Item = HeaderValue>,
    ) -> Result<Self, HeaderError> {
        let name = name.into();
        if name.is_empty() {
            return Err(HeaderError::EmptyName);
        }
        let mut unique: Vec<HeaderValue> = Vec::new();
        for value in values {
            if value.typed_value().is_some() {
                return Err(HeaderError::TypedValue { name });
            }
            if !unique.contains(&value) {
                unique.push(value);
            }
        }
        Ok(Self {
            name,
            kind: None,
            values: unique,
        })
    }

    /// Creates a typed header holding exactly one value of `kind`.
    ///
    /// With no values, the zero value of `kind` is synthesized.
    ///
    /// # Errors
    ///
    /// Returns `HeaderError` if:
    /// - `name` is empty
    /// - More than one value is supplied
    /// - A value is not a typed value of `kind`
    pub fn typed(
        name: impl Into<String>,
        kind: ValueKind,
        values: impl IntoIterator<Item = HeaderValue>,
    ) -> Result<Self, HeaderError> {
        let name = name.into();
        if name.is_empty() {
            return Err(HeaderError::EmptyName);
        }
        let mut values: Vec<HeaderValue> = values.into_iter().collect();
        if values.len() > 1 {
            return Err(HeaderError::MultipleTypedValues {
                count: values.len(),
                name,
            });
        }
        if values.iter().any(|value| !is_of_kind(value, kind)) {
            return Err(HeaderError::UntypedValue {
                name,
                expected: kind,
            });
        }
        if values.is_empty() {
            values.push(HeaderValue::typed(TypedValue::default_for(kind)));
        }
        Ok(Self {
            name,
            kind: Some(kind),
            values,
        })
    }

    /// Creates a typed `Content-Length` header.
    #[must_use]
    pub fn content_length(length: i64) -> Self {
        Self {
            name: CONTENT_LENGTH.to_string(),
            kind: Some(ValueKind::Integer),
            values: vec![HeaderValue::typed(TypedValue::Integer(length))],
        }
    }

    /// Returns the name as written.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the values in order.
    #[must_use]
    pub fn values(&self) -> &[HeaderValue] {
        &self.values
    }

    /// Returns the first value.
    #[must_use]
    pub fn first(&self) -> Option<&HeaderValue> {
        self.values.first()
    }

    /// Returns the payload kind of a typed header.
    #[must_use]
    pub const fn kind(&self) -> Option<ValueKind> {
        self.kind
    }

    /// Returns the payload of a typed header.
    #[must_use]
    pub fn typed_value(&self) -> Option<&TypedValue> {
        self.kind?;
        self.values.first().and_then(HeaderValue::typed_value)
    }

    /// Returns true if `name` matches case-insensitively.
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Adds a value.
    ///
    /// Untyped headers ignore a value they already hold. Typed headers
    /// replace their sole value.
    ///
    /// # Errors
    ///
    /// Returns `HeaderError::UntypedValue` if the header is typed and
    /// `value` is not a typed value of its kind, or
    /// `HeaderError::TypedValue` if the header is untyped and `value` is
    /// typed.
    pub fn with_value(&self, value: HeaderValue) -> Result<Self, HeaderError> {
        let mut header = self.clone();
        match self.kind {
            Some(kind) => {
                if !is_of_kind(&value, kind) {
                    return Err(HeaderError::UntypedValue {
                        name: self.name.clone(),
                        expected: kind,
                    });
                }
                header.values = vec![value];
            }
            None if value.typed_value().is_some() => {
                return Err(HeaderError::TypedValue {
                    name: self.name.clone(),
                });
            }
            None => {
                if !header.values.contains(&value) {
                    header.values.push(value);
                }
            }
        }
        Ok(header)
    }

    /// Removes a value.
    ///
    /// # Errors
    ///
    /// Returns `HeaderError::LastTypedValue` if the header is typed and
    /// `value` is its sole value.
    pub fn without_value(&self, value: &HeaderValue) -> Result<Self, HeaderError> {
        if self.kind.is_some() && self.values.contains(value) {
            return Err(HeaderError::LastTypedValue {
                name: self.name.clone(),
            });
        }
        let mut header = self.clone();
        header.values.retain(|existing| existing != value);
        Ok(header)
    }

    /// Adds every value of `other` in order.
    ///
    /// # Errors
    ///
    /// Returns `HeaderError::UntypedValue` if this header is typed and
    /// `other` holds a value of another kind, or `HeaderError::TypedValue`
    /// if this header is untyped and `other` holds a typed value.
    pub fn merge(&self, other: &Self) -> Result<Self, HeaderError> {
        other
            .values
            .iter()
            .try_fold(self.clone(), |header, value| header.with_value(value.clone()))
    }
}

fn is_of_kind(value: &HeaderValue, kind: ValueKind) -> bool {
    value.typed_value().is_some_and(|typed| typed.kind() == kind)
}

impl PartialEq for Header {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name) && self.values == other.values
    }
}

impl Eq for Header {}

impl Hash for Header {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.to_ascii_lowercase().hash(state);
        self.values.hash(state);
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.name)?;
        for (index, value) in self.values.iter().enumerate() {
            let separator = if index == 0 { " " } else { ", " };
            write!(f, "{separator}{value}")?;
        }
        Ok(())
    }
}
