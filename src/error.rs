//! Error types for address and header parsing.

use std::fmt;

use thiserror::Error;

use crate::header::ValueKind;

/// Malformed address or header text.
///
/// This is the single failure kind of both parsers: no partially parsed
/// value is ever returned alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to parse '{input}': {kind}")]
pub struct ParseError {
    /// The input that failed to parse
    pub input: String,
    /// The specific error that occurred
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(input: &str, kind: ParseErrorKind) -> Self {
        Self {
            input: input.to_string(),
            kind,
        }
    }
}

/// The address component being scanned when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    /// The scheme before `://`
    Scheme,
    /// The user name before `@`
    UserName,
    /// The password between `:` and `@`
    Password,
    /// The host name
    Host,
    /// The port number
    Port,
    /// A path segment
    Path,
    /// The `?` query
    Query,
    /// The `;` parameters of an FTP-family address
    Parameters,
    /// The `#` fragment
    Fragment,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scheme => "scheme",
            Self::UserName => "user name",
            Self::Password => "password",
            Self::Host => "host",
            Self::Port => "port",
            Self::Path => "path",
            Self::Query => "query",
            Self::Parameters => "parameters",
            Self::Fragment => "fragment",
        };
        f.write_str(name)
    }
}

/// Specific parsing error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// Input is empty
    #[error("input is empty")]
    Empty,
    /// The scheme is not handled by the grammar
    #[error("unsupported scheme '{scheme}'")]
    UnsupportedScheme {
        /// The scheme that was found
        scheme: String,
    },
    /// An absolute address was required but no `://` was found
    #[error("missing scheme; the address must start with '<scheme>://'")]
    MissingScheme,
    /// Credentials were given to a grammar without login support
    #[error("login credentials are not supported by {scheme} addresses")]
    LoginNotSupported {
        /// The scheme of the address
        scheme: String,
    },
    /// A character is not legal in the component being scanned
    #[error("unexpected character '{found}' at position {position} in {component}")]
    UnexpectedChar {
        /// The unexpected character
        found: char,
        /// Character position in the input
        position: usize,
        /// The component being scanned
        component: Component,
    },
    /// A percent-escape could not be decoded
    #[error("invalid percent-escape at position {position}: {reason}")]
    InvalidEscape {
        /// Character position of the `%`
        position: usize,
        /// Why decoding failed
        reason: EscapeError,
    },
    /// The port is not a number between 0 and 65535
    #[error("invalid port '{value}'")]
    InvalidPort {
        /// The port text
        value: String,
    },
    /// The authority has no host
    #[error("missing host")]
    MissingHost,
    /// The host contains characters a host name cannot hold
    #[error("invalid host '{host}'")]
    InvalidHost {
        /// The decoded host text
        host: String,
    },
    /// A query or parameter pair has a value but no key
    #[error("parameter without a name at position {position}")]
    EmptyParameterName {
        /// Character position where the pair starts
        position: usize,
    },
    /// A header line has no `name:` prefix
    #[error("missing header name in line '{line}'")]
    MissingHeaderName {
        /// The offending line
        line: String,
    },
    /// A header name is not an RFC 7230 token
    #[error("invalid header name '{name}'")]
    InvalidHeaderName {
        /// The offending name
        name: String,
    },
    /// A folded continuation line appears before any header
    #[error("continuation line without a preceding header")]
    DanglingContinuation,
    /// A quoted string is not closed
    #[error("unterminated quoted string")]
    UnterminatedQuote,
    /// The text ends with a lone backslash
    #[error("dangling escape character")]
    DanglingEscape,
    /// A typed header value cannot be converted to its kind
    #[error("header '{name}' expects a value of kind {kind}, found '{value}'")]
    InvalidTypedValue {
        /// The header name
        name: String,
        /// The expected value kind
        kind: ValueKind,
        /// The offending value
        value: String,
    },
    /// A typed header received more than one value
    #[error("header '{name}' accepts exactly one value, found {count}")]
    TooManyValues {
        /// The header name
        name: String,
        /// Number of values found
        count: usize,
    },
    /// Assembling the parsed headers broke a header invariant
    #[error("{0}")]
    Header(HeaderError),
}

/// Errors decoding a `%XX` escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EscapeError {
    /// Fewer than two characters follow the `%`
    #[error("truncated escape sequence")]
    Truncated,
    /// A character after `%` is not a hexadecimal digit
    #[error("'{found}' is not a hexadecimal digit")]
    InvalidHexDigit {
        /// The offending character
        found: char,
    },
    /// The decoded bytes are not UTF-8
    #[error("escaped bytes are not valid UTF-8")]
    InvalidUtf8,
}

/// Invalid arguments to address operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// A required argument is empty
    #[error("argument '{argument}' must not be empty")]
    EmptyArgument {
        /// Name of the argument
        argument: &'static str,
    },
    /// A `.` or `..` segment was passed to a segment operation
    #[error("dot segment '{segment}' cannot be stored in a path")]
    DotSegment {
        /// The rejected segment
        segment: String,
    },
    /// A segment index is past the end of the path
    #[error("segment index {index} is out of range for {len} segments")]
    IndexOutOfRange {
        /// The requested index
        index: usize,
        /// Number of segments
        len: usize,
    },
    /// Concatenation needs exactly one absolute operand
    #[error("concatenation requires exactly one absolute address, found {absolute}")]
    AbsoluteOperands {
        /// Number of absolute operands
        absolute: usize,
    },
    /// Both concatenation operands carry a fragment
    #[error("both addresses carry a fragment")]
    ConflictingFragments,
    /// A fragment exists and the policy forbids touching it
    #[error("address already has fragment '{existing}'")]
    FragmentPresent {
        /// The existing fragment
        existing: String,
    },
    /// The operation does not apply to this kind of address
    #[error("operation '{operation}' is not supported by {scheme} addresses")]
    Unsupported {
        /// The operation name
        operation: &'static str,
        /// The scheme of the address
        scheme: String,
    },
}

/// Header invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// A header name is empty
    #[error("header name must not be empty")]
    EmptyName,
    /// A header parameter name is empty
    #[error("header parameter name must not be empty")]
    EmptyParameterName,
    /// The last value of a typed header cannot be removed
    #[error("cannot remove the only value of typed header '{name}'")]
    LastTypedValue {
        /// The header name
        name: String,
    },
    /// A typed header received a value of another kind
    #[error("header '{name}' only accepts values of kind {expected}")]
    UntypedValue {
        /// The header name
        name: String,
        /// The kind the header holds
        expected: ValueKind,
    },
    /// An untyped header received a typed value
    #[error("header '{name}' is untyped and cannot hold a typed value")]
    TypedValue {
        /// The header name
        name: String,
    },
    /// A header parameter name holds a character outside the token set
    #[error("invalid header parameter name '{name}'")]
    InvalidParameterName {
        /// The rejected name
        name: String,
    },
    /// A typed header was constructed with several values
    #[error("typed header '{name}' holds exactly one value, got {count}")]
    MultipleTypedValues {
        /// The header name
        name: String,
        /// Number of values supplied
        count: usize,
    },
}

/// Errors that can occur when building an address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    /// The scheme is not an HTTP-family scheme
    #[error("unsupported scheme '{scheme}'")]
    UnsupportedScheme {
        /// The rejected scheme
        scheme: String,
    },
    /// The host is empty or holds characters a host cannot hold
    #[error("invalid host '{host}'")]
    InvalidHost {
        /// The rejected host
        host: String,
    },
    /// A segment or parameter argument was rejected
    #[error(transparent)]
    Address(#[from] AddressError),
}
