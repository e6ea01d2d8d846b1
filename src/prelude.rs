//! Convenient re-exports for glob imports.
//!
//! This module provides a single import for all common types, including the
//! [`Address`](crate::Address) trait whose methods every address type uses:
//!
//! ```rust
//! use http_grammar::prelude::*;
//!
//! let address = AnyAddress::parse("ftp://joe@ftp.example.com/pub").unwrap();
//! assert_eq!(address.user_name(), "joe");
//! ```
//!
//! Builder state markers (`Empty`, `HasScheme`, `Ready`) are intentionally
//! excluded as they are implementation details.

pub use crate::{
    // Addresses
    Address, AnyAddress, FragmentPolicy, FtpAddress, HttpAddress, ParameterMultimap,
    ParameterStyle,
    // Builder
    HttpAddressBuilder,
    // Headers
    Header, HeaderCollection, HeaderParameter, HeaderParameterCollection, HeaderParser,
    HeaderParserConfig, HeaderValue, ParameterValue, TypedValue, ValueKind,
    // Errors
    AddressError, BuilderError, HeaderError, ParseError, ParseErrorKind,
};
