//! Parsers and canonical printers for HTTP/FTP addresses and HTTP headers.
//!
//! This crate turns raw address strings and raw header blocks into
//! immutable, strongly-typed values, and prints those values back in one
//! canonical wire form. The canonical form is also the identity of a value:
//! two addresses are equal exactly when they print the same.
//!
//! # Overview
//!
//! Two address grammars are supported:
//!
//! ```text
//! http[s]://host[:port]/path[?query][#fragment]      (or a relative path[?query][#fragment])
//! ftp[s]|ssh://[user[:password]@]host[:port]/path[;parameters]
//! ```
//!
//! Header blocks are `Name: value` lines with folding, comma-separated
//! values and `;`-separated parameters with quoted-string support.
//!
//! # Quick Start
//!
//! ```rust
//! use http_grammar::{Address, HttpAddress};
//!
//! let address = HttpAddress::parse("http://Example.com:80/a/./b/../c?x=1#top").unwrap();
//!
//! assert_eq!(address.as_str(), "http://example.com/a/c?x=1#top");
//! assert_eq!(address.segments(), ["a", "c"]);
//! assert_eq!(address.port(), Some(80));
//!
//! // Addresses are immutable; operations return new values
//! let longer = address.add_segment("d e").unwrap();
//! assert_eq!(longer.as_str(), "http://example.com/a/c/d%20e?x=1#top");
//!
//! // Relative references concatenate onto absolute addresses
//! let base = HttpAddress::parse("http://h/a/b").unwrap();
//! let relative = HttpAddress::parse("c/d?x=1").unwrap();
//! assert_eq!(base.concat(&relative).unwrap().as_str(), "http://h/a/b/c/d?x=1");
//! ```
//!
//! # Headers
//!
//! ```rust
//! use http_grammar::{HeaderCollection, HeaderParser, HeaderParserConfig};
//!
//! let headers = HeaderCollection::parse(
//!     "Accept: text/html;q=0.9, application/json\r\nContent-Length: 42\r\n",
//! ).unwrap();
//! assert_eq!(headers.content_length(), Some(42));
//! assert_eq!(headers.get("accept").map(|h| h.values().len()), Some(2));
//!
//! // Keep the whole value of a header in one piece
//! let parser = HeaderParser::new(HeaderParserConfig::new().with_unsplittable("Server"));
//! let server = parser.parse_header("Server: Apache/2.4 (Unix), mod_ssl").unwrap();
//! assert_eq!(server.values().len(), 1);
//! ```
//!
//! # Builder Pattern
//!
//! Use the typestate builder for compile-time enforced construction:
//!
//! ```rust
//! use http_grammar::{Address, HttpAddressBuilder};
//!
//! let address = HttpAddressBuilder::new()
//!     .scheme("https")
//!     .host("example.com")
//!     .segment("docs")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(address.as_str(), "https://example.com/docs");
//! ```
//!
//! # Default Ports
//!
//! | Scheme | Port |
//! |--------|------|
//! | `http` | 80 |
//! | `https` | 443 |
//! | `ftp` | 21 |
//! | `ftps` | 990 |
//! | `ssh` | 22 |
//!
//! A port equal to the scheme default is left out of the canonical form.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod address;
mod builder;
pub mod charset;
mod config;
mod constants;
mod engine;
mod error;
pub mod escape;
mod ftp;
mod header;
mod header_collection;
mod header_parser;
mod http;
mod params;
pub mod prelude;

pub use address::{Address, AnyAddress};
pub use builder::{Empty, HasScheme, HttpAddressBuilder, Ready};
pub use config::HeaderParserConfig;
pub use constants::{
    CONTENT_LENGTH, FTP_DEFAULT_PORT, FTP_SCHEME, FTPS_DEFAULT_PORT, FTPS_SCHEME,
    HTTP_DEFAULT_PORT, HTTP_SCHEME, HTTPS_DEFAULT_PORT, HTTPS_SCHEME, SCHEME_DELIMITER,
    SSH_DEFAULT_PORT, SSH_SCHEME, USER_AGENT, default_port,
};
pub use error::{
    AddressError, BuilderError, Component, EscapeError, HeaderError, ParseError, ParseErrorKind,
};
pub use ftp::FtpAddress;
pub use header::{
    Header, HeaderParameter, HeaderParameterCollection, HeaderValue, ParameterValue, TypedValue,
    ValueKind,
};
pub use header_collection::HeaderCollection;
pub use header_parser::HeaderParser;
pub use http::{FragmentPolicy, HttpAddress};
pub use params::{ParameterMultimap, ParameterStyle};
