//! Typestate builder for constructing [`HttpAddress`] instances.
//!
//! This module provides a builder that uses phantom types to enforce
//! at compile-time that a scheme and a host are set before building.

use std::marker::PhantomData;

use crate::address::check_segment;
use crate::engine::{self, Grammar, ScanState};
use crate::error::{AddressError, BuilderError};
use crate::http::{HttpAddress, HttpGrammar};
use crate::params::ParameterMultimap;

/// Marker: No components set yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct Empty;

/// Marker: The scheme has been set.
#[derive(Debug, Clone, Copy, Default)]
pub struct HasScheme;

/// Marker: Scheme and host are set, ready to build.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ready;

/// A typestate builder for absolute [`HttpAddress`] instances.
///
/// The scheme comes first, then the host. Port, segments, query parameters
/// and fragment are optional and can be added at any point. Components are
/// given decoded; the built address escapes them.
///
/// # Type State
///
/// - [`Empty`]: Initial state, no components set
/// - [`HasScheme`]: The scheme has been set
/// - [`Ready`]: Scheme and host set, can call `build()`
///
/// # Examples
///
/// ```
/// use http_grammar::{Address, HttpAddressBuilder};
///
/// let address = HttpAddressBuilder::new()
///     .scheme("https")
///     .host("example.com")
///     .port(8443)
///     .segment("search results")
///     .query_parameter("q", "rust & co")
///     .fragment("top")
///     .build()
///     .unwrap();
///
/// assert_eq!(
///     address.as_str(),
///     "https://example.com:8443/search%20results?q=rust%20%26%20co#top"
/// );
/// ```
///
/// # Compile-Time Safety
///
/// ```compile_fail
/// use http_grammar::HttpAddressBuilder;
///
/// // Error: cannot call host() before scheme()
/// let builder = HttpAddressBuilder::new().host("example.com");
/// ```
///
/// ```compile_fail
/// use http_grammar::HttpAddressBuilder;
///
/// // Error: cannot call build() without a host
/// let address = HttpAddressBuilder::new().scheme("http").build();
/// ```
#[derive(Debug, Clone)]
pub struct HttpAddressBuilder<State = Empty> {
    scheme: String,
    host: String,
    port: Option<u16>,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    fragment: Option<String>,
    _state: PhantomData<State>,
}

impl HttpAddressBuilder<Empty> {
    /// Creates a new builder in the initial state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scheme: String::new(),
            host: String::new(),
            port: None,
            segments: Vec::new(),
            query: Vec::new(),
            fragment: None,
            _state: PhantomData,
        }
    }

    /// Sets the scheme and advances to the [`HasScheme`] state.
    ///
    /// The scheme is checked by [`build`](HttpAddressBuilder::build).
    #[must_use]
    pub fn scheme(self, scheme: &str) -> HttpAddressBuilder<HasScheme> {
        HttpAddressBuilder {
            scheme: scheme.to_string(),
            host: self.host,
            port: self.port,
            segments: self.segments,
            query: self.query,
            fragment: self.fragment,
            _state: PhantomData,
        }
    }
}

impl Default for HttpAddressBuilder<Empty> {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpAddressBuilder<HasScheme> {
    /// Sets the host and advances to the [`Ready`] state.
    ///
    /// The host is checked by [`build`](HttpAddressBuilder::build).
    #[must_use]
    pub fn host(self, host: &str) -> HttpAddressBuilder<Ready> {
        HttpAddressBuilder {
            scheme: self.scheme,
            host: host.to_string(),
            port: self.port,
            segments: self.segments,
            query: self.query,
            fragment: self.fragment,
            _state: PhantomData,
        }
    }
}

impl HttpAddressBuilder<Ready> {
    /// Builds the final [`HttpAddress`].
    ///
    /// # Errors
    ///
    /// Returns `BuilderError` if:
    /// - The scheme is not `http` or `https`
    /// - The host is empty or not a valid host name or IPv6 literal
    /// - A segment is empty, `.` or `..`
    /// - A query parameter has an empty key
    pub fn build(self) -> Result<HttpAddress, BuilderError> {
        let scheme = self.scheme.to_ascii_lowercase();
        if HttpGrammar::default_port(&scheme).is_none() {
            return Err(BuilderError::UnsupportedScheme {
                scheme: self.scheme,
            });
        }

        let host = engine::finish_host(self.host.clone())
            .map_err(|_| BuilderError::InvalidHost { host: self.host })?;

        for segment in &self.segments {
            check_segment(segment)?;
        }

        let mut query = ParameterMultimap::new();
        for (key, value) in self.query {
            if key.is_empty() {
                return Err(AddressError::EmptyArgument { argument: "key" }.into());
            }
            query.add(key, value);
        }

        let state = ScanState {
            scheme,
            host,
            port: self.port,
            rooted: true,
            segments: self.segments,
            parameters: Some(query),
            fragment: self.fragment,
            ..ScanState::default()
        };
        Ok(HttpGrammar::create_instance(state, ""))
    }
}

/// Methods available in all states for optional components.
impl<State> HttpAddressBuilder<State> {
    /// Sets the port. A port equal to the scheme default is omitted from the
    /// canonical form.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Appends one decoded path segment.
    #[must_use]
    pub fn segment(mut self, segment: &str) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    /// Appends several decoded path segments in order.
    #[must_use]
    pub fn segments<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.segments
            .extend(segments.into_iter().map(|segment| segment.as_ref().to_string()));
        self
    }

    /// Adds a decoded query pair. Repeated keys accumulate values.
    #[must_use]
    pub fn query_parameter(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Sets the decoded fragment. If called multiple times, the last value
    /// wins.
    #[must_use]
    pub fn fragment(mut self, fragment: &str) -> Self {
        self.fragment = Some(fragment.to_string());
        self
    }

    /// Sets the fragment if provided, otherwise leaves it unchanged.
    #[must_use]
    pub fn maybe_fragment(self, fragment: Option<&str>) -> Self {
        match fragment {
            Some(f) => self.fragment(f),
            None => self,
        }
    }
}
