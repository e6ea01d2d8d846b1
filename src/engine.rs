//! Scanning state machine shared by the address grammars.
//!
//! A parse builds a fresh [`ScanState`] on the stack, walks the input once
//! and hands the state by value to the grammar's `create_instance`. Nothing
//! survives between calls.

use tracing::{debug, trace};

use crate::charset::{
    is_host_char, is_ip_literal_char, is_login_char, is_scheme_char, is_text_char,
};
use crate::constants::SCHEME_DELIMITER;
use crate::error::{Component, ParseError, ParseErrorKind};
use crate::escape;
use crate::params::ParameterMultimap;

/// Scratch fields filled while scanning one address.
#[derive(Debug, Default)]
pub(crate) struct ScanState {
    pub(crate) scheme: String,
    pub(crate) user_name: String,
    pub(crate) password: String,
    pub(crate) host: String,
    pub(crate) port: Option<u16>,
    pub(crate) rooted: bool,
    pub(crate) segments: Vec<String>,
    pub(crate) parameters: Option<ParameterMultimap>,
    pub(crate) fragment: Option<String>,
}

/// A concrete address grammar driven by [`parse`].
pub(crate) trait Grammar {
    /// The address type the grammar produces.
    type Output;

    /// Human-readable grammar name for diagnostics.
    const NAME: &'static str;

    /// Whether `user[:password]@` may precede the host.
    const SUPPORTS_LOGIN: bool;

    /// Whether text without `://` is accepted as a relative address.
    const SUPPORTS_RELATIVE: bool;

    /// Returns the default port of a scheme, or `None` if the grammar does
    /// not handle it.
    fn default_port(scheme: &str) -> Option<u16>;

    /// Returns true if `c` ends the authority and starts the path.
    fn ends_authority(c: char) -> bool;

    /// Scans the path and whatever follows it, starting at `start`.
    fn parse_path(
        state: &mut ScanState,
        chars: &[char],
        start: usize,
    ) -> Result<(), ParseErrorKind>;

    /// Builds the immutable address from the finished scan.
    fn create_instance(state: ScanState, raw: &str) -> Self::Output;
}

/// What the authority scanner expects the buffered text to become.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// Either a user name (if `@` follows) or a host
    LoginOrHost,
    /// Either a password (if `@` follows) or a port
    PasswordOrPort,
    Host,
    Port,
}

/// Parses `raw` with grammar `G`.
///
/// `delimiter` is the byte index of `://`, or `None` for a relative
/// address.
pub(crate) fn parse<G: Grammar>(raw: &str, delimiter: Option<usize>) -> Result<G::Output, ParseError> {
    trace!(grammar = G::NAME, input = raw, "parsing address");
    match scan::<G>(raw, delimiter) {
        Ok(state) => Ok(G::create_instance(state, raw)),
        Err(kind) => {
            debug!(grammar = G::NAME, input = raw, error = %kind, "rejected address");
            Err(ParseError::new(raw, kind))
        }
    }
}

fn scan<G: Grammar>(raw: &str, delimiter: Option<usize>) -> Result<ScanState, ParseErrorKind> {
    if raw.is_empty() {
        return Err(ParseErrorKind::Empty);
    }

    let chars: Vec<char> = raw.chars().collect();
    let mut state = ScanState::default();

    let Some(delimiter) = delimiter else {
        if !G::SUPPORTS_RELATIVE {
            return Err(ParseErrorKind::MissingScheme);
        }
        G::parse_path(&mut state, &chars, 0)?;
        return Ok(state);
    };

    let scheme = raw.get(..delimiter).ok_or(ParseErrorKind::MissingScheme)?;
    if !raw
        .get(delimiter..)
        .is_some_and(|rest| rest.starts_with(SCHEME_DELIMITER))
    {
        return Err(ParseErrorKind::MissingScheme);
    }
    state.scheme = scan_scheme(scheme)?;
    if G::default_port(&state.scheme).is_none() {
        return Err(ParseErrorKind::UnsupportedScheme {
            scheme: state.scheme,
        });
    }

    let start = raw[..delimiter + SCHEME_DELIMITER.len()].chars().count();
    let path_start = scan_authority::<G>(&mut state, &chars, start)?;
    // Absolute paths always start at the root, even when only a query follows.
    state.rooted = true;
    if let Some(index) = path_start {
        G::parse_path(&mut state, &chars, index)?;
    }
    Ok(state)
}

fn scan_scheme(scheme: &str) -> Result<String, ParseErrorKind> {
    let mut chars = scheme.chars().enumerate();
    match chars.next() {
        None => return Err(ParseErrorKind::MissingScheme),
        Some((_, c)) if c.is_ascii_alphabetic() => {}
        Some((position, c)) => {
            return Err(ParseErrorKind::UnexpectedChar {
                found: c,
                position,
                component: Component::Scheme,
            });
        }
    }
    if let Some((position, c)) = chars.find(|&(_, c)| !is_scheme_char(c)) {
        return Err(ParseErrorKind::UnexpectedChar {
            found: c,
            position,
            component: Component::Scheme,
        });
    }
    Ok(scheme.to_ascii_lowercase())
}

/// Scans `user:password@host:port` and returns the index where the path
/// starts, or `None` if the input ends inside the authority.
fn scan_authority<G: Grammar>(
    state: &mut ScanState,
    chars: &[char],
    start: usize,
) -> Result<Option<usize>, ParseErrorKind> {
    let end = chars[start..]
        .iter()
        .position(|&c| G::ends_authority(c))
        .map_or(chars.len(), |offset| start + offset);

    if !G::SUPPORTS_LOGIN && chars[start..end].contains(&'@') {
        return Err(ParseErrorKind::LoginNotSupported {
            scheme: state.scheme.clone(),
        });
    }

    let mut expect = if G::SUPPORTS_LOGIN {
        Expect::LoginOrHost
    } else {
        Expect::Host
    };
    let mut buffer = String::new();
    let mut pending = String::new();
    let mut in_brackets = false;
    // First escape in the buffer, which must not end up as a port.
    let mut escaped_at = None;
    let mut index = start;

    while index < end {
        let c = chars[index];
        match c {
            '[' if buffer.is_empty() && matches!(expect, Expect::LoginOrHost | Expect::Host) => {
                in_brackets = true;
                buffer.push(c);
            }
            ']' if in_brackets => {
                in_brackets = false;
                buffer.push(c);
            }
            ':' if in_brackets => buffer.push(c),
            ':' => match expect {
                Expect::LoginOrHost => {
                    pending = std::mem::take(&mut buffer);
                    escaped_at = None;
                    expect = Expect::PasswordOrPort;
                }
                Expect::Host => {
                    state.host = finish_host(std::mem::take(&mut buffer))?;
                    expect = Expect::Port;
                }
                Expect::PasswordOrPort | Expect::Port => {
                    return Err(unexpected(c, index, expect));
                }
            },
            '@' => {
                match expect {
                    Expect::LoginOrHost => {
                        state.user_name = std::mem::take(&mut buffer);
                    }
                    Expect::PasswordOrPort => {
                        state.user_name = std::mem::take(&mut pending);
                        state.password = std::mem::take(&mut buffer);
                    }
                    Expect::Host | Expect::Port => return Err(unexpected(c, index, expect)),
                }
                escaped_at = None;
                expect = Expect::Host;
            }
            '%' if expect == Expect::Port => return Err(unexpected(c, index, expect)),
            '%' => {
                let (decoded, next) = escape::decode_escape_at(chars, index).map_err(|reason| {
                    ParseErrorKind::InvalidEscape {
                        position: index,
                        reason,
                    }
                })?;
                buffer.push_str(&decoded);
                escaped_at.get_or_insert(index);
                index = next;
                continue;
            }
            _ => {
                let legal = match expect {
                    Expect::LoginOrHost | Expect::PasswordOrPort => is_login_char(c),
                    Expect::Host if in_brackets => is_ip_literal_char(c),
                    Expect::Host => is_host_char(c),
                    Expect::Port => c.is_ascii_digit(),
                };
                if !legal {
                    return Err(unexpected(c, index, expect));
                }
                buffer.push(c);
            }
        }
        index += 1;
    }

    match expect {
        Expect::LoginOrHost | Expect::Host => state.host = finish_host(buffer)?,
        Expect::PasswordOrPort => {
            if let Some(position) = escaped_at {
                return Err(unexpected('%', position, Expect::Port));
            }
            state.host = finish_host(pending)?;
            state.port = finish_port(&buffer)?;
        }
        Expect::Port => state.port = finish_port(&buffer)?,
    }

    Ok((end < chars.len()).then_some(end))
}

fn unexpected(found: char, position: usize, expect: Expect) -> ParseErrorKind {
    let component = match expect {
        Expect::LoginOrHost => Component::UserName,
        Expect::PasswordOrPort => Component::Password,
        Expect::Host => Component::Host,
        Expect::Port => Component::Port,
    };
    ParseErrorKind::UnexpectedChar {
        found,
        position,
        component,
    }
}

pub(crate) fn finish_host(host: String) -> Result<String, ParseErrorKind> {
    if host.is_empty() {
        return Err(ParseErrorKind::MissingHost);
    }
    let valid = match host.strip_prefix('[') {
        Some(rest) => rest
            .strip_suffix(']')
            .is_some_and(|inner| !inner.is_empty() && inner.chars().all(is_ip_literal_char)),
        None => host.chars().all(is_host_char),
    };
    if !valid {
        return Err(ParseErrorKind::InvalidHost { host });
    }
    Ok(host.to_ascii_lowercase())
}

fn finish_port(text: &str) -> Result<Option<u16>, ParseErrorKind> {
    if text.is_empty() {
        return Ok(None);
    }
    if !text.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseErrorKind::InvalidPort {
            value: text.to_string(),
        });
    }
    text.parse::<u16>()
        .map(Some)
        .map_err(|_| ParseErrorKind::InvalidPort {
            value: text.to_string(),
        })
}

/// Scans `/`-separated segments from `start` until `is_terminator` matches
/// or the input ends, normalizing dot segments as it goes.
///
/// Returns the index of the terminator (or the input length).
pub(crate) fn scan_segments(
    state: &mut ScanState,
    chars: &[char],
    start: usize,
    is_terminator: impl Fn(char) -> bool,
) -> Result<usize, ParseErrorKind> {
    let mut index = start;
    if chars.get(index) == Some(&'/') {
        state.rooted = true;
        index += 1;
    }

    let mut segment = String::new();
    while index < chars.len() && !is_terminator(chars[index]) {
        let c = chars[index];
        match c {
            '/' => {
                push_segment(&mut state.segments, std::mem::take(&mut segment));
                index += 1;
            }
            '%' => {
                let (decoded, next) = escape::decode_escape_at(chars, index).map_err(|reason| {
                    ParseErrorKind::InvalidEscape {
                        position: index,
                        reason,
                    }
                })?;
                segment.push_str(&decoded);
                index = next;
            }
            c if !is_text_char(c) => {
                return Err(ParseErrorKind::UnexpectedChar {
                    found: c,
                    position: index,
                    component: Component::Path,
                });
            }
            c => {
                segment.push(c);
                index += 1;
            }
        }
    }

    if !(segment.is_empty() && state.segments.is_empty()) {
        push_segment(&mut state.segments, segment);
    }
    // A lone empty segment prints as the bare root.
    if state.segments.len() == 1 && state.segments[0].is_empty() {
        state.segments.clear();
    }
    Ok(index)
}

/// Appends a segment, dropping `.` and letting `..` remove its predecessor.
fn push_segment(segments: &mut Vec<String>, segment: String) {
    match segment.as_str() {
        "." => {}
        ".." => {
            segments.pop();
        }
        _ => segments.push(segment),
    }
}

/// Scans escape-aware free text (a fragment) from `start` to the end.
pub(crate) fn scan_text(
    chars: &[char],
    start: usize,
    component: Component,
) -> Result<String, ParseErrorKind> {
    let mut text = String::new();
    let mut index = start;
    while index < chars.len() {
        let c = chars[index];
        if c == '%' {
            let (decoded, next) = escape::decode_escape_at(chars, index).map_err(|reason| {
                ParseErrorKind::InvalidEscape {
                    position: index,
                    reason,
                }
            })?;
            text.push_str(&decoded);
            index = next;
            continue;
        }
        if !is_text_char(c) {
            return Err(ParseErrorKind::UnexpectedChar {
                found: c,
                position: index,
                component,
            });
        }
        text.push(c);
        index += 1;
    }
    Ok(text)
}
