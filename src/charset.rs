//! Character classes for the address and header grammars.
//!
//! The `is_*_char` predicates name the characters that may appear
//! unescaped in the canonical form of each component. Everything else is
//! percent-encoded on output.

/// RFC 3986 `unreserved`.
#[must_use]
pub const fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')
}

/// RFC 3986 `sub-delims`.
#[must_use]
pub const fn is_sub_delim(c: char) -> bool {
    matches!(
        c,
        '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '='
    )
}

/// Characters of a registered host name.
#[must_use]
pub const fn is_host_char(c: char) -> bool {
    is_unreserved(c)
}

/// Characters inside a bracketed IPv6 literal, brackets excluded.
#[must_use]
pub const fn is_ip_literal_char(c: char) -> bool {
    c.is_ascii_hexdigit() || matches!(c, ':' | '.')
}

/// Characters of a user name or password.
#[must_use]
pub const fn is_login_char(c: char) -> bool {
    is_unreserved(c) || is_sub_delim(c)
}

/// Characters of an HTTP path segment.
#[must_use]
pub const fn is_http_path_char(c: char) -> bool {
    is_unreserved(c) || is_sub_delim(c) || matches!(c, ':' | '@')
}

/// Characters of an FTP path segment; `;` is reserved for parameters.
#[must_use]
pub const fn is_ftp_path_char(c: char) -> bool {
    is_http_path_char(c) && c != ';'
}

/// Characters of a query key or value.
#[must_use]
pub const fn is_query_char(c: char) -> bool {
    is_unreserved(c)
        || matches!(
            c,
            '!' | '$' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | ':' | '@' | '/' | '?'
        )
}

/// Characters of an FTP parameter key or value.
#[must_use]
pub const fn is_ftp_parameter_char(c: char) -> bool {
    is_unreserved(c)
        || matches!(
            c,
            '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ':' | '@' | '/' | '?'
        )
}

/// Characters of a fragment.
#[must_use]
pub const fn is_fragment_char(c: char) -> bool {
    is_http_path_char(c) || matches!(c, '/' | '?')
}

/// Characters accepted literally in path, query and fragment text.
#[must_use]
pub fn is_text_char(c: char) -> bool {
    !c.is_control() && c != ' '
}

/// RFC 7230 `tchar`, the characters of a header name.
#[must_use]
pub const fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '.' | '^' | '_' | '`' | '|' | '~'
        )
}

/// Scheme characters after the leading letter.
#[must_use]
pub const fn is_scheme_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')
}
