//! Percent-escape codec.
//!
//! Decoding works on a character buffer so the address scanner can hand
//! over the position of a `%` and resume right after the escape run.
//! Consecutive `%XX` groups are decoded together, which is how multi-byte
//! UTF-8 characters are spelled (`%C3%A9` is `é`).

use std::fmt::Write;

use crate::error::EscapeError;

/// Decodes the run of `%XX` groups starting at `start`.
///
/// `chars[start]` must be `%`. Returns the decoded text and the index of
/// the first character after the run.
///
/// # Errors
///
/// Returns `EscapeError` if a group is truncated, holds a non-hex digit,
/// or the decoded bytes are not UTF-8.
pub fn decode_escape_at(chars: &[char], start: usize) -> Result<(String, usize), EscapeError> {
    let mut bytes = Vec::new();
    let mut index = start;

    while index < chars.len() && chars[index] == '%' {
        if index + 2 >= chars.len() {
            return Err(EscapeError::Truncated);
        }
        let high = hex_value(chars[index + 1])?;
        let low = hex_value(chars[index + 2])?;
        bytes.push((high << 4) | low);
        index += 3;
    }

    let decoded = String::from_utf8(bytes).map_err(|_| EscapeError::InvalidUtf8)?;
    Ok((decoded, index))
}

/// Decodes every escape in `text`, leaving other characters untouched.
///
/// # Errors
///
/// Returns `EscapeError` on the first escape that cannot be decoded.
///
/// # Examples
///
/// ```
/// use http_grammar::escape;
///
/// assert_eq!(escape::decode("caf%C3%A9%20au%20lait").unwrap(), "café au lait");
/// assert!(escape::decode("%4").is_err());
/// ```
pub fn decode(text: &str) -> Result<String, EscapeError> {
    if !text.contains('%') {
        return Ok(text.to_string());
    }

    let chars: Vec<char> = text.chars().collect();
    let mut decoded = String::with_capacity(text.len());
    let mut index = 0;

    while index < chars.len() {
        if chars[index] == '%' {
            let (run, next) = decode_escape_at(&chars, index)?;
            decoded.push_str(&run);
            index = next;
        } else {
            decoded.push(chars[index]);
            index += 1;
        }
    }

    Ok(decoded)
}

/// Percent-encodes every character of `text` that `allowed` rejects.
///
/// Characters outside ASCII are encoded byte by byte from their UTF-8 form,
/// with uppercase hex digits.
///
/// # Examples
///
/// ```
/// use http_grammar::{charset, escape};
///
/// let encoded = escape::encode("a b/é", charset::is_http_path_char);
/// assert_eq!(encoded, "a%20b%2F%C3%A9");
/// ```
#[must_use]
pub fn encode(text: &str, allowed: impl Fn(char) -> bool) -> String {
    let mut encoded = String::with_capacity(text.len());
    let mut buffer = [0u8; 4];

    for c in text.chars() {
        if c.is_ascii() && allowed(c) {
            encoded.push(c);
        } else {
            for byte in c.encode_utf8(&mut buffer).bytes() {
                // Writing to a String cannot fail.
                let _ = write!(encoded, "%{byte:02X}");
            }
        }
    }

    encoded
}

fn hex_value(c: char) -> Result<u8, EscapeError> {
    c.to_digit(16)
        .and_then(|digit| u8::try_from(digit).ok())
        .ok_or(EscapeError::InvalidHexDigit { found: c })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset;

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    #[test]
    fn decode_single_escape() {
        let (decoded, next) = decode_escape_at(&chars("a%41b"), 1).unwrap();
        assert_eq!(decoded, "A");
        assert_eq!(next, 4);
    }

    #[test]
    fn decode_chained_multibyte_escape() {
        let (decoded, next) = decode_escape_at(&chars("%E2%82%AC!"), 0).unwrap();
        assert_eq!(decoded, "€");
        assert_eq!(next, 9);
    }

    #[test]
    fn decode_lowercase_hex() {
        assert_eq!(decode("%c3%a9").unwrap(), "é");
    }

    #[test]
    fn truncated_escape_fails() {
        assert_eq!(decode_escape_at(&chars("%4"), 0), Err(EscapeError::Truncated));
        assert_eq!(decode_escape_at(&chars("%41%"), 0), Err(EscapeError::Truncated));
    }

    #[test]
    fn non_hex_digit_fails() {
        assert_eq!(
            decode("%GG"),
            Err(EscapeError::InvalidHexDigit { found: 'G' })
        );
    }

    #[test]
    fn split_multibyte_sequence_fails() {
        assert_eq!(decode("%C3x"), Err(EscapeError::InvalidUtf8));
    }

    #[test]
    fn decode_without_escapes_is_identity() {
        assert_eq!(decode("plain/text").unwrap(), "plain/text");
    }

    #[test]
    fn encode_keeps_allowed_ascii() {
        assert_eq!(encode("abc-._~", charset::is_unreserved), "abc-._~");
    }

    #[test]
    fn encode_reserved_and_unicode() {
        assert_eq!(encode("a;b", charset::is_ftp_path_char), "a%3Bb");
        assert_eq!(encode("a;b", charset::is_http_path_char), "a;b");
        assert_eq!(encode("ü", charset::is_unreserved), "%C3%BC");
    }

    #[test]
    fn encode_then_decode_is_identity() {
        let text = "x y&z=ß/€?#";
        let encoded = encode(text, charset::is_query_char);
        assert_eq!(decode(&encoded).unwrap(), text);
    }
}
