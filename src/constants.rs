//! Constants shared by the address grammars and the header parser.

/// Separator between a scheme and the authority of an absolute address.
pub const SCHEME_DELIMITER: &str = "://";

/// The `http` scheme.
pub const HTTP_SCHEME: &str = "http";

/// The `https` scheme.
pub const HTTPS_SCHEME: &str = "https";

/// The `ftp` scheme.
pub const FTP_SCHEME: &str = "ftp";

/// The `ftps` scheme.
pub const FTPS_SCHEME: &str = "ftps";

/// The `ssh` scheme.
pub const SSH_SCHEME: &str = "ssh";

/// Default port of the `http` scheme.
pub const HTTP_DEFAULT_PORT: u16 = 80;

/// Default port of the `https` scheme.
pub const HTTPS_DEFAULT_PORT: u16 = 443;

/// Default port of the `ftp` scheme.
pub const FTP_DEFAULT_PORT: u16 = 21;

/// Default port of the `ftps` scheme.
pub const FTPS_DEFAULT_PORT: u16 = 990;

/// Default port of the `ssh` scheme.
pub const SSH_DEFAULT_PORT: u16 = 22;

/// Name of the typed content-length header.
pub const CONTENT_LENGTH: &str = "Content-Length";

/// Name of the header kept unsplit by default.
pub const USER_AGENT: &str = "User-Agent";

/// Returns the default port of a supported scheme.
///
/// The scheme must already be lower-cased.
#[must_use]
pub fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        HTTP_SCHEME => Some(HTTP_DEFAULT_PORT),
        HTTPS_SCHEME => Some(HTTPS_DEFAULT_PORT),
        FTP_SCHEME => Some(FTP_DEFAULT_PORT),
        FTPS_SCHEME => Some(FTPS_DEFAULT_PORT),
        SSH_SCHEME => Some(SSH_DEFAULT_PORT),
        _ => None,
    }
}
