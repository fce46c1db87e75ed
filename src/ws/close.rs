//! WebSocket close codes and their human-readable categories.

use phf::phf_map;

/// Normal closure. The only code that suppresses automatic reconnection.
pub const NORMAL_CLOSURE: u16 = 1000;

/// Reported locally when the stream ends without a close frame.
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// Reason attached to the socket abandoned by the connection-timeout guard.
pub const CONNECTION_TIMEOUT_REASON: &str = "Connection timeout";

/// Reason sent with the close frame on a manual disconnect.
pub const CLIENT_DISCONNECT_REASON: &str = "Client disconnect";

// RFC 6455 section 7.4.1 plus the IANA registered 1012-1015
static CATEGORIES: phf::Map<u16, &'static str> = phf_map! {
    1000_u16 => "normal closure",
    1001_u16 => "going away",
    1002_u16 => "protocol error",
    1003_u16 => "unsupported data",
    1005_u16 => "no status received",
    1006_u16 => "abnormal closure",
    1007_u16 => "invalid frame payload data",
    1008_u16 => "policy violation",
    1009_u16 => "message too big",
    1010_u16 => "mandatory extension",
    1011_u16 => "internal server error",
    1012_u16 => "service restart",
    1013_u16 => "try again later",
    1014_u16 => "bad gateway",
    1015_u16 => "TLS handshake failure",
};

/// Returns the diagnostic category for a close `code`.
#[must_use]
pub fn close_code_category(code: u16) -> &'static str {
    if let Some(category) = CATEGORIES.get(&code) {
        return category;
    }

    match code {
        3000..=3999 => "registered",
        4000..=4999 => "application",
        _ => "unknown",
    }
}

/// Whether a close with `code` should be followed by a reconnect attempt.
#[must_use]
pub const fn is_reconnectable(code: u16) -> bool {
    code != NORMAL_CLOSURE
}
