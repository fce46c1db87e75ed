#![expect(
    clippy::module_name_repetitions,
    reason = "Error types include the module name to indicate their scope"
)]

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use super::close::close_code_category;

/// Failures observed by a [`super::ConnectionManager`].
///
/// Every variant is surfaced to subscribers as [`super::Event::Error`] and kept as the
/// manager's `last_error`. Only [`ConnectionError::ExhaustedRetries`] is terminal; the
/// other connection-level variants feed the reconnect path and
/// [`ConnectionError::Parse`] discards a single frame.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// The opening handshake did not complete within the configured guard window
    ConnectionTimeout {
        /// Guard window that elapsed
        timeout: Duration,
        /// Close code recorded for the abandoned socket
        code: u16,
        /// Close reason recorded for the abandoned socket
        reason: String,
    },
    /// The socket closed with a code other than 1000 while not manually disconnecting
    AbnormalClose {
        /// Close code reported by the peer, 1006 when the stream ended without a close frame
        code: u16,
        /// Close reason reported by the peer
        reason: String,
        /// Whether a close frame was exchanged
        was_clean: bool,
    },
    /// Underlying socket error
    Transport(String),
    /// An inbound frame was not valid JSON
    Parse {
        /// Parser diagnostic
        message: String,
        /// The frame that failed to parse
        raw: String,
    },
    /// Attempt count reached the configured maximum
    ExhaustedRetries {
        /// Number of consecutive failed attempts
        attempts: u32,
    },
}

impl ConnectionError {
    /// Whether this error ends automatic reconnection.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::ExhaustedRetries { .. })
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionTimeout { timeout, .. } => {
                write!(f, "Connection timeout: no open within {timeout:?}")
            }
            Self::AbnormalClose { code, reason, .. } => write!(
                f,
                "Connection closed abnormally ({code} {}): {reason}",
                close_code_category(*code)
            ),
            Self::Transport(message) => write!(f, "WebSocket transport error: {message}"),
            Self::Parse { message, .. } => write!(f, "Failed to parse WebSocket message: {message}"),
            Self::ExhaustedRetries { attempts } => {
                write!(f, "Gave up reconnecting after {attempts} attempts")
            }
        }
    }
}

impl StdError for ConnectionError {}

impl From<ConnectionError> for crate::error::Error {
    fn from(e: ConnectionError) -> Self {
        crate::error::Error::with_source(crate::error::Kind::WebSocket, e)
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for crate::error::Error {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        crate::error::Error::with_source(crate::error::Kind::WebSocket, ConnectionError::from(e))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ConnectionError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Errors produced by the message stream returned from
/// [`super::ConnectionManager::messages`].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamError {
    /// The subscriber fell behind and missed messages
    Lagged {
        /// Number of messages that were missed
        count: u64,
    },
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lagged { count } => write!(f, "Subscription lagged, missed {count} messages"),
        }
    }
}

impl StdError for StreamError {}

impl From<StreamError> for crate::error::Error {
    fn from(e: StreamError) -> Self {
        crate::error::Error::with_source(crate::error::Kind::WebSocket, e)
    }
}
