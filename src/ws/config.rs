#![expect(
    clippy::module_name_repetitions,
    reason = "Configuration types intentionally mirror the module name for clarity"
)]

use std::time::Duration;

use bon::Builder;
use secrecy::{ExposeSecret as _, SecretString};
use tokio_tungstenite::tungstenite::client::IntoClientRequest as _;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::{AUTHORIZATION, SEC_WEBSOCKET_PROTOCOL};
use url::Url;

use crate::Result;
use crate::error::Error;

const DEFAULT_RECONNECT_INTERVAL_DURATION: Duration = Duration::from_millis(5000);
const DEFAULT_MAX_RECONNECT_INTERVAL_DURATION: Duration = Duration::from_millis(30_000);
const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 10;
const DEFAULT_HEARTBEAT_INTERVAL_DURATION: Duration = Duration::from_millis(30_000);
const DEFAULT_CONNECTION_TIMEOUT_DURATION: Duration = Duration::from_millis(15_000);
const DEFAULT_TOKEN_QUERY_PARAM: &str = "token";

/// Configuration for a [`super::ConnectionManager`].
///
/// Supplied once at construction and immutable for the life of the manager.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use realtime_client::ws::config::ConnectionConfig;
///
/// let config = ConnectionConfig::builder()
///     .url("wss://example.com/realtime")
///     .auth_token("issued-token".to_owned())
///     .heartbeat_interval(Duration::from_secs(10))
///     .build();
///
/// assert_eq!(config.max_reconnect_attempts, 10);
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct ConnectionConfig {
    /// Endpoint URI, `ws://` or `wss://`
    #[builder(into)]
    pub url: String,
    /// Subprotocols offered in `Sec-WebSocket-Protocol`
    #[builder(default)]
    pub protocols: Vec<String>,
    /// Already-issued auth token attached to the opening handshake
    #[builder(with = |token: String| SecretString::from(token))]
    pub auth_token: Option<SecretString>,
    /// Where the auth token is attached
    #[builder(default)]
    pub auth_placement: AuthPlacement,
    /// Base delay of the reconnect schedule
    #[builder(default = DEFAULT_RECONNECT_INTERVAL_DURATION)]
    pub reconnect_interval: Duration,
    /// Upper bound of the reconnect schedule
    #[builder(default = DEFAULT_MAX_RECONNECT_INTERVAL_DURATION)]
    pub max_reconnect_interval: Duration,
    /// Consecutive failures after which reconnection stops
    #[builder(default = DEFAULT_MAX_RECONNECT_ATTEMPTS)]
    pub max_reconnect_attempts: u32,
    /// Interval between outbound heartbeat pings
    #[builder(default = DEFAULT_HEARTBEAT_INTERVAL_DURATION)]
    pub heartbeat_interval: Duration,
    /// Consecutive unanswered pings that force a reconnect. `None` only records misses.
    pub max_missed_heartbeats: Option<u32>,
    /// How long the opening handshake may take
    #[builder(default = DEFAULT_CONNECTION_TIMEOUT_DURATION)]
    pub connection_timeout: Duration,
    /// Frames buffered by `send` while not connected. Zero disables buffering.
    #[builder(default)]
    pub offline_queue_capacity: usize,
}

impl ConnectionConfig {
    /// Configuration for `url` with every other option at its default.
    #[must_use]
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self::builder().url(url).build()
    }

    /// Check that the endpoint is a WebSocket URL and the timers are usable.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.url)?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(Error::validation(format!(
                "unsupported scheme `{}`, expected ws or wss",
                url.scheme()
            )));
        }
        if self.heartbeat_interval.is_zero() {
            return Err(Error::validation("heartbeat_interval must be non-zero"));
        }
        if self.connection_timeout.is_zero() {
            return Err(Error::validation("connection_timeout must be non-zero"));
        }
        if self.protocols.iter().any(String::is_empty) {
            return Err(Error::validation("protocols must not contain empty names"));
        }

        Ok(())
    }

    /// Build the opening handshake request, attaching subprotocols and the auth token.
    pub(crate) fn client_request(&self) -> Result<Request> {
        let mut url = Url::parse(&self.url)?;

        if let (Some(token), AuthPlacement::Query { param }) =
            (&self.auth_token, &self.auth_placement)
        {
            url.query_pairs_mut()
                .append_pair(param, token.expose_secret());
        }

        let mut request = url.as_str().into_client_request()?;
        let headers = request.headers_mut();

        if !self.protocols.is_empty() {
            headers.insert(
                SEC_WEBSOCKET_PROTOCOL,
                HeaderValue::from_str(&self.protocols.join(", "))?,
            );
        }

        if let (Some(token), AuthPlacement::BearerHeader) = (&self.auth_token, &self.auth_placement)
        {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(request)
    }
}

/// Where the auth token is attached to the opening handshake.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPlacement {
    /// Appended to the endpoint URL as a query parameter
    Query {
        /// Query parameter name
        param: String,
    },
    /// Sent as `Authorization: Bearer <token>`
    BearerHeader,
}

impl Default for AuthPlacement {
    fn default() -> Self {
        Self::Query {
            param: DEFAULT_TOKEN_QUERY_PARAM.to_owned(),
        }
    }
}
