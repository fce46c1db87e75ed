use super::connection::ConnectionState;
use super::error::ConnectionError;
use super::heartbeat::HeartbeatState;
use super::message::InboundMessage;

/// Notification published by a [`super::ConnectionManager`].
///
/// Any number of subscribers observe the same sequence through
/// [`super::ConnectionManager::subscribe`].
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum Event {
    /// The connection state changed
    StateChanged(ConnectionState),
    /// A classified application message arrived
    Message(InboundMessage),
    /// A failure was observed, terminal or recovered
    Error(ConnectionError),
    /// Heartbeat bookkeeping changed
    Heartbeat(HeartbeatState),
}
