//! Seams between the connection manager and the rest of the application.

use serde_json::Value;

use super::classifier::Classified;
use super::connection::ConnectionState;
use super::error::ConnectionError;
use super::event::Event;
use super::heartbeat::HeartbeatState;
use super::message::InboundMessage;

/// Classifier trait for mapping decoded frames to message kinds.
///
/// [`super::DefaultClassifier`] implements the standard rule set; implement this trait to
/// recognize additional payload shapes.
///
/// # Example
///
/// ```ignore
/// pub struct EverythingUnknown;
///
/// impl MessageClassifier for EverythingUnknown {
///     fn classify(&self, value: Value) -> Classified {
///         Classified::Message { kind: MessageKind::Unknown, payload: value }
///     }
/// }
/// ```
pub trait MessageClassifier: Send + Sync + 'static {
    /// Classify one decoded frame. Must not drop payloads: anything unrecognized is
    /// returned as [`super::MessageKind::Unknown`].
    fn classify(&self, value: Value) -> Classified;
}

/// Consumer of connection notifications.
///
/// Attach with [`super::ConnectionManager::attach_sink`]; every method defaults to doing
/// nothing so sinks only implement what they render.
pub trait DispatchSink: Send + 'static {
    fn on_state_changed(&mut self, state: ConnectionState) {
        let _ = state;
    }

    fn on_message(&mut self, message: InboundMessage) {
        let _ = message;
    }

    fn on_error(&mut self, error: ConnectionError) {
        let _ = error;
    }

    fn on_heartbeat(&mut self, heartbeat: HeartbeatState) {
        let _ = heartbeat;
    }

    /// The sink fell behind and `count` events were dropped.
    fn on_lagged(&mut self, count: u64) {
        let _ = count;
    }

    /// Route an [`Event`] to the matching method.
    fn dispatch(&mut self, event: Event) {
        match event {
            Event::StateChanged(state) => self.on_state_changed(state),
            Event::Message(message) => self.on_message(message),
            Event::Error(error) => self.on_error(error),
            Event::Heartbeat(heartbeat) => self.on_heartbeat(heartbeat),
        }
    }
}
