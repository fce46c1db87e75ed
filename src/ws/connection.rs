#![expect(
    clippy::module_name_repetitions,
    reason = "Connection types expose their domain in the name for clarity"
)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_stream::try_stream;
use futures::stream::{SplitSink, SplitStream};
use futures::{Sink, SinkExt as _, Stream, StreamExt as _};
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{Message, Utf8Bytes};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;

use super::backoff::{next_delay, should_give_up};
use super::classifier::{Classified, DefaultClassifier};
use super::close::{
    ABNORMAL_CLOSURE, CLIENT_DISCONNECT_REASON, CONNECTION_TIMEOUT_REASON, NORMAL_CLOSURE,
    is_reconnectable,
};
use super::config::ConnectionConfig;
use super::error::{ConnectionError, StreamError};
use super::event::Event;
use super::heartbeat::{HeartbeatMonitor, HeartbeatState, Tick, pong_frame};
use super::message::{FrameMeta, InboundMessage, OutboundMessage, envelope};
use super::traits::{DispatchSink, MessageClassifier};
use crate::error::Error;
use crate::{Result, now_millis};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Broadcast channel capacity for events.
const BROADCAST_CAPACITY: usize = 1024;

/// Close code reported when the peer sends a close frame without a status.
const NO_STATUS_RECEIVED: u16 = 1005;

const HEARTBEAT_TIMEOUT_REASON: &str = "Heartbeat timeout";

/// Upper bound on sending the close frame; a newer session waits for this.
const CLOSE_FRAME_TIMEOUT: Duration = Duration::from_secs(1);

/// Connection state tracking.
///
/// Exactly one value holds at any instant. Transitions:
///
/// ```text
/// Disconnected --connect--> Connecting --open--> Connected
/// Connected --abnormal close--> Reconnecting --backoff elapsed--> Connecting
/// Connected --disconnect--> Disconnected
/// Reconnecting --give up--> Error (until an explicit connect)
/// ```
#[expect(
    clippy::exhaustive_enums,
    reason = "Consumers render every connection state"
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected
    Disconnected,
    /// Attempting to connect
    Connecting,
    /// Successfully connected
    Connected,
    /// Waiting to retry after an abnormal close
    Reconnecting {
        /// Current reconnection attempt number
        attempt: u32,
    },
    /// The last attempt failed; terminal after retries are exhausted
    Error,
}

impl ConnectionState {
    /// Check if the connection is currently active.
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Connected or on the way there, i.e. `connect` is a no-op.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Connected | Self::Connecting)
    }
}

/// Handle to the task driving one explicit `connect`.
#[derive(Debug)]
struct SessionHandle {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Reconnect context plus everything guarded together with state transitions.
#[derive(Debug, Default)]
struct Control {
    /// Bumped by every `connect`/`disconnect`; tasks holding an older value are stale
    generation: u64,
    manual_disconnect: bool,
    attempt: u32,
    outbound: Option<mpsc::UnboundedSender<Message>>,
    offline_queue: VecDeque<String>,
    heartbeat: HeartbeatState,
    last_error: Option<ConnectionError>,
    session: Option<SessionHandle>,
}

#[derive(Debug)]
struct Shared {
    control: Mutex<Control>,
    /// Watch channel sender for state changes (for use in checking the current state)
    state_tx: watch::Sender<ConnectionState>,
    /// Broadcast sender for events
    events_tx: broadcast::Sender<Event>,
}

impl Shared {
    /// The control block never holds a partially applied transition, so a poisoned lock is
    /// recovered.
    fn lock(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Publish `state`. Callers hold the control lock.
    fn transition(&self, state: ConnectionState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            #[cfg(feature = "tracing")]
            tracing::debug!(from = ?previous, to = ?state, "Connection state changed");

            self.emit(Event::StateChanged(state));
        }
    }

    fn emit(&self, event: Event) {
        // No subscribers is fine
        _ = self.events_tx.send(event);
    }

    /// Record and surface `error`. Callers hold the control lock.
    fn report(&self, control: &mut Control, error: ConnectionError) {
        control.last_error = Some(error.clone());
        self.emit(Event::Error(error));
    }
}

/// Manages the lifecycle of a single WebSocket connection.
///
/// This connection manager handles all connection concerns:
/// - Opening the socket on [`Self::connect`] with a connection-timeout guard
/// - Automatic reconnection with capped exponential backoff after abnormal closes
/// - Application-level heartbeats (`{"type":"ping"}` / `{"type":"pong"}`)
/// - Classifying inbound frames and broadcasting them to any number of subscribers
///
/// At most one socket is live per manager. A manager is meant to be the only one for its
/// endpoint: drop (or [`Self::disconnect`]) the old instance before creating a new one.
/// Dropping a manager cancels its timers and closes the socket with code 1000.
///
/// # Type Parameters
///
/// - `C`: Classifier that implements [`MessageClassifier`]
///
/// # Example
///
/// ```no_run
/// use realtime_client::ws::{ConnectionManager, Event};
/// use realtime_client::ws::config::ConnectionConfig;
///
/// # async fn run() -> realtime_client::Result<()> {
/// let manager = ConnectionManager::new(ConnectionConfig::new("wss://example.com/realtime"))?;
/// let mut events = manager.subscribe();
/// manager.connect()?;
///
/// while let Ok(event) = events.recv().await {
///     if let Event::Message(message) = event {
///         println!("{}: {}", message.kind(), message.payload());
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConnectionManager<C = DefaultClassifier>
where
    C: MessageClassifier,
{
    config: Arc<ConnectionConfig>,
    classifier: Arc<C>,
    shared: Arc<Shared>,
}

impl ConnectionManager<DefaultClassifier> {
    /// Create a manager using the [`DefaultClassifier`]. No socket is opened until
    /// [`Self::connect`].
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        Self::with_classifier(config, DefaultClassifier::default())
    }
}

impl<C> ConnectionManager<C>
where
    C: MessageClassifier,
{
    /// Create a manager with a custom classifier.
    pub fn with_classifier(config: ConnectionConfig, classifier: C) -> Result<Self> {
        config.validate()?;

        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let (events_tx, _) = broadcast::channel(BROADCAST_CAPACITY);

        Ok(Self {
            config: Arc::new(config),
            classifier: Arc::new(classifier),
            shared: Arc::new(Shared {
                control: Mutex::new(Control::default()),
                state_tx,
                events_tx,
            }),
        })
    }

    /// Open the connection.
    ///
    /// A no-op while already connected or connecting. Otherwise clears the previous error,
    /// the manual-disconnect flag and the attempt counter, cancels any pending retry, and
    /// starts a new session in the background. Outcomes are observed through
    /// [`Self::subscribe`] and [`Self::state_receiver`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(&self) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_e| {
            Error::validation("connect must be called from within a tokio runtime")
        })?;

        let mut control = self.shared.lock();
        if self.shared.state().is_active() {
            #[cfg(feature = "tracing")]
            tracing::trace!("Already connected or connecting, ignoring connect");
            return Ok(());
        }

        // A cancelled session may still be closing its socket; the new one waits for it
        let previous = control.session.take().map(|session| {
            session.token.cancel();
            session.handle
        });

        control.generation = control.generation.wrapping_add(1);
        control.manual_disconnect = false;
        control.attempt = 0;
        control.last_error = None;
        control.outbound = None;
        self.shared.transition(ConnectionState::Connecting);

        let token = CancellationToken::new();
        let session = Session {
            generation: control.generation,
            token: token.clone(),
            config: Arc::clone(&self.config),
            classifier: Arc::clone(&self.classifier),
            shared: Arc::clone(&self.shared),
        };
        let handle = runtime.spawn(session.run(previous));
        control.session = Some(SessionHandle { token, handle });

        Ok(())
    }

    /// Close the connection and suppress reconnection.
    ///
    /// Pending timers (heartbeat, backoff, connection timeout) are cancelled before this
    /// returns; the socket is closed with code 1000. Idempotent.
    pub fn disconnect(&self) {
        let mut control = self.shared.lock();
        Self::cancel_session(&mut control);
        self.shared.transition(ConnectionState::Disconnected);
    }

    fn cancel_session(control: &mut Control) {
        control.manual_disconnect = true;
        control.generation = control.generation.wrapping_add(1);
        control.outbound = None;
        control.offline_queue.clear();
        if let Some(session) = &control.session {
            session.token.cancel();
        }
    }

    /// Send a message to the server.
    ///
    /// The serialized value gets `id` and `timestamp` envelope fields (existing ones are
    /// kept). Returns `false` unless connected; with `offline_queue_capacity` set the frame is
    /// queued instead and flushed on the next open.
    pub fn send<R: Serialize>(&self, message: &R) -> bool {
        let value = match serde_json::to_value(message) {
            Ok(value) => value,
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %e, "Unable to serialize outbound message");
                #[cfg(not(feature = "tracing"))]
                let _ = &e;
                return false;
            }
        };
        let frame = envelope(value).to_string();

        let mut control = self.shared.lock();
        if self.shared.state().is_connected() {
            return control
                .outbound
                .as_ref()
                .is_some_and(|tx| tx.send(Message::Text(frame.into())).is_ok());
        }

        if control.offline_queue.len() < self.config.offline_queue_capacity {
            control.offline_queue.push_back(frame);
            return true;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(state = ?self.shared.state(), "Dropping send while not connected");

        false
    }

    /// Send `{type: kind, payload}` with the standard envelope.
    pub fn send_message<S: Into<String>>(&self, kind: S, payload: Value) -> bool {
        self.send(&OutboundMessage::new(kind, payload))
    }

    /// Get the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Consecutive failed attempts since the last successful open.
    #[must_use]
    pub fn reconnect_attempts(&self) -> u32 {
        self.shared.lock().attempt
    }

    /// The most recent error, cleared by [`Self::connect`].
    #[must_use]
    pub fn last_error(&self) -> Option<ConnectionError> {
        self.shared.lock().last_error.clone()
    }

    #[must_use]
    pub fn heartbeat(&self) -> HeartbeatState {
        self.shared.lock().heartbeat
    }

    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Subscribe to connection events.
    ///
    /// Each call returns a new independent receiver. Multiple subscribers can
    /// receive events concurrently without blocking each other.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.events_tx.subscribe()
    }

    /// Subscribe to connection state changes.
    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state_tx.subscribe()
    }

    /// Stream of classified messages only.
    ///
    /// Yields an error if the subscriber lags behind and misses messages.
    pub fn messages(&self) -> impl Stream<Item = Result<InboundMessage>> + use<C> {
        let mut rx = self.subscribe();

        try_stream! {
            loop {
                match rx.recv().await {
                    Ok(Event::Message(message)) => yield message,
                    Ok(_) => {}
                    Err(RecvError::Lagged(n)) => {
                        #[cfg(feature = "tracing")]
                        tracing::warn!("Message stream lagged, missed {n} events");
                        Err(StreamError::Lagged { count: n })?;
                    }
                    Err(RecvError::Closed) => {
                        break;
                    }
                }
            }
        }
    }

    /// Forward every event to `sink` on a background task.
    ///
    /// The task ends when the manager and its session are gone.
    pub fn attach_sink<S: DispatchSink>(&self, mut sink: S) -> JoinHandle<()> {
        let mut rx = self.subscribe();

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => sink.dispatch(event),
                    Err(RecvError::Lagged(n)) => sink.on_lagged(n),
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

impl<C> Drop for ConnectionManager<C>
where
    C: MessageClassifier,
{
    fn drop(&mut self) {
        let mut control = self.shared.lock();
        if control.session.is_some() {
            Self::cancel_session(&mut control);
            self.shared.transition(ConnectionState::Disconnected);
        }
    }
}

/// How a socket went away.
#[derive(Debug)]
enum Outcome {
    /// Cancelled by `disconnect`, a newer `connect`, or drop
    Cancelled,
    Closed(Closure),
}

#[derive(Debug)]
struct Closure {
    code: u16,
    reason: String,
    was_clean: bool,
    /// The failure was already surfaced as an error event
    reported: bool,
}

impl Closure {
    fn abnormal(reason: String, reported: bool) -> Self {
        Self {
            code: ABNORMAL_CLOSURE,
            reason,
            was_clean: false,
            reported,
        }
    }
}

/// The background task behind one explicit `connect`, including its automatic retries.
struct Session<C> {
    generation: u64,
    token: CancellationToken,
    config: Arc<ConnectionConfig>,
    classifier: Arc<C>,
    shared: Arc<Shared>,
}

impl<C> Session<C>
where
    C: MessageClassifier,
{
    /// Main connection loop with automatic reconnection.
    async fn run(self, previous: Option<JoinHandle<()>>) {
        if let Some(previous) = previous {
            // Never have two live sockets
            _ = previous.await;
        }

        loop {
            let outcome = match self.open().await {
                Ok(stream) => self.handle_connection(stream).await,
                Err(outcome) => outcome,
            };

            let Outcome::Closed(closure) = outcome else {
                return;
            };

            let Some(delay) = self.on_close(closure) else {
                return;
            };

            tokio::select! {
                () = self.token.cancelled() => return,
                () = sleep(delay) => {}
            }

            if !self.publish(ConnectionState::Connecting) {
                return;
            }
        }
    }

    /// Lock the control block unless this session has been superseded.
    fn current(&self) -> Option<MutexGuard<'_, Control>> {
        let control = self.shared.lock();
        (control.generation == self.generation).then_some(control)
    }

    fn publish(&self, state: ConnectionState) -> bool {
        let Some(_control) = self.current() else {
            return false;
        };
        self.shared.transition(state);
        true
    }

    fn on_error(&self, error: ConnectionError) {
        #[cfg(feature = "tracing")]
        tracing::warn!(%error, "Connection error");

        let Some(mut control) = self.current() else {
            return;
        };
        self.shared.report(&mut control, error);
        if !matches!(self.shared.state(), ConnectionState::Reconnecting { .. }) {
            self.shared.transition(ConnectionState::Error);
        }
    }

    /// Dial the endpoint under the connection-timeout guard.
    async fn open(&self) -> std::result::Result<WsStream, Outcome> {
        let request = match self.config.client_request() {
            Ok(request) => request,
            Err(e) => {
                self.on_error(ConnectionError::Transport(e.to_string()));
                return Err(Outcome::Closed(Closure::abnormal(e.to_string(), true)));
            }
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(endpoint = %self.config.url, "Connecting");

        let result = tokio::select! {
            () = self.token.cancelled() => return Err(Outcome::Cancelled),
            result = timeout(self.config.connection_timeout, connect_async(request)) => result,
        };

        match result {
            Ok(Ok((stream, _response))) => Ok(stream),
            Ok(Err(e)) => {
                let reason = e.to_string();
                self.on_error(e.into());
                Err(Outcome::Closed(Closure::abnormal(reason, true)))
            }
            Err(_elapsed) => {
                // The pending handshake is dropped here, which abandons the socket
                self.on_error(ConnectionError::ConnectionTimeout {
                    timeout: self.config.connection_timeout,
                    code: NORMAL_CLOSURE,
                    reason: CONNECTION_TIMEOUT_REASON.to_owned(),
                });
                Err(Outcome::Closed(Closure::abnormal(
                    CONNECTION_TIMEOUT_REASON.to_owned(),
                    true,
                )))
            }
        }
    }

    /// Mark the session open; returns the receiver for outbound frames.
    fn on_open(&self) -> Option<mpsc::UnboundedReceiver<Message>> {
        let mut control = self.current()?;

        let (tx, rx) = mpsc::unbounded_channel();
        for frame in control.offline_queue.drain(..) {
            // The receiver is alive in this scope
            _ = tx.send(Message::Text(frame.into()));
        }
        control.outbound = Some(tx);
        control.attempt = 0;
        control.heartbeat = HeartbeatState::default();
        self.shared.transition(ConnectionState::Connected);

        #[cfg(feature = "tracing")]
        tracing::debug!(endpoint = %self.config.url, "Connected");

        Some(rx)
    }

    /// Handle an active WebSocket connection.
    async fn handle_connection(&self, stream: WsStream) -> Outcome {
        let (mut write, mut read) = stream.split();

        let Some(mut outbound_rx) = self.on_open() else {
            close_normally(&mut write).await;
            return Outcome::Cancelled;
        };

        let mut monitor = HeartbeatMonitor::new(self.config.max_missed_heartbeats);
        monitor.start(self.config.heartbeat_interval);

        let outcome = self
            .pump(&mut write, &mut read, &mut outbound_rx, &mut monitor)
            .await;
        monitor.stop();

        if matches!(outcome, Outcome::Cancelled) {
            close_normally(&mut write).await;
        }

        outcome
    }

    async fn pump(
        &self,
        write: &mut SplitSink<WsStream, Message>,
        read: &mut SplitStream<WsStream>,
        outbound_rx: &mut mpsc::UnboundedReceiver<Message>,
        monitor: &mut HeartbeatMonitor,
    ) -> Outcome {
        loop {
            tokio::select! {
                biased;

                () = self.token.cancelled() => return Outcome::Cancelled,

                // Handle incoming messages
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            #[cfg(feature = "tracing")]
                            tracing::trace!(%text, "Received WebSocket text message");

                            if let Some(reply) = self.on_frame(text.as_str(), monitor)
                                && let Err(e) = write.send(Message::Text(reply.into())).await
                            {
                                return self.on_transport_error(e);
                            }
                        }
                        Some(Ok(Message::Binary(bytes))) => {
                            let text = String::from_utf8_lossy(&bytes);
                            if let Some(reply) = self.on_frame(&text, monitor)
                                && let Err(e) = write.send(Message::Text(reply.into())).await
                            {
                                return self.on_transport_error(e);
                            }
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = frame.map_or_else(
                                || (NO_STATUS_RECEIVED, String::new()),
                                |f| (u16::from(f.code), f.reason.to_string()),
                            );
                            return Outcome::Closed(Closure {
                                code,
                                reason,
                                was_clean: true,
                                reported: false,
                            });
                        }
                        Some(Ok(_)) => {
                            // Transport-level PING/PONG frames are answered by tungstenite
                        }
                        Some(Err(e)) => return self.on_transport_error(e),
                        None => return Outcome::Closed(Closure::abnormal(String::new(), false)),
                    }
                }

                // Handle outgoing messages from `send`
                Some(frame) = outbound_rx.recv() => {
                    if let Err(e) = write.send(frame).await {
                        return self.on_transport_error(e);
                    }
                }

                () = monitor.tick() => {
                    match monitor.on_tick(now_millis()) {
                        Tick::Ping(frame) => {
                            if let Err(e) = write.send(Message::Text(frame.into())).await {
                                return self.on_transport_error(e);
                            }
                            self.publish_heartbeat(monitor.state());
                        }
                        Tick::Expired => {
                            self.publish_heartbeat(monitor.state());
                            return Outcome::Closed(Closure::abnormal(
                                HEARTBEAT_TIMEOUT_REASON.to_owned(),
                                false,
                            ));
                        }
                    }
                }
            }
        }
    }

    fn on_transport_error(&self, e: tokio_tungstenite::tungstenite::Error) -> Outcome {
        let reason = e.to_string();
        self.on_error(e.into());
        Outcome::Closed(Closure::abnormal(reason, true))
    }

    /// Parse, classify and route one frame. Returns a reply to send, if any.
    fn on_frame(&self, raw: &str, monitor: &mut HeartbeatMonitor) -> Option<String> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(%raw, error = %e, "Failed to parse WebSocket message");

                // Only this frame is discarded; the connection stays open
                let mut control = self.current()?;
                self.shared.report(
                    &mut control,
                    ConnectionError::Parse {
                        message: e.to_string(),
                        raw: raw.to_owned(),
                    },
                );
                return None;
            }
        };

        let meta = FrameMeta::of(&value);
        match self.classifier.classify(value) {
            Classified::HeartbeatPing => Some(pong_frame(now_millis())),
            Classified::HeartbeatAck { .. } => {
                monitor.on_ack(now_millis());
                self.publish_heartbeat(monitor.state());
                None
            }
            Classified::Message { kind, payload } => {
                let message = InboundMessage::new(kind, payload, meta, raw.to_owned());

                #[cfg(feature = "tracing")]
                tracing::trace!(?message, "Classified WebSocket message");

                if self.current().is_some() {
                    self.shared.emit(Event::Message(message));
                }
                None
            }
        }
    }

    fn publish_heartbeat(&self, heartbeat: HeartbeatState) {
        let Some(mut control) = self.current() else {
            return;
        };
        control.heartbeat = heartbeat;
        self.shared.emit(Event::Heartbeat(heartbeat));
    }

    /// Decide what follows a closed socket. Returns the delay before the next attempt, or
    /// `None` when the session ends.
    fn on_close(&self, closure: Closure) -> Option<Duration> {
        let mut control = self.current()?;
        control.outbound = None;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            code = closure.code,
            reason = %closure.reason,
            was_clean = closure.was_clean,
            "Connection closed"
        );

        if control.manual_disconnect || !is_reconnectable(closure.code) {
            self.shared.transition(ConnectionState::Disconnected);
            return None;
        }

        if !closure.reported {
            self.shared.report(
                &mut control,
                ConnectionError::AbnormalClose {
                    code: closure.code,
                    reason: closure.reason,
                    was_clean: closure.was_clean,
                },
            );
        }

        control.attempt = control.attempt.saturating_add(1);
        let attempt = control.attempt;

        if should_give_up(attempt, self.config.max_reconnect_attempts) {
            #[cfg(feature = "tracing")]
            tracing::error!(attempt, "Giving up reconnecting");

            self.shared
                .report(&mut control, ConnectionError::ExhaustedRetries { attempts: attempt });
            self.shared.transition(ConnectionState::Error);
            return None;
        }

        let delay = next_delay(
            attempt,
            self.config.reconnect_interval,
            self.config.max_reconnect_interval,
        );

        #[cfg(feature = "tracing")]
        tracing::debug!(attempt, ?delay, "Scheduling reconnect");

        self.shared
            .transition(ConnectionState::Reconnecting { attempt });

        Some(delay)
    }
}

async fn close_normally<S>(write: &mut S)
where
    S: Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let frame = CloseFrame {
        code: CloseCode::Normal,
        reason: Utf8Bytes::from_static(CLIENT_DISCONNECT_REASON),
    };

    match timeout(CLOSE_FRAME_TIMEOUT, write.send(Message::Close(Some(frame)))).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(error = %e, "Unable to send close frame");
            #[cfg(not(feature = "tracing"))]
            let _ = &e;
        }
        Err(_elapsed) => {
            #[cfg(feature = "tracing")]
            tracing::debug!("Timed out sending close frame, dropping the socket");
        }
    }
}
