//! Client-side real-time connection management.
//!
//! A [`ConnectionManager`] owns one WebSocket to a real-time endpoint and keeps it alive:
//! it reconnects with capped exponential backoff after abnormal closes, exchanges
//! application-level heartbeats, and classifies every inbound JSON frame before publishing
//! it to subscribers.
//!
//! # Architecture
//!
//! - [`ConnectionManager`]: Connection state machine, reconnect scheduling and heartbeat
//! - [`MessageClassifier`]: Trait for mapping decoded frames to [`MessageKind`]s
//! - [`DispatchSink`]: Trait for consumers that render connection notifications
//! - [`backoff`]: Pure reconnect delay schedule
//!
//! # Example
//!
//! ```no_run
//! use futures::StreamExt as _;
//! use realtime_client::ws::ConnectionManager;
//! use realtime_client::ws::config::ConnectionConfig;
//!
//! # async fn run() -> realtime_client::Result<()> {
//! let config = ConnectionConfig::builder()
//!     .url("wss://example.com/realtime")
//!     .auth_token("secret".to_owned())
//!     .build();
//! let manager = ConnectionManager::new(config)?;
//! manager.connect()?;
//!
//! let mut messages = Box::pin(manager.messages());
//! while let Some(message) = messages.next().await {
//!     let message = message?;
//!     println!("{} {}", message.kind(), message.payload());
//! }
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod classifier;
pub mod close;
pub mod config;
pub mod connection;
pub mod error;
pub mod event;
pub mod heartbeat;
pub mod message;
pub mod traits;

pub use classifier::{Classified, ClassifierConfig, DefaultClassifier, MessageKind};
pub use close::close_code_category;
pub use connection::{ConnectionManager, ConnectionState};
pub use error::ConnectionError;
pub use event::Event;
pub use heartbeat::HeartbeatState;
pub use message::{InboundMessage, OutboundMessage};
pub use traits::*;
