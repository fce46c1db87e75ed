//! Connects to a real-time endpoint and logs everything the connection manager publishes.
//!
//! Run with tracing enabled:
//! ```sh
//! RUST_LOG=info REALTIME_TOKEN=... \
//!     cargo run --example realtime --features tracing -- wss://example.com/realtime
//! ```

use std::env;

use realtime_client::ws::config::ConnectionConfig;
use realtime_client::ws::{ConnectionManager, Event};
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let url = env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://127.0.0.1:8080/realtime".to_owned());
    let config = ConnectionConfig::builder()
        .url(url)
        .maybe_auth_token(env::var("REALTIME_TOKEN").ok())
        .build();

    let manager = ConnectionManager::new(config)?;
    let mut events = manager.subscribe();
    manager.connect()?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, disconnecting");
                manager.disconnect();
                break;
            }
            event = events.recv() => match event {
                Ok(Event::StateChanged(state)) => {
                    info!(?state, "State changed");
                    if state.is_connected() {
                        manager.send_message("hello", json!({ "client": "realtime-demo" }));
                    }
                }
                Ok(Event::Message(message)) => {
                    info!(kind = %message.kind(), id = message.id(), payload = %message.payload());
                }
                Ok(Event::Error(e)) => warn!(error = %e, terminal = e.is_terminal()),
                Ok(Event::Heartbeat(heartbeat)) => info!(?heartbeat),
                Ok(_) => {}
                Err(RecvError::Lagged(n)) => warn!("Lagged, missed {n} events"),
                Err(RecvError::Closed) => {
                    error!("Event channel closed");
                    break;
                }
            }
        }
    }

    Ok(())
}
