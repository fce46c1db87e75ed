//! Application-level heartbeat bookkeeping.
//!
//! The monitor is owned by the session task of a [`super::ConnectionManager`]; it is started
//! on open and dropped (stopping its timer) on every exit from the connected state.

#![expect(
    clippy::module_name_repetitions,
    reason = "Heartbeat types are re-exported and read better with their domain in the name"
)]

use std::future::pending;
use std::time::Duration;

use serde_json::json;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

use crate::Timestamp;

/// Liveness bookkeeping, published to subscribers on every change.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeartbeatState {
    /// When the last ping was sent, epoch milliseconds
    pub last_sent_at: Option<Timestamp>,
    /// When the last ack was received, epoch milliseconds
    pub last_ack_at: Option<Timestamp>,
    /// Consecutive pings sent without an ack in between
    pub missed: u32,
}

/// Outcome of a heartbeat tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Tick {
    /// Send this ping frame
    Ping(String),
    /// The configured number of consecutive pings went unanswered
    Expired,
}

#[derive(Debug)]
pub(crate) struct HeartbeatMonitor {
    timer: Option<Interval>,
    state: HeartbeatState,
    awaiting_ack: bool,
    max_missed: Option<u32>,
}

impl HeartbeatMonitor {
    pub(crate) fn new(max_missed: Option<u32>) -> Self {
        Self {
            timer: None,
            state: HeartbeatState::default(),
            awaiting_ack: false,
            max_missed,
        }
    }

    /// Start ticking every `period`, first tick one period from now.
    pub(crate) fn start(&mut self, period: Duration) {
        let mut timer = interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.timer = Some(timer);
        self.awaiting_ack = false;
        self.state.missed = 0;
    }

    pub(crate) fn stop(&mut self) {
        self.timer = None;
        self.awaiting_ack = false;
    }

    /// Resolves on the next tick; never resolves while stopped.
    pub(crate) async fn tick(&mut self) {
        match self.timer.as_mut() {
            Some(timer) => {
                timer.tick().await;
            }
            None => pending::<()>().await,
        }
    }

    pub(crate) fn on_tick(&mut self, now: Timestamp) -> Tick {
        if self.awaiting_ack {
            self.state.missed = self.state.missed.saturating_add(1);

            #[cfg(feature = "tracing")]
            tracing::warn!(missed = self.state.missed, "Heartbeat ack not received");

            if self.max_missed.is_some_and(|max| self.state.missed >= max) {
                return Tick::Expired;
            }
        }

        self.awaiting_ack = true;
        self.state.last_sent_at = Some(now);

        Tick::Ping(ping_frame(now))
    }

    pub(crate) fn on_ack(&mut self, now: Timestamp) {
        self.awaiting_ack = false;
        self.state.missed = 0;
        self.state.last_ack_at = Some(now);
    }

    pub(crate) const fn state(&self) -> HeartbeatState {
        self.state
    }
}

pub(crate) fn ping_frame(now: Timestamp) -> String {
    json!({ "type": "ping", "timestamp": now }).to_string()
}

pub(crate) fn pong_frame(now: Timestamp) -> String {
    json!({ "type": "pong", "timestamp": now }).to_string()
}
