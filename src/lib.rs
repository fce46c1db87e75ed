#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod error;
pub mod ws;

use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Timestamp in milliseconds since [`std::time::UNIX_EPOCH`]
pub type Timestamp = i64;

pub(crate) fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}
