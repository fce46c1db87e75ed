#![expect(
    clippy::module_name_repetitions,
    reason = "Inbound and outbound message types are distinguished by direction, not module"
)]

use bon::Builder;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::classifier::{MessageKind, timestamp_of};
use crate::{Timestamp, now_millis};

const ID_FIELD: &str = "id";
const TIMESTAMP_FIELD: &str = "timestamp";
const PAYLOAD_FIELD: &str = "payload";

/// A classified inbound message.
///
/// Produced once per forwarded frame and never mutated afterwards; fields are read through
/// accessors.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    id: String,
    #[serde(rename = "type")]
    kind: MessageKind,
    payload: Value,
    timestamp: Timestamp,
    raw_payload: String,
}

impl InboundMessage {
    /// Wrap a classified payload. `id` and `timestamp` come from the decoded frame when
    /// present, otherwise a fresh UUID and the current time are used.
    pub(crate) fn new(
        kind: MessageKind,
        payload: Value,
        meta: FrameMeta,
        raw_payload: String,
    ) -> Self {
        Self {
            id: meta.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            kind,
            payload,
            timestamp: meta.timestamp.unwrap_or_else(now_millis),
            raw_payload,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> &MessageKind {
        &self.kind
    }

    /// Normalized body produced by the classifier.
    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Epoch milliseconds.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// The frame text exactly as received.
    #[must_use]
    pub fn raw_payload(&self) -> &str {
        &self.raw_payload
    }
}

/// Envelope fields read from a decoded frame before it is handed to the classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FrameMeta {
    id: Option<String>,
    timestamp: Option<Timestamp>,
}

impl FrameMeta {
    pub(crate) fn of(frame: &Value) -> Self {
        let Some(object) = frame.as_object() else {
            return Self::default();
        };

        let id = object.get(ID_FIELD).and_then(|id| match id {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        Self {
            id,
            timestamp: timestamp_of(object),
        }
    }
}

/// Typed outbound message, serialized as `{type, payload}` before the envelope is attached.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Builder)]
pub struct OutboundMessage {
    /// Message type
    #[serde(rename = "type")]
    #[builder(into)]
    pub kind: String,
    /// Message body
    #[builder(default)]
    pub payload: Value,
}

impl OutboundMessage {
    #[must_use]
    pub fn new<S: Into<String>>(kind: S, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }
}

/// Attach `{id, timestamp}` to an outbound value.
///
/// Objects keep any `id`/`timestamp` they already carry; other values are wrapped under
/// `payload`.
pub(crate) fn envelope(value: Value) -> Value {
    let mut object = match value {
        Value::Object(object) => object,
        other => {
            let mut object = Map::new();
            object.insert(PAYLOAD_FIELD.to_owned(), other);
            object
        }
    };

    object
        .entry(ID_FIELD)
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
    object
        .entry(TIMESTAMP_FIELD)
        .or_insert_with(|| Value::from(now_millis()));

    Value::Object(object)
}
