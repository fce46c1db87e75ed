//! Classification of inbound payloads into a stable set of message kinds.
//!
//! The backend emits heterogeneous, partially self-describing JSON. Classification happens
//! once, here, so consumers match on [`MessageKind`] instead of re-testing payload shapes.
//!
//! Rules are applied in order and the first match wins:
//!
//! 1. A string `type` field is used verbatim (`"ping"` and `"pong"` are the heartbeat frames)
//! 2. A `ping` marker field is a heartbeat ping
//! 3. A `pong` marker field is a heartbeat ack
//! 4. An array under a known domain collection name (e.g. `Items`) is `<domain>_update`
//! 5. A numeric result/status field is `server_response`
//! 6. Anything else is `unknown`, forwarded unchanged

#![expect(
    clippy::module_name_repetitions,
    reason = "Classifier types name the classification step they configure or perform"
)]

use std::borrow::Cow;
use std::fmt;

use bon::Builder;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::traits::MessageClassifier;
use crate::Timestamp;

const TYPE_FIELD: &str = "type";
const PAYLOAD_FIELD: &str = "payload";
const TIMESTAMP_FIELD: &str = "timestamp";
const PING_MARKER: &str = "ping";
const PONG_MARKER: &str = "pong";

const DEFAULT_DOMAIN_COLLECTIONS: [&str; 4] = ["Items", "Messages", "Notifications", "Users"];
const DEFAULT_STATUS_FIELDS: [&str; 8] = [
    "ResultCode",
    "resultCode",
    "result_code",
    "StatusCode",
    "statusCode",
    "status_code",
    "Status",
    "status",
];

/// Semantic type of a forwarded message.
#[expect(
    clippy::exhaustive_enums,
    reason = "Consumers are expected to match every message kind"
)]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Explicit `type` field, kept verbatim
    Typed(String),
    /// Collection update keyed by a known domain entity; `domain` is lowercase
    DomainUpdate {
        /// Lowercased collection name, e.g. `items`
        domain: String,
    },
    /// Numeric result/status payload with no recognized collection
    ServerResponse,
    /// No rule matched
    Unknown,
}

impl MessageKind {
    /// The wire tag consumers see, e.g. `items_update` or `server_response`.
    #[must_use]
    pub fn tag(&self) -> Cow<'_, str> {
        match self {
            Self::Typed(kind) => Cow::Borrowed(kind),
            Self::DomainUpdate { domain } => Cow::Owned(format!("{domain}_update")),
            Self::ServerResponse => Cow::Borrowed("server_response"),
            Self::Unknown => Cow::Borrowed("unknown"),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

impl Serialize for MessageKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.tag())
    }
}

/// Result of classifying one decoded frame.
#[expect(
    clippy::exhaustive_enums,
    reason = "The connection manager handles every classification outcome"
)]
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// Peer-initiated heartbeat; answered with a pong and not forwarded
    HeartbeatPing,
    /// Answer to one of our pings; updates heartbeat state and is not forwarded
    HeartbeatAck {
        /// Timestamp carried by the ack, if any
        timestamp: Option<Timestamp>,
    },
    /// Application message forwarded to subscribers
    Message {
        /// Semantic type
        kind: MessageKind,
        /// Normalized body
        payload: Value,
    },
}

impl Classified {
    /// Whether this result is consumed by the heartbeat path.
    #[must_use]
    pub const fn is_heartbeat(&self) -> bool {
        matches!(self, Self::HeartbeatPing | Self::HeartbeatAck { .. })
    }
}

/// Field names the [`DefaultClassifier`] recognizes.
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct ClassifierConfig {
    /// Domain entity names whose array value marks a collection update, checked in order
    #[builder(default = DEFAULT_DOMAIN_COLLECTIONS.map(str::to_owned).to_vec())]
    pub domain_collections: Vec<String>,
    /// Numeric fields that mark a server response
    #[builder(default = DEFAULT_STATUS_FIELDS.map(str::to_owned).to_vec())]
    pub status_fields: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Rule-based classifier used by default.
#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct DefaultClassifier {
    config: ClassifierConfig,
}

impl DefaultClassifier {
    #[must_use]
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    fn domain_update(&self, object: &Map<String, Value>) -> Option<MessageKind> {
        self.config
            .domain_collections
            .iter()
            .find(|name| object.get(name.as_str()).is_some_and(Value::is_array))
            .map(|name| MessageKind::DomainUpdate {
                domain: name.to_lowercase(),
            })
    }

    fn has_status(&self, object: &Map<String, Value>) -> bool {
        self.config
            .status_fields
            .iter()
            .any(|name| object.get(name.as_str()).is_some_and(Value::is_number))
    }
}

impl MessageClassifier for DefaultClassifier {
    fn classify(&self, value: Value) -> Classified {
        let Value::Object(mut object) = value else {
            return Classified::Message {
                kind: MessageKind::Unknown,
                payload: value,
            };
        };

        if let Some(Value::String(kind)) = object.get(TYPE_FIELD) {
            return match kind.as_str() {
                PING_MARKER => Classified::HeartbeatPing,
                PONG_MARKER => Classified::HeartbeatAck {
                    timestamp: timestamp_of(&object),
                },
                _ => {
                    let kind = MessageKind::Typed(kind.clone());
                    let payload = object
                        .remove(PAYLOAD_FIELD)
                        .unwrap_or(Value::Object(object));
                    Classified::Message { kind, payload }
                }
            };
        }

        if object.contains_key(PING_MARKER) {
            return Classified::HeartbeatPing;
        }

        if object.contains_key(PONG_MARKER) {
            return Classified::HeartbeatAck {
                timestamp: timestamp_of(&object),
            };
        }

        let kind = if let Some(kind) = self.domain_update(&object) {
            kind
        } else if self.has_status(&object) {
            MessageKind::ServerResponse
        } else {
            MessageKind::Unknown
        };

        Classified::Message {
            kind,
            payload: Value::Object(object),
        }
    }
}

/// Epoch-millisecond `timestamp` field of an object, if present and integral.
pub(crate) fn timestamp_of(object: &Map<String, Value>) -> Option<Timestamp> {
    object.get(TIMESTAMP_FIELD).and_then(Value::as_i64)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn classify(value: Value) -> Classified {
        DefaultClassifier::default().classify(value)
    }

    #[test]
    fn explicit_type_is_used_verbatim() {
        let classified = classify(json!({"type": "FOO"}));

        assert_eq!(
            classified,
            Classified::Message {
                kind: MessageKind::Typed("FOO".to_owned()),
                payload: json!({"type": "FOO"}),
            }
        );
    }

    #[test]
    fn explicit_type_unwraps_payload_field() {
        let classified = classify(json!({"type": "chat", "payload": {"text": "hi"}}));

        let Classified::Message { kind, payload } = classified else {
            panic!("expected a forwarded message");
        };
        assert_eq!(kind.tag(), "chat");
        assert_eq!(payload, json!({"text": "hi"}));
    }

    #[test]
    fn explicit_type_wins_over_collections() {
        let Classified::Message { kind, .. } =
            classify(json!({"type": "custom", "Items": [], "ResultCode": 0}))
        else {
            panic!("expected a forwarded message");
        };

        assert_eq!(kind, MessageKind::Typed("custom".to_owned()));
    }

    #[test]
    fn ping_marker_is_heartbeat_ping() {
        assert_eq!(classify(json!({"ping": true})), Classified::HeartbeatPing);
        assert_eq!(
            classify(json!({"type": "ping", "timestamp": 1})),
            Classified::HeartbeatPing
        );
    }

    #[test]
    fn pong_marker_is_heartbeat_ack() {
        assert_eq!(
            classify(json!({"pong": true, "timestamp": 1_700_000_000_000_i64})),
            Classified::HeartbeatAck {
                timestamp: Some(1_700_000_000_000)
            }
        );
        assert_eq!(
            classify(json!({"type": "pong"})),
            Classified::HeartbeatAck { timestamp: None }
        );
        assert!(classify(json!({"pong": 1})).is_heartbeat());
    }

    #[test]
    fn domain_collection_is_update() {
        let value = json!({"Items": [{"id": 1}], "ResultCode": 0});
        let classified = classify(value.clone());

        assert_eq!(
            classified,
            Classified::Message {
                kind: MessageKind::DomainUpdate {
                    domain: "items".to_owned()
                },
                payload: value,
            }
        );
    }

    #[test]
    fn domain_tag_is_lowercased() {
        let Classified::Message { kind, .. } = classify(json!({"Notifications": []})) else {
            panic!("expected a forwarded message");
        };

        assert_eq!(kind.tag(), "notifications_update");
    }

    #[test]
    fn non_array_collection_is_not_an_update() {
        let Classified::Message { kind, .. } = classify(json!({"Items": {"id": 1}})) else {
            panic!("expected a forwarded message");
        };

        assert_eq!(kind, MessageKind::Unknown);
    }

    #[test]
    fn numeric_status_is_server_response() {
        let Classified::Message { kind, .. } = classify(json!({"ResultCode": 3, "Message": "x"}))
        else {
            panic!("expected a forwarded message");
        };

        assert_eq!(kind, MessageKind::ServerResponse);
        assert_eq!(kind.tag(), "server_response");
    }

    #[test]
    fn string_status_is_unknown() {
        let Classified::Message { kind, .. } = classify(json!({"status": "ok"})) else {
            panic!("expected a forwarded message");
        };

        assert_eq!(kind, MessageKind::Unknown);
    }

    #[test]
    fn empty_object_is_unknown_and_unchanged() {
        assert_eq!(
            classify(json!({})),
            Classified::Message {
                kind: MessageKind::Unknown,
                payload: json!({}),
            }
        );
    }

    #[test]
    fn non_object_values_are_unknown() {
        assert_eq!(
            classify(json!([1, 2, 3])),
            Classified::Message {
                kind: MessageKind::Unknown,
                payload: json!([1, 2, 3]),
            }
        );
        assert_eq!(
            classify(json!("hello")),
            Classified::Message {
                kind: MessageKind::Unknown,
                payload: json!("hello"),
            }
        );
    }

    #[test]
    fn custom_domains_are_recognized() {
        let classifier = DefaultClassifier::new(
            ClassifierConfig::builder()
                .domain_collections(vec!["Orders".to_owned()])
                .build(),
        );

        let Classified::Message { kind, .. } = classifier.classify(json!({"Orders": []})) else {
            panic!("expected a forwarded message");
        };
        assert_eq!(kind.tag(), "orders_update");

        let Classified::Message { kind, .. } = classifier.classify(json!({"Items": []})) else {
            panic!("expected a forwarded message");
        };
        assert_eq!(kind, MessageKind::Unknown);
    }

    #[test]
    fn kind_serializes_as_tag() {
        let kind = MessageKind::DomainUpdate {
            domain: "users".to_owned(),
        };

        assert_eq!(serde_json::to_value(&kind).unwrap(), json!("users_update"));
    }
}
