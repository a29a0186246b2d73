//! Queued messages handed over by the broker connector.

use serde::Deserialize;

use crate::error::DecodeError;
use crate::id::BrokerId;
use crate::topic::TopicPath;

/// Message type marker distinguishing this bridge's traffic on a shared broker.
pub const RATGDO_MESSAGE_TYPE: &str = "##ratgdo##";

/// A bus message dequeued for one broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMessage {
    pub broker_id: BrokerId,
    pub topic: TopicPath,
    pub payload: String,
}

/// Wire shape of a dequeued message as the connector hands it out.
#[derive(Debug, Deserialize)]
struct RawQueuedMessage {
    #[serde(default)]
    topic_parts: Option<Vec<String>>,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    payload: String,
}

impl QueuedMessage {
    /// Decode a raw connector message.
    ///
    /// `topic_parts` wins over `topic` when both are present; a missing
    /// payload decodes as the empty string.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the body is not an object of the expected
    /// shape or the topic has fewer than four segments.
    pub fn decode(broker_id: BrokerId, raw: serde_json::Value) -> Result<Self, DecodeError> {
        let raw: RawQueuedMessage = serde_json::from_value(raw).map_err(DecodeError::Body)?;
        let topic = match (raw.topic_parts, raw.topic) {
            (Some(parts), _) => TopicPath::from_parts(parts)?,
            (None, Some(topic)) => topic.parse()?,
            (None, None) => return Err(DecodeError::MissingTopic),
        };
        Ok(Self {
            broker_id,
            topic,
            payload: raw.payload,
        })
    }
}

/// "Messages are queued" signal from the connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message_type: String,
    pub broker_id: BrokerId,
}

impl Notification {
    #[must_use]
    pub fn new(message_type: impl Into<String>, broker_id: BrokerId) -> Self {
        Self {
            message_type: message_type.into(),
            broker_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_decode_topic_parts_and_payload() {
        let broker = BrokerId::new();
        let msg = QueuedMessage::decode(
            broker,
            json!({"topic_parts": ["ratgdo", "garage1", "status", "door"], "payload": "closed"}),
        )
        .unwrap();
        assert_eq!(msg.broker_id, broker);
        assert_eq!(msg.topic.address(), "garage1");
        assert_eq!(msg.payload, "closed");
    }

    #[test]
    fn should_split_plain_topic_when_parts_are_missing() {
        let msg = QueuedMessage::decode(
            BrokerId::new(),
            json!({"topic": "ratgdo/garage1/status/light", "payload": "on"}),
        )
        .unwrap();
        assert_eq!(msg.topic.name(), "light");
    }

    #[test]
    fn should_default_payload_to_empty_string() {
        let msg = QueuedMessage::decode(
            BrokerId::new(),
            json!({"topic_parts": ["ratgdo", "garage1", "status", "door"]}),
        )
        .unwrap();
        assert_eq!(msg.payload, "");
    }

    #[test]
    fn should_fail_without_topic() {
        let err = QueuedMessage::decode(BrokerId::new(), json!({"payload": "x"})).unwrap_err();
        assert!(matches!(err, DecodeError::MissingTopic));
    }

    #[test]
    fn should_fail_on_short_topic() {
        let err = QueuedMessage::decode(
            BrokerId::new(),
            json!({"topic_parts": ["ratgdo", "garage1"], "payload": "x"}),
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::TooFewSegments { .. }));
    }

    #[test]
    fn should_fail_on_non_object_body() {
        let err = QueuedMessage::decode(BrokerId::new(), json!("ratgdo/garage1")).unwrap_err();
        assert!(matches!(err, DecodeError::Body(_)));
    }
}
