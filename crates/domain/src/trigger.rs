//! Trigger rules: connector-side subscriptions that queue messages for the bridge.

use serde::{Deserialize, Serialize};

use crate::id::BrokerId;
use crate::topic::MatchSpec;

/// Connector trigger type for topic-matching rules.
pub const TOPIC_MATCH_TRIGGER: &str = "topicMatch";

/// A trigger as enumerated from the connector; its properties are free-form
/// until read with [`TriggerRecord::rule`].
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerRecord {
    pub name: String,
    pub trigger_type: String,
    pub props: serde_json::Value,
}

/// Typed properties of a topic-match trigger, keyed by `(broker_id, message_type)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRule {
    pub broker_id: BrokerId,
    pub message_type: String,
    /// Matching messages are queued for dequeue, not only announced.
    pub queue_message: bool,
    pub match_list: MatchSpec,
}

impl TriggerRule {
    #[must_use]
    pub fn is_for(&self, broker_id: BrokerId, message_type: &str) -> bool {
        self.broker_id == broker_id && self.message_type == message_type
    }
}

impl TriggerRecord {
    /// Read the rule properties.
    ///
    /// # Errors
    ///
    /// Returns the deserialisation error when the properties are not a rule.
    pub fn rule(&self) -> Result<TriggerRule, serde_json::Error> {
        TriggerRule::deserialize(&self.props)
    }
}

/// A request to create a trigger on the connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrigger {
    pub name: String,
    pub rule: TriggerRule,
}
