//! Bridge engine configuration.

use serde::Deserialize;

use ratgdo_domain::message::RATGDO_MESSAGE_TYPE;

/// Settings shared by the pump, the trigger provisioner and the publisher.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// First topic segment of every controller topic.
    pub namespace: String,
    /// Marker tagging trigger rules and filtering dequeues. Must be identical on both sides.
    pub message_type: String,
    /// Maximum messages drained per notification.
    pub pump_budget: usize,
    /// Prefix of created trigger names; the broker name is appended in parentheses.
    pub trigger_name_prefix: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            namespace: "ratgdo".to_string(),
            message_type: RATGDO_MESSAGE_TYPE.to_string(),
            pump_budget: 1024,
            trigger_name_prefix: "ratgdo Trigger".to_string(),
        }
    }
}

impl BridgeConfig {
    /// Name given to the trigger created for `broker_name`.
    #[must_use]
    pub fn trigger_name(&self, broker_name: &str) -> String {
        format!("{} ({broker_name})", self.trigger_name_prefix)
    }
}
