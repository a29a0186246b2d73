//! Device actions and the bus commands they translate to.

use std::fmt;
use std::str::FromStr;

use crate::error::UnsupportedActionError;
use crate::topic::COMMAND_CATEGORY;

/// Actions the host can ask the bridge to relay to a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceAction {
    Lock,
    Unlock,
    RequestStatus,
}

impl DeviceAction {
    /// Command name and payload sent for this action.
    #[must_use]
    pub fn command(self) -> (&'static str, &'static str) {
        match self {
            Self::Unlock => ("door", "open"),
            Self::Lock => ("door", "close"),
            Self::RequestStatus => ("query", ""),
        }
    }
}

impl FromStr for DeviceAction {
    type Err = UnsupportedActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lock" => Ok(Self::Lock),
            "unlock" => Ok(Self::Unlock),
            "request_status" | "status" => Ok(Self::RequestStatus),
            other => Err(UnsupportedActionError(other.to_string())),
        }
    }
}

impl fmt::Display for DeviceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lock => f.write_str("lock"),
            Self::Unlock => f.write_str("unlock"),
            Self::RequestStatus => f.write_str("request_status"),
        }
    }
}

/// A message handed to the connector for publication.
///
/// Always QoS 0 and not retained: delivery is fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub topic: String,
    pub payload: String,
    pub qos: u8,
    pub retain: bool,
}

impl OutboundMessage {
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            qos: 0,
            retain: false,
        }
    }

    /// `<namespace>/<address>/command/<name>` with the action's payload.
    #[must_use]
    pub fn for_action(namespace: &str, address: &str, action: DeviceAction) -> Self {
        let (name, payload) = action.command();
        Self::new(
            format!("{namespace}/{address}/{COMMAND_CATEGORY}/{name}"),
            payload,
        )
    }
}
