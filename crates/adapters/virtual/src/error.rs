//! Virtual adapter error types.

use ratgdo_domain::error::BridgeError;
use ratgdo_domain::id::BrokerId;

/// Errors specific to the virtual adapter.
#[derive(Debug, thiserror::Error)]
pub enum VirtualError {
    /// The connector was switched off.
    #[error("virtual connector disabled")]
    Disabled,

    /// No broker with this id was added to the connector.
    #[error("unknown broker {0}")]
    UnknownBroker(BrokerId),

    /// A trigger rule could not be stored as properties.
    #[error("failed to encode trigger properties")]
    Encode(#[source] serde_json::Error),
}

impl VirtualError {
    /// Convert into a [`BridgeError`] for propagation across port boundaries.
    #[must_use]
    pub fn into_domain(self) -> BridgeError {
        match self {
            Self::Disabled => BridgeError::ConnectorDisabled,
            other => BridgeError::Connector(Box::new(other)),
        }
    }
}

impl From<VirtualError> for BridgeError {
    fn from(err: VirtualError) -> Self {
        err.into_domain()
    }
}
