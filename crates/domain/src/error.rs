//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`BridgeError`]
//! via `#[from]` (domain errors) or a boxed source (adapter errors).

use std::error::Error as StdError;

/// Base error for every operation that crosses a port boundary.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("failed to decode queued message")]
    Decode(#[from] DecodeError),

    #[error("unsupported action")]
    UnsupportedAction(#[from] UnsupportedActionError),

    /// The broker connector is disabled or absent.
    #[error("broker connector not enabled")]
    ConnectorDisabled,

    /// The broker connector reported a failure.
    #[error("broker connector error")]
    Connector(#[source] Box<dyn StdError + Send + Sync>),
}

/// Invariant violations detected when building domain values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("address must not be empty")]
    EmptyAddress,

    /// Addresses are a single topic segment, so separators and wildcards are rejected.
    #[error("address {0:?} must not contain '/', '+' or '#'")]
    InvalidAddress(String),

    #[error("missing required field {0}")]
    MissingField(&'static str),
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Why a queued message or a stored filter could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Neither `topic_parts` nor `topic` was present.
    #[error("message has no topic")]
    MissingTopic,

    #[error("topic has {actual} segments, expected at least {expected}")]
    TooFewSegments { expected: usize, actual: usize },

    #[error("unrecognised topic filter {0:?}")]
    InvalidFilter(String),

    #[error("malformed message body")]
    Body(#[source] serde_json::Error),
}

/// A host action outside the set the bridge can relay.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported action {0:?}")]
pub struct UnsupportedActionError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_validation_error_with_from() {
        let err: BridgeError = ValidationError::EmptyAddress.into();
        assert!(matches!(
            err,
            BridgeError::Validation(ValidationError::EmptyAddress)
        ));
    }

    #[test]
    fn should_display_not_found_with_entity_and_id() {
        let err = NotFoundError {
            entity: "Device",
            id: "42".to_string(),
        };
        assert_eq!(err.to_string(), "Device 42 not found");
    }

    #[test]
    fn should_display_segment_count_for_short_topic() {
        let err = DecodeError::TooFewSegments {
            expected: 4,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "topic has 2 segments, expected at least 4"
        );
    }

    #[test]
    fn should_keep_source_for_connector_error() {
        let io = std::io::Error::other("broker gone");
        let err = BridgeError::Connector(Box::new(io));
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn should_quote_action_name_in_unsupported_action() {
        let err = UnsupportedActionError("beep".to_string());
        assert_eq!(err.to_string(), "unsupported action \"beep\"");
    }
}
