//! Broker connector port: the external component owning broker connections.
//!
//! The connector queues messages selected by trigger rules, announces them
//! with a notification, and hands them out one at a time on request.

use std::future::Future;

use ratgdo_domain::action::OutboundMessage;
use ratgdo_domain::error::BridgeError;
use ratgdo_domain::id::BrokerId;
use ratgdo_domain::trigger::{NewTrigger, TriggerRecord};

/// Access to the broker connector.
pub trait BrokerConnector {
    /// Whether the connector is enabled. Nothing flows in or out when it is not.
    fn is_enabled(&self) -> bool;

    /// Dequeue the next message queued for `broker_id` under `message_type`.
    ///
    /// Returns `Ok(None)` once the queue is empty. The raw message is decoded
    /// by the caller.
    fn fetch_queued_message(
        &self,
        broker_id: BrokerId,
        message_type: &str,
    ) -> impl Future<Output = Result<Option<serde_json::Value>, BridgeError>> + Send;

    /// Enumerate every trigger known to the connector.
    fn list_triggers(&self) -> impl Future<Output = Result<Vec<TriggerRecord>, BridgeError>> + Send;

    /// Create a trigger rule.
    fn create_trigger(
        &self,
        trigger: NewTrigger,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Human-readable name of a broker connection, if it exists.
    fn broker_name(
        &self,
        broker_id: BrokerId,
    ) -> impl Future<Output = Result<Option<String>, BridgeError>> + Send;

    /// Hand a message over for publication. Does not wait for delivery.
    fn publish(
        &self,
        broker_id: BrokerId,
        message: OutboundMessage,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;
}

impl<T: BrokerConnector + Send + Sync> BrokerConnector for std::sync::Arc<T> {
    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }

    fn fetch_queued_message(
        &self,
        broker_id: BrokerId,
        message_type: &str,
    ) -> impl Future<Output = Result<Option<serde_json::Value>, BridgeError>> + Send {
        (**self).fetch_queued_message(broker_id, message_type)
    }

    fn list_triggers(&self) -> impl Future<Output = Result<Vec<TriggerRecord>, BridgeError>> + Send {
        (**self).list_triggers()
    }

    fn create_trigger(
        &self,
        trigger: NewTrigger,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).create_trigger(trigger)
    }

    fn broker_name(
        &self,
        broker_id: BrokerId,
    ) -> impl Future<Output = Result<Option<String>, BridgeError>> + Send {
        (**self).broker_name(broker_id)
    }

    fn publish(
        &self,
        broker_id: BrokerId,
        message: OutboundMessage,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).publish(broker_id, message)
    }
}
