//! Outbound command publisher: relays device actions onto the bus.

use ratgdo_domain::action::{DeviceAction, OutboundMessage};
use ratgdo_domain::device::GarageDevice;
use ratgdo_domain::error::BridgeError;

use crate::ports::BrokerConnector;

/// Publishes commands on the device's broker. Fire-and-forget, no retry.
pub struct CommandPublisher<'a, C> {
    connector: &'a C,
    namespace: &'a str,
}

impl<'a, C: BrokerConnector + Sync> CommandPublisher<'a, C> {
    #[must_use]
    pub fn new(connector: &'a C, namespace: &'a str) -> Self {
        Self {
            connector,
            namespace,
        }
    }

    /// Publish the command for `action` to `device`.
    ///
    /// # Errors
    ///
    /// See [`publish_topic`](Self::publish_topic).
    pub async fn send_action(
        &self,
        device: &GarageDevice,
        action: DeviceAction,
    ) -> Result<(), BridgeError> {
        tracing::debug!(device = %device.name, %action, "relaying action");
        let message = OutboundMessage::for_action(self.namespace, &device.address, action);
        self.publish(device, message).await
    }

    /// Publish `payload` on `topic` through the device's broker.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ConnectorDisabled`] when the connector is
    /// disabled, or the connector's own error when hand-over fails.
    pub async fn publish_topic(
        &self,
        device: &GarageDevice,
        topic: &str,
        payload: &str,
    ) -> Result<(), BridgeError> {
        self.publish(device, OutboundMessage::new(topic, payload))
            .await
    }

    async fn publish(
        &self,
        device: &GarageDevice,
        message: OutboundMessage,
    ) -> Result<(), BridgeError> {
        if !self.connector.is_enabled() {
            tracing::error!(device = %device.name, "broker connector not enabled, publish aborted");
            return Err(BridgeError::ConnectorDisabled);
        }

        let topic = message.topic.clone();
        let payload = message.payload.clone();
        self.connector
            .publish(device.broker_id, message)
            .await
            .inspect_err(|err| {
                tracing::error!(device = %device.name, %topic, error = ?err, "publish failed");
            })?;
        tracing::debug!(device = %device.name, %topic, %payload, "published");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use ratgdo_domain::id::BrokerId;

    use crate::test_support::{FakeConnector, garage};

    #[tokio::test]
    async fn should_publish_unlock_as_door_open() {
        let connector = FakeConnector::default();
        let broker = BrokerId::new();
        let device = garage("garage1", broker);

        CommandPublisher::new(&connector, "ratgdo")
            .send_action(&device, DeviceAction::Unlock)
            .await
            .unwrap();

        let published = connector.published();
        assert_eq!(published.len(), 1);
        let (to, msg) = &published[0];
        assert_eq!(*to, broker);
        assert_eq!(msg.topic, "ratgdo/garage1/command/door");
        assert_eq!(msg.payload, "open");
        assert_eq!(msg.qos, 0);
        assert!(!msg.retain);
    }

    #[tokio::test]
    async fn should_publish_query_for_status_request() {
        let connector = FakeConnector::default();
        let device = garage("garage1", BrokerId::new());

        CommandPublisher::new(&connector, "ratgdo")
            .send_action(&device, DeviceAction::RequestStatus)
            .await
            .unwrap();

        let (_, msg) = &connector.published()[0];
        assert_eq!(msg.topic, "ratgdo/garage1/command/query");
        assert_eq!(msg.payload, "");
    }

    #[tokio::test]
    async fn should_publish_arbitrary_topic() {
        let connector = FakeConnector::default();
        let device = garage("garage1", BrokerId::new());

        CommandPublisher::new(&connector, "ratgdo")
            .publish_topic(&device, "ratgdo/garage1/command/light", "toggle")
            .await
            .unwrap();

        let (_, msg) = &connector.published()[0];
        assert_eq!(msg.topic, "ratgdo/garage1/command/light");
        assert_eq!(msg.payload, "toggle");
    }

    #[tokio::test]
    async fn should_refuse_when_connector_disabled() {
        let connector = FakeConnector::default();
        connector.enabled.store(false, Ordering::SeqCst);
        let device = garage("garage1", BrokerId::new());

        let result = CommandPublisher::new(&connector, "ratgdo")
            .send_action(&device, DeviceAction::Lock)
            .await;

        assert!(matches!(result, Err(BridgeError::ConnectorDisabled)));
        assert!(connector.published().is_empty());
    }
}
