//! Bridge façade: the hooks the host calls.
//!
//! Owns the active device registry and routes every host callback to the
//! pump, provisioner or publisher. Nothing here is fatal: failures are logged
//! and returned to the caller as values.

use ratgdo_domain::action::DeviceAction;
use ratgdo_domain::device::GarageDevice;
use ratgdo_domain::error::{BridgeError, NotFoundError};
use ratgdo_domain::id::{BrokerId, DeviceId};
use ratgdo_domain::message::Notification;

use crate::config::BridgeConfig;
use crate::ports::{BrokerConnector, DeviceRepository};
use crate::provisioner::{ProvisionOutcome, TriggerProvisioner};
use crate::publisher::CommandPublisher;
use crate::pump::{MessagePump, PumpReport};
use crate::registry::{DeviceBinding, DeviceRegistry};

/// Routing and state-sync engine between a broker connector and the host.
pub struct RatgdoBridge<C, R> {
    connector: C,
    repo: R,
    registry: DeviceRegistry,
    config: BridgeConfig,
}

impl<C, R> RatgdoBridge<C, R>
where
    C: BrokerConnector + Sync,
    R: DeviceRepository + Sync,
{
    /// Create a bridge with an empty active set.
    pub fn new(connector: C, repo: R, config: BridgeConfig) -> Self {
        Self {
            connector,
            repo,
            registry: DeviceRegistry::new(),
            config,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Check the connector at startup.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ConnectorDisabled`] when the connector is off.
    /// The bridge stays usable; inbound and outbound traffic simply cannot flow.
    pub fn startup(&self) -> Result<(), BridgeError> {
        tracing::info!(namespace = %self.config.namespace, "starting ratgdo bridge");
        if !self.connector.is_enabled() {
            tracing::warn!("broker connector not enabled");
            return Err(BridgeError::ConnectorDisabled);
        }
        Ok(())
    }

    /// Make sure a status trigger exists for `broker_id`.
    #[tracing::instrument(skip(self))]
    pub async fn ensure_trigger(&self, broker_id: BrokerId) -> ProvisionOutcome {
        TriggerProvisioner::new(&self.connector, &self.config)
            .ensure_trigger(broker_id)
            .await
    }

    /// Start routing messages to a device.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] when the host does not know the
    /// device, or the repository's error.
    #[tracing::instrument(skip(self))]
    pub async fn on_device_start(&self, device_id: DeviceId) -> Result<(), BridgeError> {
        let device = self.load(device_id).await?;
        tracing::info!(device = %device.name, address = %device.address, "starting device");
        if !self.registry.start(DeviceBinding::from(&device)) {
            tracing::debug!(device = %device.name, "device already active");
        }
        Ok(())
    }

    /// Stop routing messages to a device. Stopping an inactive device is a no-op.
    #[tracing::instrument(skip(self))]
    pub fn on_device_stop(&self, device_id: DeviceId) {
        if self.registry.stop(device_id) {
            tracing::info!("stopping device");
        }
    }

    /// Handle a "messages queued" notification.
    ///
    /// Returns `None` when the notification carries another consumer's
    /// message type.
    pub async fn on_message_queued(&self, notification: &Notification) -> Option<PumpReport> {
        if notification.message_type != self.config.message_type {
            return None;
        }
        tracing::debug!(
            broker_id = %notification.broker_id,
            message_type = %notification.message_type,
            "message queued"
        );
        Some(self.pump(notification.broker_id).await)
    }

    /// Drain the queue of `broker_id`.
    pub async fn pump(&self, broker_id: BrokerId) -> PumpReport {
        MessagePump::new(
            &self.connector,
            &self.repo,
            &self.registry,
            &self.config.message_type,
            self.config.pump_budget,
        )
        .pump(broker_id)
        .await
    }

    /// # Errors
    ///
    /// See [`on_action`](Self::on_action).
    pub async fn on_lock_action(&self, device_id: DeviceId) -> Result<(), BridgeError> {
        self.on_action(device_id, DeviceAction::Lock).await
    }

    /// # Errors
    ///
    /// See [`on_action`](Self::on_action).
    pub async fn on_unlock_action(&self, device_id: DeviceId) -> Result<(), BridgeError> {
        self.on_action(device_id, DeviceAction::Unlock).await
    }

    /// # Errors
    ///
    /// See [`on_action`](Self::on_action).
    pub async fn on_status_request(&self, device_id: DeviceId) -> Result<(), BridgeError> {
        self.on_action(device_id, DeviceAction::RequestStatus).await
    }

    /// Relay `action` to the device's controller.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] for an unknown device,
    /// [`BridgeError::ConnectorDisabled`] when the connector is off, or the
    /// connector's publish error.
    #[tracing::instrument(skip(self))]
    pub async fn on_action(
        &self,
        device_id: DeviceId,
        action: DeviceAction,
    ) -> Result<(), BridgeError> {
        let device = self.load(device_id).await?;
        CommandPublisher::new(&self.connector, &self.config.namespace)
            .send_action(&device, action)
            .await
    }

    /// Relay an action given by its host name (`lock`, `unlock`, `request_status`).
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnsupportedAction`] for any other name; nothing
    /// is published in that case. Otherwise as [`on_action`](Self::on_action).
    pub async fn on_host_action(&self, device_id: DeviceId, name: &str) -> Result<(), BridgeError> {
        match name.parse::<DeviceAction>() {
            Ok(action) => self.on_action(device_id, action).await,
            Err(err) => {
                tracing::error!(%device_id, action = name, "unsupported action requested");
                Err(err.into())
            }
        }
    }

    async fn load(&self, device_id: DeviceId) -> Result<GarageDevice, BridgeError> {
        self.repo.get_by_id(device_id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Device",
                id: device_id.to_string(),
            }
            .into()
        })
    }
}
