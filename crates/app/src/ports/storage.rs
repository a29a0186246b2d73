//! Storage port: the host's device registry.

use std::future::Future;

use ratgdo_domain::device::GarageDevice;
use ratgdo_domain::error::BridgeError;
use ratgdo_domain::id::DeviceId;

/// Host-owned device storage. The bridge reads devices and writes back state.
pub trait DeviceRepository {
    /// Get a device by its host identifier.
    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<GarageDevice>, BridgeError>> + Send;

    /// Store the device's current states.
    fn update(
        &self,
        device: GarageDevice,
    ) -> impl Future<Output = Result<GarageDevice, BridgeError>> + Send;
}

impl<T: DeviceRepository + Send + Sync> DeviceRepository for std::sync::Arc<T> {
    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<GarageDevice>, BridgeError>> + Send {
        (**self).get_by_id(id)
    }

    fn update(
        &self,
        device: GarageDevice,
    ) -> impl Future<Output = Result<GarageDevice, BridgeError>> + Send {
        (**self).update(device)
    }
}
