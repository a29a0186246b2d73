//! Active device registry: which devices are between start and stop.
//!
//! Only membership is tracked here; the host owns the devices themselves.
//! Each entry keeps the address and broker the device was started with so
//! the matcher can route without touching host storage.

use std::sync::{Mutex, MutexGuard, PoisonError};

use ratgdo_domain::device::GarageDevice;
use ratgdo_domain::id::{BrokerId, DeviceId};

/// Routing data of an active device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceBinding {
    pub device_id: DeviceId,
    pub address: String,
    pub broker_id: BrokerId,
}

impl From<&GarageDevice> for DeviceBinding {
    fn from(device: &GarageDevice) -> Self {
        Self {
            device_id: device.id,
            address: device.address.clone(),
            broker_id: device.broker_id,
        }
    }
}

/// Mutex-guarded set of active devices, in start order.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    active: Mutex<Vec<DeviceBinding>>,
}

impl DeviceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a device active. Returns `false` if it already was; its binding
    /// is refreshed in place.
    pub fn start(&self, binding: DeviceBinding) -> bool {
        let mut active = self.lock();
        if let Some(existing) = active
            .iter_mut()
            .find(|b| b.device_id == binding.device_id)
        {
            *existing = binding;
            return false;
        }
        active.push(binding);
        true
    }

    /// Mark a device inactive. Returns `false` if it was not active.
    pub fn stop(&self, device_id: DeviceId) -> bool {
        let mut active = self.lock();
        let before = active.len();
        active.retain(|b| b.device_id != device_id);
        active.len() != before
    }

    #[must_use]
    pub fn is_active(&self, device_id: DeviceId) -> bool {
        self.lock().iter().any(|b| b.device_id == device_id)
    }

    /// Snapshot of the active devices.
    #[must_use]
    pub fn active_devices(&self) -> Vec<DeviceBinding> {
        self.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<DeviceBinding>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
