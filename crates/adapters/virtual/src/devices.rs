//! In-memory device registry standing in for the host.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use ratgdo_app::ports::DeviceRepository;
use ratgdo_domain::device::GarageDevice;
use ratgdo_domain::error::{BridgeError, NotFoundError};
use ratgdo_domain::id::DeviceId;

/// Host-side device storage kept in memory.
#[derive(Default)]
pub struct InMemoryDeviceRepository {
    store: Mutex<HashMap<DeviceId, GarageDevice>>,
}

impl InMemoryDeviceRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device, replacing any device with the same id.
    pub fn insert(&self, device: GarageDevice) {
        self.lock().insert(device.id, device);
    }

    /// Remove a device from the host.
    pub fn remove(&self, id: DeviceId) -> Option<GarageDevice> {
        self.lock().remove(&id)
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<GarageDevice> {
        self.lock().values().find(|d| d.name == name).cloned()
    }

    /// All devices, ordered by name.
    #[must_use]
    pub fn all(&self) -> Vec<GarageDevice> {
        let mut devices: Vec<GarageDevice> = self.lock().values().cloned().collect();
        devices.sort_by(|a, b| a.name.cmp(&b.name));
        devices
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<DeviceId, GarageDevice>> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeviceRepository for InMemoryDeviceRepository {
    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<GarageDevice>, BridgeError>> + Send {
        let result = self.lock().get(&id).cloned();
        async { Ok(result) }
    }

    fn update(
        &self,
        device: GarageDevice,
    ) -> impl Future<Output = Result<GarageDevice, BridgeError>> + Send {
        let result = {
            let mut store = self.lock();
            match store.get_mut(&device.id) {
                Some(slot) => {
                    *slot = device.clone();
                    Ok(device)
                }
                None => Err(NotFoundError {
                    entity: "Device",
                    id: device.id.to_string(),
                }
                .into()),
            }
        };
        async { result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratgdo_domain::id::BrokerId;
    use ratgdo_domain::time::now;

    fn garage(name: &str) -> GarageDevice {
        GarageDevice::builder()
            .name(name)
            .address(name.to_lowercase())
            .broker_id(BrokerId::new())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_return_inserted_device() {
        let repo = InMemoryDeviceRepository::new();
        let device = garage("Garage");
        let id = device.id;
        repo.insert(device);

        let fetched = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Garage");
    }

    #[tokio::test]
    async fn should_store_updated_states() {
        let repo = InMemoryDeviceRepository::new();
        let mut device = garage("Garage");
        let id = device.id;
        repo.insert(device.clone());

        device.apply_status("door", "closed", now());
        repo.update(device).await.unwrap();

        assert!(repo.get_by_id(id).await.unwrap().unwrap().lock_state());
    }

    #[tokio::test]
    async fn should_fail_update_of_removed_device() {
        let repo = InMemoryDeviceRepository::new();
        let device = garage("Garage");
        repo.insert(device.clone());
        repo.remove(device.id);

        let result = repo.update(device).await;
        assert!(matches!(result, Err(BridgeError::NotFound(_))));
    }

    #[test]
    fn should_list_devices_by_name() {
        let repo = InMemoryDeviceRepository::new();
        repo.insert(garage("Shed"));
        repo.insert(garage("Barn"));
        let names: Vec<String> = repo.all().into_iter().map(|d| d.name).collect();
        assert_eq!(names, ["Barn", "Shed"]);
        assert!(repo.find_by_name("Shed").is_some());
    }
}
