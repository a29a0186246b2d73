//! State reconciler: applies one decoded status to a device.

use ratgdo_domain::device::{GarageDevice, StateUpdate, StatusChange};
use ratgdo_domain::time::now;

/// Apply `payload` as the value of `status` on `device`.
///
/// Unknown status names leave the device untouched and are logged at debug
/// level so newer firmware vocabularies pass through harmlessly. The result
/// tells the caller whether anything needs persisting.
pub fn reconcile(device: &mut GarageDevice, status: &str, payload: &str) -> StatusChange {
    let change = device.apply_status(status, payload, now());

    match change.update {
        StateUpdate::UnknownState => tracing::debug!(
            device_id = %device.id,
            address = %device.address,
            status,
            "status is not a known state, skipping"
        ),
        StateUpdate::Changed | StateUpdate::Unchanged => tracing::debug!(
            device_id = %device.id,
            status,
            payload,
            changed = change.update == StateUpdate::Changed,
            "state updated"
        ),
    }
    if let Some(locked) = change.lock_state {
        tracing::debug!(device_id = %device.id, locked, "lock state derived from door");
    }

    change
}

/// Whether a reconciliation produced anything to write back.
#[must_use]
pub fn needs_persist(change: &StatusChange) -> bool {
    change.update != StateUpdate::UnknownState || change.lock_state.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratgdo_domain::device::DOOR_STATE;
    use ratgdo_domain::id::BrokerId;
    use ratgdo_domain::state::StateValue;

    fn garage() -> GarageDevice {
        GarageDevice::builder()
            .name("Garage")
            .address("garage1")
            .broker_id(BrokerId::new())
            .build()
            .unwrap()
    }

    #[test]
    fn should_set_known_state_and_request_persist() {
        let mut device = garage();
        let change = reconcile(&mut device, "obstruction", "clear");
        assert_eq!(device.state("obstruction"), Some(&StateValue::from("clear")));
        assert!(needs_persist(&change));
    }

    #[test]
    fn should_not_persist_unknown_status() {
        let mut device = garage();
        let before = device.clone();
        let change = reconcile(&mut device, "firmwareVersion", "2.5.1");
        assert_eq!(change.update, StateUpdate::UnknownState);
        assert!(!needs_persist(&change));
        assert_eq!(device, before);
    }

    #[test]
    fn should_track_door_with_lock_state() {
        let mut device = garage();
        reconcile(&mut device, DOOR_STATE, "closed");
        assert!(device.lock_state());
        reconcile(&mut device, DOOR_STATE, "opening");
        assert!(!device.lock_state());
        assert_eq!(device.state(DOOR_STATE), Some(&StateValue::from("opening")));
    }

    #[test]
    fn should_keep_last_write_for_same_status() {
        let mut device = garage();
        reconcile(&mut device, "light", "on");
        reconcile(&mut device, "light", "off");
        assert_eq!(device.state("light"), Some(&StateValue::from("off")));
    }
}
