//! Garage device: a ratgdo controller registered in the host.
//!
//! The host owns device lifetime; the bridge reads a device to learn its
//! address and broker, and writes back state produced by [`GarageDevice::apply_status`].

use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::id::{BrokerId, DeviceId};
use crate::state::StateValue;
use crate::time::Timestamp;

/// State names declared for a device when none are given explicitly.
pub const DEFAULT_KNOWN_STATES: [&str; 6] = [
    "availability",
    "door",
    "light",
    "lock",
    "motion",
    "obstruction",
];

/// Status name whose payload drives the derived lock state.
pub const DOOR_STATE: &str = "door";

/// The only door payload that counts as locked.
pub const DOOR_CLOSED: &str = "closed";

/// A garage door controller addressed by a single topic segment.
#[derive(Debug, Clone, PartialEq)]
pub struct GarageDevice {
    pub id: DeviceId,
    pub name: String,
    /// Topic segment identifying this controller under the namespace.
    pub address: String,
    pub broker_id: BrokerId,
    pub last_updated: Option<Timestamp>,
    states: BTreeMap<String, StateValue>,
    lock_state: bool,
}

/// Outcome of writing a status payload to the state mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateUpdate {
    /// Known state, value differs from the previous one.
    Changed,
    /// Known state, same value written again.
    Unchanged,
    /// The status name is not declared on this device; nothing was stored.
    UnknownState,
}

/// Everything [`GarageDevice::apply_status`] did to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub update: StateUpdate,
    /// Lock state derived from a `door` status, if one was applied.
    pub lock_state: Option<bool>,
    pub lock_changed: bool,
}

impl StatusChange {
    /// Whether any stored value differs from before.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.update == StateUpdate::Changed || self.lock_changed
    }
}

impl GarageDevice {
    #[must_use]
    pub fn builder() -> GarageDeviceBuilder {
        GarageDeviceBuilder::default()
    }

    /// Check name and address invariants.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        validate_address(&self.address)
    }

    #[must_use]
    pub fn state(&self, name: &str) -> Option<&StateValue> {
        self.states.get(name)
    }

    #[must_use]
    pub fn states(&self) -> &BTreeMap<String, StateValue> {
        &self.states
    }

    #[must_use]
    pub fn is_known_state(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    /// `true` when the door was last reported exactly `"closed"`.
    #[must_use]
    pub fn lock_state(&self) -> bool {
        self.lock_state
    }

    /// Apply one status payload.
    ///
    /// Known names are overwritten (last write wins); unknown names are left
    /// out of the mapping. A `door` status always recomputes the lock state,
    /// and any payload other than exactly `"closed"` means unlocked.
    pub fn apply_status(&mut self, status: &str, payload: &str, at: Timestamp) -> StatusChange {
        let update = match self.states.get_mut(status) {
            Some(current) if current.as_text() == Some(payload) => StateUpdate::Unchanged,
            Some(current) => {
                *current = StateValue::from(payload);
                StateUpdate::Changed
            }
            None => StateUpdate::UnknownState,
        };

        let mut change = StatusChange {
            update,
            lock_state: None,
            lock_changed: false,
        };

        if status == DOOR_STATE {
            let locked = payload == DOOR_CLOSED;
            change.lock_changed = self.lock_state != locked;
            change.lock_state = Some(locked);
            self.lock_state = locked;
        }

        if update != StateUpdate::UnknownState || change.lock_state.is_some() {
            self.last_updated = Some(at);
        }

        change
    }
}

fn validate_address(address: &str) -> Result<(), ValidationError> {
    if address.trim().is_empty() {
        return Err(ValidationError::EmptyAddress);
    }
    if address.contains(['/', '+', '#']) {
        return Err(ValidationError::InvalidAddress(address.to_string()));
    }
    Ok(())
}

/// Builder for [`GarageDevice`].
#[derive(Debug, Default)]
pub struct GarageDeviceBuilder {
    id: Option<DeviceId>,
    name: Option<String>,
    address: Option<String>,
    broker_id: Option<BrokerId>,
    known_states: Option<Vec<String>>,
}

impl GarageDeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: DeviceId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[must_use]
    pub fn broker_id(mut self, broker_id: BrokerId) -> Self {
        self.broker_id = Some(broker_id);
        self
    }

    /// Replace the default known state names. `door` is always kept.
    #[must_use]
    pub fn known_states<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_states = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Build the device, validating its invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for an empty name, a missing broker, or an
    /// address that is not a single topic segment.
    pub fn build(self) -> Result<GarageDevice, ValidationError> {
        let broker_id = self
            .broker_id
            .ok_or(ValidationError::MissingField("broker_id"))?;

        let names = self.known_states.unwrap_or_else(|| {
            DEFAULT_KNOWN_STATES
                .iter()
                .map(ToString::to_string)
                .collect()
        });
        let mut states: BTreeMap<String, StateValue> = names
            .into_iter()
            .map(|name| (name, StateValue::default()))
            .collect();
        states.entry(DOOR_STATE.to_string()).or_default();

        let device = GarageDevice {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            broker_id,
            last_updated: None,
            states,
            lock_state: false,
        };
        device.validate()?;
        Ok(device)
    }
}
