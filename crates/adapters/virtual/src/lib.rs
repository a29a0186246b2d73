//! # ratgdo-adapter-virtual
//!
//! In-process implementations of the bridge's ports, for simulation and
//! end-to-end testing without a broker or a host.
//!
//! | Type | Port | Behaviour |
//! |------|------|-----------|
//! | [`VirtualConnector`] | `BrokerConnector` | Trigger store, per-broker queues, publish log, enable switch |
//! | [`InMemoryDeviceRepository`] | `DeviceRepository` | Devices kept in a map |
//!
//! ## Dependency rule
//!
//! Depends on `ratgdo-app` (port traits) and `ratgdo-domain` only.

mod connector;
mod devices;
mod error;

pub use connector::{PublishedMessage, VirtualConnector};
pub use devices::InMemoryDeviceRepository;
pub use error::VirtualError;
