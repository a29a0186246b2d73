//! # ratgdo-app
//!
//! Bridge engine: routes queued bus messages into garage device state and
//! relays device actions back onto the bus.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `BrokerConnector`: queued message source, trigger rules, publication
//!   - `DeviceRepository`: the host's device registry
//! - Provide the engine components:
//!   - `DeviceRegistry`: active device set, mutated by start/stop
//!   - `matcher`: topic → device routing
//!   - `reconciler`: status → device state
//!   - `MessagePump`: queue draining per broker
//!   - `TriggerProvisioner`: one status trigger per broker
//!   - `CommandPublisher`: action → command topic
//! - Expose host hooks through `RatgdoBridge`
//!
//! ## Dependency rule
//! Depends on `ratgdo-domain` only. Never imports adapter crates.

pub mod bridge;
pub mod config;
pub mod matcher;
pub mod ports;
pub mod provisioner;
pub mod publisher;
pub mod pump;
pub mod reconciler;
pub mod registry;

#[cfg(test)]
mod test_support;
