//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the bridge engine and the outside world:
//! the broker connector that owns the bus connection, and the host registry
//! that owns devices.

pub mod connector;
pub mod storage;

pub use connector::BrokerConnector;
pub use storage::DeviceRepository;
