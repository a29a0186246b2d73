//! # ratgdod: ratgdo bridge daemon
//!
//! Composition root that wires the bridge engine to the virtual broker
//! connector and an in-memory device store, then drives it from stdin.
//!
//! ## Responsibilities
//! - Load configuration (`ratgdo.toml`, env vars)
//! - Initialise logging
//! - Register the configured brokers and devices
//! - Provision one trigger per broker and start every device
//! - Feed host events read from stdin into the bridge
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;
mod driver;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use ratgdo_adapter_virtual::{InMemoryDeviceRepository, VirtualConnector};
use ratgdo_app::bridge::RatgdoBridge;
use ratgdo_domain::device::GarageDevice;

use crate::config::Config;
use crate::driver::Driver;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter).context("parsing log filter")?,
        )
        .init();

    // Brokers
    let connector = Arc::new(VirtualConnector::new());
    let brokers: HashMap<&str, _> = config
        .brokers
        .iter()
        .map(|broker| (broker.name.as_str(), connector.add_broker(&broker.name)))
        .collect();

    // Devices
    let devices = Arc::new(InMemoryDeviceRepository::new());
    for entry in &config.devices {
        let broker_id = *brokers
            .get(entry.broker.as_str())
            .with_context(|| format!("device {:?} has no broker", entry.name))?;
        let mut builder = GarageDevice::builder()
            .name(&entry.name)
            .address(&entry.address)
            .broker_id(broker_id);
        if let Some(states) = &entry.known_states {
            builder = builder.known_states(states);
        }
        devices.insert(
            builder
                .build()
                .with_context(|| format!("invalid device {:?}", entry.name))?,
        );
    }

    let bridge = RatgdoBridge::new(
        Arc::clone(&connector),
        Arc::clone(&devices),
        config.bridge,
    );
    if let Err(err) = bridge.startup() {
        tracing::warn!(error = %err, "bridge starting without a usable connector");
    }

    for broker_id in brokers.values() {
        bridge.ensure_trigger(*broker_id).await;
    }
    for device in devices.all() {
        if let Err(err) = bridge.on_device_start(device.id).await {
            tracing::warn!(device = %device.name, error = %err, "device failed to start");
        }
    }

    tracing::info!(
        brokers = brokers.len(),
        devices = bridge.registry().len(),
        "ratgdod ready, reading events from stdin"
    );
    Driver::new(&bridge, &connector, &devices)
        .run(tokio::io::stdin())
        .await
        .context("reading stdin")?;

    tracing::info!("input closed, shutting down");
    Ok(())
}
