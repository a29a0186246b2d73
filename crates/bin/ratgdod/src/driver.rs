//! Line-oriented stdin driver standing in for the host's event loop.
//!
//! Each line is one host event:
//!
//! ```text
//! pub <broker> <topic> [payload]   deliver a bus message
//! start <device>                   device started
//! stop <device>                    device stopped
//! show                             dump device states
//! <action> <device>                lock, unlock, status, ...
//! ```

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use ratgdo_adapter_virtual::{InMemoryDeviceRepository, VirtualConnector};
use ratgdo_app::bridge::RatgdoBridge;
use ratgdo_domain::device::GarageDevice;

pub type Bridge = RatgdoBridge<Arc<VirtualConnector>, Arc<InMemoryDeviceRepository>>;

/// A parsed driver line.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Publish {
        broker: &'a str,
        topic: &'a str,
        payload: &'a str,
    },
    Start(&'a str),
    Stop(&'a str),
    Show,
    Action {
        name: &'a str,
        device: &'a str,
    },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing {0}")]
    MissingArgument(&'static str),
}

impl<'a> Command<'a> {
    /// Parse one line. Blank lines and `#` comments yield `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingArgument`] when a command lacks its operand.
    pub fn parse(line: &'a str) -> Result<Option<Self>, ParseError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match word {
            "pub" => {
                let mut parts = rest.splitn(3, ' ');
                let broker = non_empty(parts.next(), "broker")?;
                let topic = non_empty(parts.next(), "topic")?;
                Self::Publish {
                    broker,
                    topic,
                    payload: parts.next().unwrap_or(""),
                }
            }
            "start" => Self::Start(non_empty(Some(rest), "device")?),
            "stop" => Self::Stop(non_empty(Some(rest), "device")?),
            "show" => Self::Show,
            name => Self::Action {
                name,
                device: non_empty(Some(rest), "device")?,
            },
        };
        Ok(Some(command))
    }
}

fn non_empty<'a>(value: Option<&'a str>, what: &'static str) -> Result<&'a str, ParseError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ParseError::MissingArgument(what)),
    }
}

/// Feeds host events from a line source into the bridge.
pub struct Driver<'a> {
    bridge: &'a Bridge,
    connector: &'a VirtualConnector,
    devices: &'a InMemoryDeviceRepository,
}

impl<'a> Driver<'a> {
    pub fn new(
        bridge: &'a Bridge,
        connector: &'a VirtualConnector,
        devices: &'a InMemoryDeviceRepository,
    ) -> Self {
        Self {
            bridge,
            connector,
            devices,
        }
    }

    /// Process lines until `input` is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error only when reading from `input` fails; bad lines are
    /// logged and skipped.
    pub async fn run<I>(&self, input: I) -> std::io::Result<()>
    where
        I: AsyncRead + Unpin,
    {
        let mut lines = BufReader::new(input).lines();
        while let Some(line) = lines.next_line().await? {
            match Command::parse(&line) {
                Ok(Some(command)) => self.execute(command).await,
                Ok(None) => {}
                Err(err) => tracing::warn!(line = %line, error = %err, "ignoring malformed line"),
            }
        }
        Ok(())
    }

    async fn execute(&self, command: Command<'_>) {
        match command {
            Command::Publish {
                broker,
                topic,
                payload,
            } => self.publish(broker, topic, payload).await,
            Command::Start(name) => {
                if let Some(device) = self.device(name) {
                    if let Err(err) = self.bridge.on_device_start(device.id).await {
                        tracing::warn!(device = name, error = %err, "start failed");
                    }
                }
            }
            Command::Stop(name) => {
                if let Some(device) = self.device(name) {
                    self.bridge.on_device_stop(device.id);
                }
            }
            Command::Show => self.show(),
            Command::Action { name, device } => {
                if let Some(found) = self.device(device) {
                    if let Err(err) = self.bridge.on_host_action(found.id, name).await {
                        tracing::warn!(device, action = name, error = %err, "action failed");
                    }
                }
            }
        }
    }

    async fn publish(&self, broker: &str, topic: &str, payload: &str) {
        let Some(broker_id) = self.connector.broker_by_name(broker) else {
            tracing::warn!(broker, "unknown broker");
            return;
        };
        let notifications = match self.connector.inject(broker_id, topic, payload) {
            Ok(notifications) => notifications,
            Err(err) => {
                tracing::warn!(broker, topic, error = %err, "message not delivered");
                return;
            }
        };
        for notification in &notifications {
            if let Some(report) = self.bridge.on_message_queued(notification).await {
                tracing::info!(
                    broker,
                    dequeued = report.dequeued,
                    applied = report.applied,
                    "queue drained"
                );
            }
        }
    }

    fn show(&self) {
        for device in self.devices.all() {
            tracing::info!(
                name = %device.name,
                address = %device.address,
                active = self.bridge.registry().is_active(device.id),
                lock_state = device.lock_state(),
                states = ?device.states(),
                "device"
            );
        }
    }

    fn device(&self, name: &str) -> Option<GarageDevice> {
        let device = self.devices.find_by_name(name);
        if device.is_none() {
            tracing::warn!(device = name, "unknown device");
        }
        device
    }
}
