//! Inbound message pump: drains a broker's queue into device state.
//!
//! One pump call handles one notification. Messages are taken one at a time
//! and fully applied before the next dequeue, so later messages for the same
//! status always win.

use ratgdo_domain::device::StateUpdate;
use ratgdo_domain::id::BrokerId;
use ratgdo_domain::message::QueuedMessage;

use crate::matcher::match_topic;
use crate::ports::{BrokerConnector, DeviceRepository};
use crate::reconciler::{needs_persist, reconcile};
use crate::registry::DeviceRegistry;

/// What one pump call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpReport {
    /// Messages taken off the queue.
    pub dequeued: usize,
    /// Messages decoded into a topic and payload.
    pub decoded: usize,
    /// Messages dropped because they could not be decoded.
    pub skipped: usize,
    /// Decoded messages that targeted no active device.
    pub unmatched: usize,
    /// Device updates written back to the host.
    pub applied: usize,
    /// Status names a device did not declare.
    pub unknown_status: usize,
    /// The dequeue budget was spent. The queue may or may not be empty;
    /// anything left waits for the next notification.
    pub budget_reached: bool,
    /// A dequeue call failed and draining stopped early.
    pub fetch_failed: bool,
}

/// Drains queued messages for one broker at a time.
pub struct MessagePump<'a, C, R> {
    connector: &'a C,
    repo: &'a R,
    registry: &'a DeviceRegistry,
    message_type: &'a str,
    budget: usize,
}

impl<'a, C, R> MessagePump<'a, C, R>
where
    C: BrokerConnector + Sync,
    R: DeviceRepository + Sync,
{
    #[must_use]
    pub fn new(
        connector: &'a C,
        repo: &'a R,
        registry: &'a DeviceRegistry,
        message_type: &'a str,
        budget: usize,
    ) -> Self {
        Self {
            connector,
            repo,
            registry,
            message_type,
            budget,
        }
    }

    /// Dequeue until the connector reports an empty queue or the budget is spent.
    ///
    /// Neither a bad message nor a failed update stops the loop; a failed
    /// dequeue does, since nothing more can be read.
    pub async fn pump(&self, broker_id: BrokerId) -> PumpReport {
        let mut report = PumpReport::default();

        loop {
            if report.dequeued >= self.budget {
                tracing::warn!(
                    %broker_id,
                    budget = self.budget,
                    "pump budget reached, any remaining messages wait for the next notification"
                );
                report.budget_reached = true;
                break;
            }

            let raw = match self
                .connector
                .fetch_queued_message(broker_id, self.message_type)
                .await
            {
                Ok(Some(raw)) => raw,
                Ok(None) => break,
                Err(err) => {
                    tracing::warn!(%broker_id, error = ?err, "failed to fetch queued message");
                    report.fetch_failed = true;
                    break;
                }
            };
            report.dequeued += 1;

            match QueuedMessage::decode(broker_id, raw) {
                Ok(message) => {
                    report.decoded += 1;
                    self.dispatch(&message, &mut report).await;
                }
                Err(err) => {
                    tracing::warn!(%broker_id, error = %err, "skipping undecodable message");
                    report.skipped += 1;
                }
            }
        }

        tracing::debug!(%broker_id, ?report, "pump finished");
        report
    }

    async fn dispatch(&self, message: &QueuedMessage, report: &mut PumpReport) {
        tracing::debug!(
            broker_id = %message.broker_id,
            topic = %message.topic,
            payload = %message.payload,
            "processing message"
        );

        let active = self.registry.active_devices();
        let matches = match_topic(&message.topic, &active);
        if matches.is_empty() {
            report.unmatched += 1;
            return;
        }

        for found in matches {
            let device_id = found.device.device_id;
            let mut device = match self.repo.get_by_id(device_id).await {
                Ok(Some(device)) => device,
                Ok(None) => {
                    tracing::warn!(%device_id, "active device missing from host registry");
                    continue;
                }
                Err(err) => {
                    tracing::warn!(%device_id, error = ?err, "failed to load device");
                    continue;
                }
            };

            let change = reconcile(&mut device, found.status, &message.payload);
            if change.update == StateUpdate::UnknownState {
                report.unknown_status += 1;
            }
            if !needs_persist(&change) {
                continue;
            }

            match self.repo.update(device).await {
                Ok(_) => report.applied += 1,
                Err(err) => tracing::warn!(%device_id, error = ?err, "failed to store device state"),
            }
        }
    }
}
