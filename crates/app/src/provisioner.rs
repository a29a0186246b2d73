//! Trigger provisioner: makes sure the connector queues status messages for us.
//!
//! A rule is identified by `(broker, message type)`. Every failure is logged
//! and reported, never raised: the bridge keeps running without inbound
//! delivery rather than refusing to start.

use ratgdo_domain::id::BrokerId;
use ratgdo_domain::topic::MatchSpec;
use ratgdo_domain::trigger::{NewTrigger, TOPIC_MATCH_TRIGGER, TriggerRule};

use crate::config::BridgeConfig;
use crate::ports::BrokerConnector;

/// Result of [`TriggerProvisioner::ensure_trigger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// A matching rule already existed; nothing was created.
    AlreadyPresent(String),
    /// A rule with this name was created.
    Created(String),
    /// Provisioning failed at the given step.
    Failed(ProvisionStep),
}

/// Step at which provisioning failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStep {
    ListTriggers,
    CreateTrigger,
}

pub struct TriggerProvisioner<'a, C> {
    connector: &'a C,
    config: &'a BridgeConfig,
}

impl<'a, C: BrokerConnector + Sync> TriggerProvisioner<'a, C> {
    #[must_use]
    pub fn new(connector: &'a C, config: &'a BridgeConfig) -> Self {
        Self { connector, config }
    }

    /// Create the status trigger for `broker_id` unless one exists.
    ///
    /// Existing triggers that are not topic matches, or whose properties
    /// cannot be read, are passed over.
    pub async fn ensure_trigger(&self, broker_id: BrokerId) -> ProvisionOutcome {
        let records = match self.connector.list_triggers().await {
            Ok(records) => records,
            Err(err) => {
                tracing::error!(%broker_id, error = ?err, "failed to enumerate triggers");
                return ProvisionOutcome::Failed(ProvisionStep::ListTriggers);
            }
        };

        for record in records
            .iter()
            .filter(|r| r.trigger_type == TOPIC_MATCH_TRIGGER)
        {
            tracing::debug!(name = %record.name, "checking existing trigger");
            let rule = match record.rule() {
                Ok(rule) => rule,
                Err(err) => {
                    tracing::debug!(name = %record.name, error = %err, "error reading trigger");
                    continue;
                }
            };
            if rule.is_for(broker_id, &self.config.message_type) {
                tracing::info!(name = %record.name, "skipping trigger creation, trigger already exists");
                return ProvisionOutcome::AlreadyPresent(record.name.clone());
            }
        }

        let broker_name = match self.connector.broker_name(broker_id).await {
            Ok(Some(name)) => name,
            Ok(None) => broker_id.to_string(),
            Err(err) => {
                tracing::debug!(%broker_id, error = ?err, "broker name unavailable");
                broker_id.to_string()
            }
        };
        let name = self.config.trigger_name(&broker_name);
        let trigger = NewTrigger {
            name: name.clone(),
            rule: TriggerRule {
                broker_id,
                message_type: self.config.message_type.clone(),
                queue_message: true,
                match_list: MatchSpec::status_reports(&self.config.namespace),
            },
        };

        match self.connector.create_trigger(trigger).await {
            Ok(()) => {
                tracing::info!(
                    %name,
                    message_type = %self.config.message_type,
                    "created trigger"
                );
                ProvisionOutcome::Created(name)
            }
            Err(err) => {
                tracing::error!(%name, error = ?err, "failed to create trigger");
                ProvisionOutcome::Failed(ProvisionStep::CreateTrigger)
            }
        }
    }
}
