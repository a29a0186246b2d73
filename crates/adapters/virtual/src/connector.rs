//! Virtual broker connector.
//!
//! Keeps trigger rules, per-broker queues and a publish log in memory.
//! [`VirtualConnector::inject`] plays the role of the bus: it runs a topic
//! through the trigger rules of its broker, queues it for every matching rule
//! that asks for queuing, and returns the notifications the host would
//! broadcast.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use ratgdo_app::ports::BrokerConnector;
use ratgdo_domain::action::OutboundMessage;
use ratgdo_domain::error::BridgeError;
use ratgdo_domain::id::BrokerId;
use ratgdo_domain::message::Notification;
use ratgdo_domain::topic::SEPARATOR;
use ratgdo_domain::trigger::{NewTrigger, TOPIC_MATCH_TRIGGER, TriggerRecord};

use crate::error::VirtualError;

type QueueKey = (BrokerId, String);

/// A message handed over for publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub broker_id: BrokerId,
    pub message: OutboundMessage,
}

/// In-memory stand-in for the broker connector.
pub struct VirtualConnector {
    enabled: AtomicBool,
    brokers: Mutex<BTreeMap<BrokerId, String>>,
    triggers: Mutex<Vec<TriggerRecord>>,
    queues: Mutex<HashMap<QueueKey, VecDeque<serde_json::Value>>>,
    published: Mutex<Vec<PublishedMessage>>,
}

impl Default for VirtualConnector {
    fn default() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            brokers: Mutex::new(BTreeMap::new()),
            triggers: Mutex::new(Vec::new()),
            queues: Mutex::new(HashMap::new()),
            published: Mutex::new(Vec::new()),
        }
    }
}

impl VirtualConnector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a broker connection and return its id.
    pub fn add_broker(&self, name: impl Into<String>) -> BrokerId {
        let id = BrokerId::new();
        lock(&self.brokers).insert(id, name.into());
        id
    }

    /// Look up a broker id by name.
    #[must_use]
    pub fn broker_by_name(&self, name: &str) -> Option<BrokerId> {
        lock(&self.brokers)
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(id, _)| *id)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    #[must_use]
    pub fn triggers(&self) -> Vec<TriggerRecord> {
        lock(&self.triggers).clone()
    }

    /// Messages waiting for `(broker_id, message_type)`.
    #[must_use]
    pub fn queued(&self, broker_id: BrokerId, message_type: &str) -> usize {
        lock(&self.queues)
            .get(&(broker_id, message_type.to_string()))
            .map_or(0, VecDeque::len)
    }

    #[must_use]
    pub fn published(&self) -> Vec<PublishedMessage> {
        lock(&self.published).clone()
    }

    /// Drain the publish log.
    pub fn take_published(&self) -> Vec<PublishedMessage> {
        std::mem::take(&mut *lock(&self.published))
    }

    /// Deliver a bus message arriving on `broker_id`.
    ///
    /// Returns one notification per message type the message was queued for.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualError::Disabled`] when switched off, or
    /// [`VirtualError::UnknownBroker`] for a broker never added.
    pub fn inject(
        &self,
        broker_id: BrokerId,
        topic: &str,
        payload: &str,
    ) -> Result<Vec<Notification>, VirtualError> {
        if !self.enabled.load(Ordering::SeqCst) {
            return Err(VirtualError::Disabled);
        }
        self.ensure_broker(broker_id)?;

        let parts: Vec<&str> = topic.split(SEPARATOR).collect();
        let message_types: Vec<String> = lock(&self.triggers)
            .iter()
            .filter(|record| record.trigger_type == TOPIC_MATCH_TRIGGER)
            .filter_map(|record| record.rule().ok())
            .filter(|rule| {
                rule.broker_id == broker_id && rule.queue_message && rule.match_list.matches(parts.as_slice())
            })
            .map(|rule| rule.message_type)
            .collect();

        let mut notifications: Vec<Notification> = Vec::new();
        let mut queues = lock(&self.queues);
        for message_type in message_types {
            queues
                .entry((broker_id, message_type.clone()))
                .or_default()
                .push_back(serde_json::json!({
                    "topic": topic,
                    "topic_parts": parts,
                    "payload": payload,
                }));
            if !notifications.iter().any(|n| n.message_type == message_type) {
                notifications.push(Notification::new(message_type, broker_id));
            }
        }
        drop(queues);

        tracing::trace!(%broker_id, topic, queued_for = notifications.len(), "message injected");
        Ok(notifications)
    }

    fn ensure_broker(&self, broker_id: BrokerId) -> Result<(), VirtualError> {
        if lock(&self.brokers).contains_key(&broker_id) {
            Ok(())
        } else {
            Err(VirtualError::UnknownBroker(broker_id))
        }
    }

    fn create(&self, trigger: NewTrigger) -> Result<(), VirtualError> {
        self.ensure_broker(trigger.rule.broker_id)?;
        let props = serde_json::to_value(&trigger.rule).map_err(VirtualError::Encode)?;
        lock(&self.triggers).push(TriggerRecord {
            name: trigger.name,
            trigger_type: TOPIC_MATCH_TRIGGER.to_string(),
            props,
        });
        Ok(())
    }

    fn hand_over(&self, broker_id: BrokerId, message: OutboundMessage) -> Result<(), VirtualError> {
        if !self.enabled.load(Ordering::SeqCst) {
            return Err(VirtualError::Disabled);
        }
        self.ensure_broker(broker_id)?;
        lock(&self.published).push(PublishedMessage { broker_id, message });
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl BrokerConnector for VirtualConnector {
    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn fetch_queued_message(
        &self,
        broker_id: BrokerId,
        message_type: &str,
    ) -> impl Future<Output = Result<Option<serde_json::Value>, BridgeError>> + Send {
        let result = if self.is_enabled() {
            Ok(lock(&self.queues)
                .get_mut(&(broker_id, message_type.to_string()))
                .and_then(VecDeque::pop_front))
        } else {
            Err(VirtualError::Disabled.into_domain())
        };
        async { result }
    }

    fn list_triggers(&self) -> impl Future<Output = Result<Vec<TriggerRecord>, BridgeError>> + Send {
        let result = Ok(self.triggers());
        async { result }
    }

    fn create_trigger(
        &self,
        trigger: NewTrigger,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let result = self.create(trigger).map_err(VirtualError::into_domain);
        async { result }
    }

    fn broker_name(
        &self,
        broker_id: BrokerId,
    ) -> impl Future<Output = Result<Option<String>, BridgeError>> + Send {
        let result = Ok(lock(&self.brokers).get(&broker_id).cloned());
        async { result }
    }

    fn publish(
        &self,
        broker_id: BrokerId,
        message: OutboundMessage,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let result = self
            .hand_over(broker_id, message)
            .map_err(VirtualError::into_domain);
        async { result }
    }
}
