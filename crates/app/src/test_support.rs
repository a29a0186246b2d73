//! In-memory port fakes shared by the unit tests of this crate.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use ratgdo_domain::action::OutboundMessage;
use ratgdo_domain::device::GarageDevice;
use ratgdo_domain::error::BridgeError;
use ratgdo_domain::id::{BrokerId, DeviceId};
use ratgdo_domain::trigger::{NewTrigger, TOPIC_MATCH_TRIGGER, TriggerRecord};

pub(crate) struct FakeConnector {
    pub(crate) enabled: AtomicBool,
    pub(crate) fail_list: AtomicBool,
    pub(crate) fail_create: AtomicBool,
    pub(crate) fail_fetch: AtomicBool,
    pub(crate) queues: Mutex<HashMap<(BrokerId, String), VecDeque<serde_json::Value>>>,
    pub(crate) triggers: Mutex<Vec<TriggerRecord>>,
    pub(crate) published: Mutex<Vec<(BrokerId, OutboundMessage)>>,
    pub(crate) fetch_calls: Mutex<usize>,
}

impl Default for FakeConnector {
    fn default() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            fail_list: AtomicBool::new(false),
            fail_create: AtomicBool::new(false),
            fail_fetch: AtomicBool::new(false),
            queues: Mutex::new(HashMap::new()),
            triggers: Mutex::new(Vec::new()),
            published: Mutex::new(Vec::new()),
            fetch_calls: Mutex::new(0),
        }
    }
}

impl FakeConnector {
    pub(crate) fn enqueue(&self, broker_id: BrokerId, message_type: &str, raw: serde_json::Value) {
        self.queues
            .lock()
            .unwrap()
            .entry((broker_id, message_type.to_string()))
            .or_default()
            .push_back(raw);
    }

    pub(crate) fn enqueue_status(&self, broker_id: BrokerId, parts: [&str; 4], payload: &str) {
        self.enqueue(
            broker_id,
            "##ratgdo##",
            serde_json::json!({"topic_parts": parts, "payload": payload}),
        );
    }

    pub(crate) fn queued(&self, broker_id: BrokerId, message_type: &str) -> usize {
        self.queues
            .lock()
            .unwrap()
            .get(&(broker_id, message_type.to_string()))
            .map_or(0, VecDeque::len)
    }

    pub(crate) fn published(&self) -> Vec<(BrokerId, OutboundMessage)> {
        self.published.lock().unwrap().clone()
    }

    pub(crate) fn trigger_count(&self) -> usize {
        self.triggers.lock().unwrap().len()
    }
}

fn failure(message: &str) -> BridgeError {
    BridgeError::Connector(Box::new(std::io::Error::other(message.to_string())))
}

impl crate::ports::BrokerConnector for FakeConnector {
    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn fetch_queued_message(
        &self,
        broker_id: BrokerId,
        message_type: &str,
    ) -> impl Future<Output = Result<Option<serde_json::Value>, BridgeError>> + Send {
        *self.fetch_calls.lock().unwrap() += 1;
        let result = if self.fail_fetch.load(Ordering::SeqCst) {
            Err(failure("fetch failed"))
        } else {
            Ok(self
                .queues
                .lock()
                .unwrap()
                .get_mut(&(broker_id, message_type.to_string()))
                .and_then(VecDeque::pop_front))
        };
        async { result }
    }

    fn list_triggers(&self) -> impl Future<Output = Result<Vec<TriggerRecord>, BridgeError>> + Send {
        let result = if self.fail_list.load(Ordering::SeqCst) {
            Err(failure("list failed"))
        } else {
            Ok(self.triggers.lock().unwrap().clone())
        };
        async { result }
    }

    fn create_trigger(
        &self,
        trigger: NewTrigger,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let result = if self.fail_create.load(Ordering::SeqCst) {
            Err(failure("create failed"))
        } else {
            self.triggers.lock().unwrap().push(TriggerRecord {
                name: trigger.name,
                trigger_type: TOPIC_MATCH_TRIGGER.to_string(),
                props: serde_json::to_value(&trigger.rule).unwrap(),
            });
            Ok(())
        };
        async { result }
    }

    fn broker_name(
        &self,
        _broker_id: BrokerId,
    ) -> impl Future<Output = Result<Option<String>, BridgeError>> + Send {
        async { Ok(Some("home".to_string())) }
    }

    fn publish(
        &self,
        broker_id: BrokerId,
        message: OutboundMessage,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        self.published.lock().unwrap().push((broker_id, message));
        async { Ok(()) }
    }
}

#[derive(Default)]
pub(crate) struct InMemoryDevices {
    pub(crate) store: Mutex<HashMap<DeviceId, GarageDevice>>,
    pub(crate) updates: Mutex<usize>,
}

impl InMemoryDevices {
    pub(crate) fn insert(&self, device: GarageDevice) {
        self.store.lock().unwrap().insert(device.id, device);
    }

    pub(crate) fn get(&self, id: DeviceId) -> GarageDevice {
        self.store.lock().unwrap()[&id].clone()
    }

    pub(crate) fn update_count(&self) -> usize {
        *self.updates.lock().unwrap()
    }
}

impl crate::ports::DeviceRepository for InMemoryDevices {
    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<GarageDevice>, BridgeError>> + Send {
        let result = self.store.lock().unwrap().get(&id).cloned();
        async { Ok(result) }
    }

    fn update(
        &self,
        device: GarageDevice,
    ) -> impl Future<Output = Result<GarageDevice, BridgeError>> + Send {
        *self.updates.lock().unwrap() += 1;
        self.store.lock().unwrap().insert(device.id, device.clone());
        async { Ok(device) }
    }
}

pub(crate) fn garage(address: &str, broker_id: BrokerId) -> GarageDevice {
    GarageDevice::builder()
        .name(format!("Garage {address}"))
        .address(address)
        .broker_id(broker_id)
        .build()
        .unwrap()
}
