//! Topic matcher: decides which active devices a status topic targets.

use ratgdo_domain::topic::TopicPath;

use crate::registry::DeviceBinding;

/// An active device addressed by a status topic, and the status it reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceMatch<'a> {
    pub device: &'a DeviceBinding,
    pub status: &'a str,
}

/// Yield every active device whose address equals the topic's address
/// segment, provided the topic is a status report.
///
/// The broker the message arrived on plays no part. No match is the normal
/// case for traffic aimed at controllers this host does not know. More than
/// one match means duplicate addresses; all of them are returned.
#[must_use]
pub fn match_topic<'a>(topic: &'a TopicPath, active: &'a [DeviceBinding]) -> Vec<DeviceMatch<'a>> {
    active
        .iter()
        .filter(|device| device.address == topic.address())
        .filter(|_| topic.is_status())
        .map(|device| DeviceMatch {
            device,
            status: topic.name(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratgdo_domain::id::{BrokerId, DeviceId};

    fn binding(address: &str, broker_id: BrokerId) -> DeviceBinding {
        DeviceBinding {
            device_id: DeviceId::new(),
            address: address.to_string(),
            broker_id,
        }
    }

    fn topic(s: &str) -> TopicPath {
        s.parse().unwrap()
    }

    #[test]
    fn should_match_device_by_address() {
        let broker = BrokerId::new();
        let active = vec![binding("garage1", broker), binding("garage2", broker)];
        let topic = topic("ratgdo/garage2/status/door");

        let matches = match_topic(&topic, &active);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].device, &active[1]);
        assert_eq!(matches[0].status, "door");
    }

    #[test]
    fn should_skip_non_status_category() {
        let broker = BrokerId::new();
        let active = vec![binding("garage1", broker)];
        let topic = topic("ratgdo/garage1/command/door");
        assert!(match_topic(&topic, &active).is_empty());
    }

    #[test]
    fn should_return_nothing_for_unknown_address() {
        let broker = BrokerId::new();
        let active = vec![binding("garage1", broker)];
        let topic = topic("ratgdo/shed/status/door");
        assert!(match_topic(&topic, &active).is_empty());
    }

    #[test]
    fn should_match_by_address_whatever_the_device_broker() {
        let active = vec![binding("garage1", BrokerId::new())];
        let topic = topic("ratgdo/garage1/status/door");
        let matches = match_topic(&topic, &active);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].device, &active[0]);
        assert_eq!(matches[0].status, "door");
    }

    #[test]
    fn should_fan_out_to_duplicate_addresses() {
        let broker = BrokerId::new();
        let active = vec![binding("garage1", broker), binding("garage1", broker)];
        let topic = topic("ratgdo/garage1/status/light");
        let matches = match_topic(&topic, &active);
        assert_eq!(matches.len(), 2);
        assert_ne!(matches[0].device.device_id, matches[1].device.device_id);
    }
}
