//! Topic paths and topic filters.
//!
//! Bus topics follow `<namespace>/<address>/<category>/<name>`. Trigger rules
//! select topics with a list of positional filters serialised as
//! `"Match: <segment>"` or `"Any: "`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DecodeError;

/// Topic separator used by the bus.
pub const SEPARATOR: char = '/';

/// Segments a device topic must carry: namespace, address, category, name.
pub const MIN_SEGMENTS: usize = 4;

/// Category of topics carrying device status reports.
pub const STATUS_CATEGORY: &str = "status";

/// Category of topics carrying commands to a device.
pub const COMMAND_CATEGORY: &str = "command";

/// A decoded device topic with at least [`MIN_SEGMENTS`] segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPath {
    parts: Vec<String>,
}

impl TopicPath {
    /// Wrap already split topic segments.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::TooFewSegments`] for fewer than four segments.
    pub fn from_parts(parts: Vec<String>) -> Result<Self, DecodeError> {
        if parts.len() < MIN_SEGMENTS {
            return Err(DecodeError::TooFewSegments {
                expected: MIN_SEGMENTS,
                actual: parts.len(),
            });
        }
        Ok(Self { parts })
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.parts[0]
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.parts[1]
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.parts[2]
    }

    /// The status (or command) name. Segments past the fourth are not part of it.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.parts[3]
    }

    #[must_use]
    pub fn is_status(&self) -> bool {
        self.category() == STATUS_CATEGORY
    }
}

impl FromStr for TopicPath {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_parts(s.split(SEPARATOR).map(str::to_string).collect())
    }
}

impl fmt::Display for TopicPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parts.join("/"))
    }
}

/// One positional filter of a trigger's match list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicFilter {
    /// The segment must equal this value exactly.
    Match(String),
    /// Any segment is accepted.
    Any,
}

impl TopicFilter {
    #[must_use]
    pub fn matches(&self, segment: &str) -> bool {
        match self {
            Self::Match(expected) => expected == segment,
            Self::Any => true,
        }
    }
}

impl fmt::Display for TopicFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Match(segment) => write!(f, "Match: {segment}"),
            Self::Any => f.write_str("Any: "),
        }
    }
}

impl FromStr for TopicFilter {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(segment) = s.strip_prefix("Match: ") {
            return Ok(Self::Match(segment.to_string()));
        }
        if s.trim_end() == "Any:" {
            return Ok(Self::Any);
        }
        Err(DecodeError::InvalidFilter(s.to_string()))
    }
}

impl Serialize for TopicFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TopicFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Ordered filter list; matches when every filter accepts the segment at its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchSpec(pub Vec<TopicFilter>);

impl MatchSpec {
    /// `[Match <namespace>, Any, Match status]`, every status report under the namespace.
    #[must_use]
    pub fn status_reports(namespace: &str) -> Self {
        Self(vec![
            TopicFilter::Match(namespace.to_string()),
            TopicFilter::Any,
            TopicFilter::Match(STATUS_CATEGORY.to_string()),
        ])
    }

    #[must_use]
    pub fn matches<S: AsRef<str>>(&self, parts: &[S]) -> bool {
        parts.len() >= self.0.len()
            && self
                .0
                .iter()
                .zip(parts)
                .all(|(filter, part)| filter.matches(part.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_split_topic_into_named_segments() {
        let topic: TopicPath = "ratgdo/garage1/status/door".parse().unwrap();
        assert_eq!(topic.namespace(), "ratgdo");
        assert_eq!(topic.address(), "garage1");
        assert_eq!(topic.category(), "status");
        assert_eq!(topic.name(), "door");
        assert!(topic.is_status());
    }

    #[test]
    fn should_reject_topic_with_three_segments() {
        let err = "ratgdo/garage1/status".parse::<TopicPath>().unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TooFewSegments {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn should_keep_extra_segments_out_of_name() {
        let topic: TopicPath = "ratgdo/garage1/status/door/raw".parse().unwrap();
        assert_eq!(topic.name(), "door");
        assert_eq!(topic.to_string(), "ratgdo/garage1/status/door/raw");
    }

    #[test]
    fn should_parse_filter_strings() {
        assert_eq!(
            "Match: ratgdo".parse::<TopicFilter>().unwrap(),
            TopicFilter::Match("ratgdo".to_string())
        );
        assert_eq!("Any: ".parse::<TopicFilter>().unwrap(), TopicFilter::Any);
        assert!("Prefix: x".parse::<TopicFilter>().is_err());
    }

    #[test]
    fn should_serialize_status_spec_as_filter_strings() {
        let json = serde_json::to_value(MatchSpec::status_reports("ratgdo")).unwrap();
        assert_eq!(
            json,
            serde_json::json!(["Match: ratgdo", "Any: ", "Match: status"])
        );
    }

    #[test]
    fn should_match_status_topics_only() {
        let filters = MatchSpec::status_reports("ratgdo");
        assert!(filters.matches(&["ratgdo", "garage1", "status", "door"]));
        assert!(!filters.matches(&["ratgdo", "garage1", "command", "door"]));
        assert!(!filters.matches(&["other", "garage1", "status", "door"]));
        assert!(!filters.matches(&["ratgdo", "garage1"]));
    }
}
