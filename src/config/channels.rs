//! Channel and consumer group names

use serde::Deserialize;

use super::error::ValidationError;

/// Channel configuration
///
/// Each event representation travels on its own channel and is consumed by
/// its own consumer group.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelsConfig {
    /// Channel for immutable `UserEvent`s
    #[serde(default = "default_immutable_events")]
    pub immutable_events: String,

    /// Channel for mutable `UserEventDraft`s
    #[serde(default = "default_mutable_events")]
    pub mutable_events: String,

    /// Channel reserved for side-by-side comparison runs
    #[serde(default = "default_comparison_events")]
    pub comparison_events: String,

    /// Consumer group reading `immutable_events`
    #[serde(default = "default_immutable_group")]
    pub immutable_group: String,

    /// Consumer group reading `mutable_events`
    #[serde(default = "default_mutable_group")]
    pub mutable_group: String,
}

impl ChannelsConfig {
    /// Validate channel configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let channels = [
            ("immutable_events", &self.immutable_events),
            ("mutable_events", &self.mutable_events),
            ("comparison_events", &self.comparison_events),
        ];
        for (name, value) in channels {
            if value.trim().is_empty() {
                return Err(ValidationError::EmptyChannelName(name));
            }
        }
        if self.immutable_events == self.mutable_events {
            return Err(ValidationError::DuplicateChannelName(
                self.immutable_events.clone(),
            ));
        }

        for (name, value) in [
            ("immutable_group", &self.immutable_group),
            ("mutable_group", &self.mutable_group),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::EmptyGroupId(name));
            }
        }
        Ok(())
    }
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            immutable_events: default_immutable_events(),
            mutable_events: default_mutable_events(),
            comparison_events: default_comparison_events(),
            immutable_group: default_immutable_group(),
            mutable_group: default_mutable_group(),
        }
    }
}

fn default_immutable_events() -> String {
    "user-events.immutable".to_string()
}

fn default_mutable_events() -> String {
    "user-events.mutable".to_string()
}

fn default_comparison_events() -> String {
    "user-events.comparison".to_string()
}

fn default_immutable_group() -> String {
    "immutable-consumer-group".to_string()
}

fn default_mutable_group() -> String {
    "mutable-consumer-group".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_defaults() {
        let config = ChannelsConfig::default();
        assert_eq!(config.immutable_events, "user-events.immutable");
        assert_eq!(config.mutable_events, "user-events.mutable");
        assert_eq!(config.comparison_events, "user-events.comparison");
        assert_eq!(config.immutable_group, "immutable-consumer-group");
        assert_eq!(config.mutable_group, "mutable-consumer-group");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_channel_rejected() {
        let config = ChannelsConfig {
            mutable_events: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::EmptyChannelName("mutable_events"))
        );
    }

    #[test]
    fn test_shared_channel_rejected() {
        let config = ChannelsConfig {
            mutable_events: "user-events.immutable".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::DuplicateChannelName(
                "user-events.immutable".to_string()
            ))
        );
    }

    #[test]
    fn test_empty_group_rejected() {
        let config = ChannelsConfig {
            immutable_group: String::new(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::EmptyGroupId("immutable_group"))
        );
    }
}
