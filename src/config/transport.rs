//! Transport configuration (channel provider selection)

use serde::Deserialize;

use super::error::ValidationError;
use super::runtime::Environment;

const MAX_PARTITIONS: u32 = 1024;

/// Transport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    /// Channel provider
    #[serde(default)]
    pub kind: TransportKind,

    /// Partitions per channel
    #[serde(default = "default_partitions")]
    pub partitions: u32,
}

/// Channel provider
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// In-process channel, nothing leaves the process
    #[default]
    InMemory,
    /// Redis Streams
    Redis,
}

impl TransportConfig {
    pub fn uses_redis(&self) -> bool {
        self.kind == TransportKind::Redis
    }

    /// Validate transport configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.partitions == 0 || self.partitions > MAX_PARTITIONS {
            return Err(ValidationError::InvalidPartitionCount);
        }
        if *environment == Environment::Production && self.kind == TransportKind::InMemory {
            return Err(ValidationError::InMemoryTransportInProduction);
        }
        Ok(())
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::default(),
            partitions: default_partitions(),
        }
    }
}

fn default_partitions() -> u32 {
    3
}
