//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),

    #[error("Partition count must be between 1 and 1024")]
    InvalidPartitionCount,

    #[error("In-memory transport is not allowed in production")]
    InMemoryTransportInProduction,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Redis block interval must be between 1 and 60000 ms")]
    InvalidBlockInterval,

    #[error("Redis read count must be at least 1")]
    InvalidReadCount,

    #[error("Redis max_len must be at least 1 when set")]
    InvalidMaxLen,

    #[error("Channel name must not be empty: {0}")]
    EmptyChannelName(&'static str),

    #[error("Channel used for more than one event representation: {0}")]
    DuplicateChannelName(String),

    #[error("Consumer group must not be empty: {0}")]
    EmptyGroupId(&'static str),
}
