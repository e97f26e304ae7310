//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `USER_EVENTS` prefix and nested values use double underscores as separators.
//! Every setting has a default, so an empty environment yields a runnable
//! in-memory setup.
//!
//! # Example
//!
//! ```no_run
//! use user_events::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Publishing to {}", config.channels.immutable_events);
//! ```

mod channels;
mod error;
mod redis;
mod runtime;
mod transport;

pub use channels::ChannelsConfig;
pub use error::{ConfigError, ValidationError};
pub use redis::RedisConfig;
pub use runtime::{Environment, LogFormat, RuntimeConfig};
pub use transport::{TransportConfig, TransportKind};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Runtime configuration (environment, logging)
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Transport configuration (provider, partitions)
    #[serde(default)]
    pub transport: TransportConfig,

    /// Redis configuration, used when `transport.kind = redis`
    #[serde(default)]
    pub redis: RedisConfig,

    /// Channel and consumer group names
    #[serde(default)]
    pub channels: ChannelsConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `USER_EVENTS` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `USER_EVENTS__TRANSPORT__KIND=redis` -> `transport.kind = redis`
    /// - `USER_EVENTS__REDIS__URL=...` -> `redis.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("USER_EVENTS")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// The Redis section is only checked when Redis is the selected
    /// transport.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.runtime.validate()?;
        self.transport.validate(&self.runtime.environment)?;
        if self.transport.uses_redis() {
            self.redis.validate()?;
        }
        self.channels.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.runtime.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "USER_EVENTS__RUNTIME__ENVIRONMENT",
        "USER_EVENTS__RUNTIME__LOG_FORMAT",
        "USER_EVENTS__TRANSPORT__KIND",
        "USER_EVENTS__TRANSPORT__PARTITIONS",
        "USER_EVENTS__REDIS__URL",
        "USER_EVENTS__REDIS__MAX_LEN",
        "USER_EVENTS__CHANNELS__IMMUTABLE_EVENTS",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_defaults_from_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.transport.kind, TransportKind::InMemory);
        assert_eq!(config.transport.partitions, 3);
        assert_eq!(config.channels.immutable_events, "user-events.immutable");
        assert_eq!(config.runtime.environment, Environment::Development);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_redis_transport() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("USER_EVENTS__TRANSPORT__KIND", "redis");
        env::set_var("USER_EVENTS__TRANSPORT__PARTITIONS", "6");
        env::set_var("USER_EVENTS__REDIS__URL", "redis://localhost:6379");
        env::set_var("USER_EVENTS__REDIS__MAX_LEN", "10000");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.transport.uses_redis());
        assert_eq!(config.transport.partitions, 6);
        assert_eq!(config.redis.url, "redis://localhost:6379");
        assert_eq!(config.redis.max_len, Some(10_000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_redis_transport_requires_url() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("USER_EVENTS__TRANSPORT__KIND", "redis");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("USER_EVENTS__REDIS__URL"))
        );
    }

    #[test]
    fn test_custom_channel_and_json_logs() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("USER_EVENTS__CHANNELS__IMMUTABLE_EVENTS", "audit.logins");
        env::set_var("USER_EVENTS__RUNTIME__LOG_FORMAT", "json");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.channels.immutable_events, "audit.logins");
        assert_eq!(config.runtime.log_format, LogFormat::Json);
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("USER_EVENTS__RUNTIME__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert_eq!(
            config.validate(),
            Err(ValidationError::InMemoryTransportInProduction)
        );
    }
}
