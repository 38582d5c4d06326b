//! Configuration management for the ticketing application.
//!
//! Loads configuration from environment variables with sensible defaults.
//! A missing or malformed value falls back to its default.

use optimistic_runtime::StoreConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Runtime store configuration
    pub store: StoreSettings,
    /// Reconciliation configuration
    pub reconcile: ReconcileConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Runtime store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Capacity of each store's action broadcast channel (default: 16)
    pub broadcast_capacity: usize,
    /// How long to wait for a send's effects to finish, in milliseconds (default: 5000)
    pub settle_timeout_ms: u64,
    /// Graceful shutdown timeout in seconds (default: 30)
    pub shutdown_timeout: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
            settle_timeout_ms: 5_000,
            shutdown_timeout: 30,
        }
    }
}

/// Reconciliation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Drop responses superseded by a later request (default: true)
    pub sequence_requests: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            sequence_requests: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directives
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "ticketing=info,optimistic_runtime=info".to_string(),
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key).and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | variable                       | default                                  |
    /// |--------------------------------|------------------------------------------|
    /// | `STORE_BROADCAST_CAPACITY`     | 16                                       |
    /// | `STORE_SETTLE_TIMEOUT_MS`      | 5000                                     |
    /// | `STORE_SHUTDOWN_TIMEOUT`       | 30                                       |
    /// | `OPTIMISTIC_SEQUENCE_REQUESTS` | true                                     |
    /// | `RUST_LOG`                     | `ticketing=info,optimistic_runtime=info` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let store = StoreSettings::default();
        let reconcile = ReconcileConfig::default();
        let logging = LoggingConfig::default();

        Self {
            store: StoreSettings {
                broadcast_capacity: parsed(&lookup, "STORE_BROADCAST_CAPACITY", store.broadcast_capacity)
                    .max(1),
                settle_timeout_ms: parsed(&lookup, "STORE_SETTLE_TIMEOUT_MS", store.settle_timeout_ms),
                shutdown_timeout: parsed(&lookup, "STORE_SHUTDOWN_TIMEOUT", store.shutdown_timeout),
            },
            reconcile: ReconcileConfig {
                sequence_requests: parsed(
                    &lookup,
                    "OPTIMISTIC_SEQUENCE_REQUESTS",
                    reconcile.sequence_requests,
                ),
            },
            logging: LoggingConfig {
                filter: lookup("RUST_LOG")
                    .filter(|filter| !filter.trim().is_empty())
                    .unwrap_or(logging.filter),
            },
        }
    }

    /// Store configuration for every resource store
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::default()
            .with_broadcast_capacity(self.store.broadcast_capacity)
            .with_shutdown_timeout(Duration::from_secs(self.store.shutdown_timeout))
    }

    /// How long to wait for a send's effects to finish
    #[must_use]
    pub const fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.store.settle_timeout_ms)
    }
}
