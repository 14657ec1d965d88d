//! Application configuration.
//!
//! One TOML file configures every relay service; each crate derives its own
//! view from [`RelayAppConfig`]. The file path comes from the `RELAY_CONFIG`
//! environment variable; absent that, built-in defaults apply.

use std::env;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global application config, initialized once.
static APP_CONFIG: OnceLock<RelayAppConfig> = OnceLock::new();

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RelayAppConfig {
    #[serde(default)]
    pub store: StoreServiceConfig,
    #[serde(default)]
    pub client: ClientSyncConfig,
    /// Present only when the store ingests from Kafka instead of the
    /// in-process bus.
    #[serde(default)]
    pub kafka: Option<KafkaClusterConfig>,
}

/// Store server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreServiceConfig {
    /// Backoff before an unacknowledged event is redelivered, in millis.
    #[serde(default = "default_redelivery_backoff_ms")]
    pub redelivery_backoff_ms: u64,
}

impl Default for StoreServiceConfig {
    fn default() -> Self {
        Self {
            redelivery_backoff_ms: default_redelivery_backoff_ms(),
        }
    }
}

/// Client-side synchronization settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSyncConfig {
    /// Poll schedule as offsets from the send, in millis.
    #[serde(default = "default_poll_delays_ms")]
    pub poll_delays_ms: Vec<u64>,
    /// Optimistic entries older than this are treated as orphaned and
    /// dropped from the merged view, in millis.
    #[serde(default = "default_stale_after_ms")]
    pub stale_after_ms: u64,
    /// Delay before the one catch-up fetch triggered by an unmatched push
    /// update, in millis.
    #[serde(default = "default_push_catchup_delay_ms")]
    pub push_catchup_delay_ms: u64,
    #[serde(default)]
    pub sender_base_url: Option<String>,
    #[serde(default)]
    pub read_api_base_url: Option<String>,
}

impl Default for ClientSyncConfig {
    fn default() -> Self {
        Self {
            poll_delays_ms: default_poll_delays_ms(),
            stale_after_ms: default_stale_after_ms(),
            push_catchup_delay_ms: default_push_catchup_delay_ms(),
            sender_base_url: None,
            read_api_base_url: None,
        }
    }
}

/// Kafka cluster settings for the delivery-status topic.
#[derive(Debug, Clone, Deserialize)]
pub struct KafkaClusterConfig {
    pub bootstrap_servers: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default = "default_event_topic")]
    pub topic: String,
    #[serde(default = "default_consumer_group")]
    pub consumer_group: String,
}

fn default_redelivery_backoff_ms() -> u64 {
    250
}

fn default_poll_delays_ms() -> Vec<u64> {
    vec![300, 600, 800, 1200]
}

fn default_stale_after_ms() -> u64 {
    2500
}

fn default_push_catchup_delay_ms() -> u64 {
    300
}

fn default_event_topic() -> String {
    "sms-events".to_string()
}

fn default_consumer_group() -> String {
    "relay-store".to_string()
}

impl RelayAppConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Load from the path in `RELAY_CONFIG` when set, defaults otherwise.
    pub fn load() -> Result<Self> {
        match env::var("RELAY_CONFIG") {
            Ok(path) => Self::load_from_path(path),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Global config, loading it on first access. Load failures fall back to
    /// defaults with a warning; a malformed file must not keep the ingestor
    /// down.
    pub fn global() -> &'static RelayAppConfig {
        APP_CONFIG.get_or_init(|| {
            RelayAppConfig::load().unwrap_or_else(|err| {
                tracing::warn!(error = %err, "failed to load configuration, using defaults");
                RelayAppConfig::default()
            })
        })
    }
}
