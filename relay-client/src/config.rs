use std::time::Duration;

use relay_core::config::RelayAppConfig;

/// Client synchronization settings, derived from the application config.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Poll schedule as offsets from the send.
    pub poll_delays: Vec<Duration>,
    /// Pending optimistic entries older than this are treated as orphaned.
    pub stale_after: Duration,
    /// Delay before the catch-up fetch triggered by an unmatched push
    /// update.
    pub push_catchup_delay: Duration,
    pub sender_base_url: Option<String>,
    pub read_api_base_url: Option<String>,
}

impl ClientConfig {
    pub fn from_app_config(app: &RelayAppConfig) -> Self {
        Self {
            poll_delays: app
                .client
                .poll_delays_ms
                .iter()
                .copied()
                .map(Duration::from_millis)
                .collect(),
            stale_after: Duration::from_millis(app.client.stale_after_ms),
            push_catchup_delay: Duration::from_millis(app.client.push_catchup_delay_ms),
            sender_base_url: app.client.sender_base_url.clone(),
            read_api_base_url: app.client.read_api_base_url.clone(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_app_config(&RelayAppConfig::default())
    }
}
