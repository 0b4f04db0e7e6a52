//! Realtime vote stream configuration.

use serde::{Deserialize, Serialize};

/// Realtime (SSE) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Per-connection outbound buffer.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Heartbeat interval in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// A connection whose last heartbeat is older than this is evicted.
    #[serde(default = "default_stale_after")]
    pub stale_after_seconds: u64,
    /// Interval between stale-connection sweeps in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Maximum problem subscriptions per connection.
    #[serde(default = "default_max_subscriptions")]
    pub max_subscriptions_per_connection: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            ping_interval_seconds: default_ping_interval(),
            stale_after_seconds: default_stale_after(),
            sweep_interval_seconds: default_sweep_interval(),
            max_subscriptions_per_connection: default_max_subscriptions(),
        }
    }
}

fn default_channel_buffer() -> usize {
    64
}

fn default_ping_interval() -> u64 {
    30
}

fn default_stale_after() -> u64 {
    60
}

fn default_sweep_interval() -> u64 {
    30
}

fn default_max_subscriptions() -> usize {
    50
}
