use std::net::SocketAddr;

use serde::Deserialize;

use crate::cors::CorsConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_address: Option<SocketAddr>,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub cors: Option<CorsConfig>,
    #[serde(default)]
    pub rate_limit: Option<MessageRateLimit>,
}

/// Health check endpoint configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_health_path")]
    pub path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            path: default_health_path(),
        }
    }
}

/// Limits on how many messages may be sent, shared by all clients
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageRateLimit {
    #[serde(default = "default_per_minute")]
    pub messages_per_minute: u32,
    #[serde(default = "default_per_day")]
    pub messages_per_day: u32,
}

impl Default for MessageRateLimit {
    fn default() -> Self {
        Self {
            messages_per_minute: default_per_minute(),
            messages_per_day: default_per_day(),
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_enabled() -> bool {
    true
}

fn default_health_path() -> String {
    "/health".to_string()
}

const fn default_per_minute() -> u32 {
    30
}

const fn default_per_day() -> u32 {
    500
}
