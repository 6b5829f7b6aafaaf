use std::time::Duration;

use serde::Deserialize;

/// Tuning for a single chat exchange
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Model used when neither the request nor `[llm]` picks one
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Sampling temperature when the request does not set one
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,
    /// Upper bound on model rounds per exchange
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,
    /// Wall-clock limit for one tool invocation
    #[serde(default = "default_tool_timeout", deserialize_with = "crate::duration::deserialize")]
    pub tool_timeout: Duration,
    /// Longest silence tolerated between two provider chunks
    #[serde(default = "default_stream_idle_timeout", deserialize_with = "crate::duration::deserialize")]
    pub stream_idle_timeout: Duration,
    /// Interval between SSE keep-alive comments
    #[serde(default = "default_heartbeat_interval", deserialize_with = "crate::duration::deserialize")]
    pub heartbeat_interval: Duration,
    /// Longest accepted user message, in characters
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
    /// Events buffered between an exchange and its client
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            default_temperature: default_temperature(),
            max_tool_rounds: default_max_tool_rounds(),
            tool_timeout: default_tool_timeout(),
            stream_idle_timeout: default_stream_idle_timeout(),
            heartbeat_interval: default_heartbeat_interval(),
            max_message_length: default_max_message_length(),
            event_buffer: default_event_buffer(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-6".to_string()
}

const fn default_temperature() -> f32 {
    0.7
}

const fn default_max_tool_rounds() -> usize {
    5
}

const fn default_tool_timeout() -> Duration {
    Duration::from_secs(30)
}

const fn default_stream_idle_timeout() -> Duration {
    Duration::from_secs(120)
}

const fn default_heartbeat_interval() -> Duration {
    Duration::from_secs(15)
}

const fn default_max_message_length() -> usize {
    4000
}

const fn default_event_buffer() -> usize {
    64
}
