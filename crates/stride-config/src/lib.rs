#![allow(clippy::must_use_candidate)]

pub mod chat;
pub mod cors;
mod duration;
mod env;
pub mod llm;
mod loader;
pub mod mcp;
pub mod server;
pub mod store;
pub mod telemetry;

use serde::Deserialize;

pub use chat::*;
pub use cors::*;
pub use llm::*;
pub use mcp::*;
pub use server::*;
pub use store::*;
pub use telemetry::*;

/// Top-level stride configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Model provider configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Chat exchange tuning
    #[serde(default)]
    pub chat: ChatConfig,
    /// Conversation storage
    #[serde(default)]
    pub store: StoreConfig,
    /// MCP servers exposing tools
    #[serde(default)]
    pub mcp: McpConfig,
    /// Logging and trace export
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
