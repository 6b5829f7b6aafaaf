//! Programmatic configuration builder for integration tests

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use secrecy::SecretString;
use stride_config::{
    ChatConfig, Config, CorsConfig, HealthConfig, LlmConfig, LlmProviderType, McpServerConfig, MessageRateLimit,
    ServerConfig, StdioConfig, StoreConfig,
};

/// Model name every mock-backed config uses
pub const MOCK_MODEL: &str = "mock-model";

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// In-memory store, health enabled, no provider yet
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig {
                        enabled: true,
                        ..HealthConfig::default()
                    },
                    ..ServerConfig::default()
                },
                store: StoreConfig {
                    path: stride_config::IN_MEMORY.into(),
                },
                ..Config::default()
            },
        }
    }

    /// Point an Anthropic-protocol provider at a mock backend
    pub fn with_anthropic(self, base_url: &str) -> Self {
        self.with_provider(LlmProviderType::Anthropic, base_url)
    }

    /// Point an OpenAI-compatible provider at a mock backend
    pub fn with_openai(self, base_url: &str) -> Self {
        self.with_provider(LlmProviderType::Openai, base_url)
    }

    fn with_provider(mut self, provider: LlmProviderType, base_url: &str) -> Self {
        self.config.llm = LlmConfig {
            provider,
            api_key: Some(SecretString::from("test-key".to_owned())),
            base_url: Some(base_url.parse().expect("valid URL")),
            model: Some(MOCK_MODEL.to_owned()),
            ..LlmConfig::default()
        };
        self
    }

    /// Adjust the chat engine settings
    pub fn with_chat(mut self, update: impl FnOnce(&mut ChatConfig)) -> Self {
        update(&mut self.config.chat);
        self
    }

    /// Tool calls give up after `timeout`
    pub fn with_tool_timeout(self, timeout: Duration) -> Self {
        self.with_chat(|chat| chat.tool_timeout = timeout)
    }

    /// Set the message rate limit
    pub fn with_rate_limit(mut self, messages_per_minute: u32, messages_per_day: u32) -> Self {
        self.config.server.rate_limit = Some(MessageRateLimit {
            messages_per_minute,
            messages_per_day,
        });
        self
    }

    /// Set CORS configuration
    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = Some(config);
        self
    }

    /// Register a stdio MCP server that cannot be started
    pub fn with_broken_mcp_server(mut self, name: &str) -> Self {
        self.config.mcp.servers.insert(
            name.to_owned(),
            McpServerConfig::Stdio(StdioConfig {
                command: "stride-test-no-such-binary".to_owned(),
                args: Vec::new(),
                env: HashMap::new(),
                cwd: None,
            }),
        );
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
