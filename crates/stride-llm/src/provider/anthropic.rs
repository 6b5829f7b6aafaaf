//! Anthropic Messages API provider

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use stride_config::LlmConfig;
use url::Url;

use super::{ChunkStream, Provider, normalize, send_checked, sse_data};
use crate::convert::anthropic::{AnthropicAccumulator, build_request};
use crate::error::LlmError;
use crate::types::{ChatOptions, Message};

/// Default Anthropic API base URL
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Anthropic API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API provider
pub struct AnthropicProvider {
    client: Client,
    base_url: Url,
    api_key: SecretString,
    max_tokens: u32,
}

impl AnthropicProvider {
    /// Create from provider configuration
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let base_url = match &config.base_url {
            Some(url) => url.clone(),
            None => Url::parse(DEFAULT_BASE_URL).map_err(|e| LlmError::Config(e.to_string()))?,
        };
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| LlmError::Config("anthropic provider requires an api_key".to_owned()))?;

        Ok(Self {
            client: Client::new(),
            base_url,
            api_key,
            max_tokens: config.max_tokens,
        })
    }

    /// Build the messages endpoint URL
    fn messages_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/messages")
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn stream_chat(&self, messages: &[Message], options: &ChatOptions) -> Result<ChunkStream, LlmError> {
        let request = build_request(messages, options, self.max_tokens);

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "opening anthropic stream"
        );

        let builder = self
            .client
            .post(self.messages_url())
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request);

        let response = send_checked(builder, self.name()).await?;
        Ok(normalize(sse_data(response), AnthropicAccumulator::new()))
    }
}
