//! OpenAI-compatible chat completions provider

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use stride_config::LlmConfig;
use url::Url;

use super::{ChunkStream, Provider, normalize, send_checked, sse_data};
use crate::convert::openai::{OpenAiAccumulator, build_request};
use crate::error::LlmError;
use crate::types::{ChatOptions, Message};

/// Default `OpenAI` API base URL
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Host of the first-party API, the only one known to honor `stream_options`
const OPENAI_HOST: &str = "api.openai.com";

/// Chat completions provider for `OpenAI` and compatible servers
pub struct OpenAiProvider {
    client: Client,
    base_url: Url,
    api_key: SecretString,
    max_tokens: u32,
}

impl OpenAiProvider {
    /// Create from provider configuration
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let base_url = match &config.base_url {
            Some(url) => url.clone(),
            None => Url::parse(DEFAULT_BASE_URL).map_err(|e| LlmError::Config(e.to_string()))?,
        };
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| LlmError::Config("openai provider requires an api_key".to_owned()))?;

        Ok(Self {
            client: Client::new(),
            base_url,
            api_key,
            max_tokens: config.max_tokens,
        })
    }

    /// Build the chat completions endpoint URL
    fn completions_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/chat/completions")
    }

    /// Whether to ask for a trailing usage chunk
    fn include_usage(&self) -> bool {
        self.base_url.host_str() == Some(OPENAI_HOST)
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn stream_chat(&self, messages: &[Message], options: &ChatOptions) -> Result<ChunkStream, LlmError> {
        let request = build_request(messages, options, self.max_tokens, self.include_usage());

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "opening chat completions stream"
        );

        let builder = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&request);

        let response = send_checked(builder, self.name()).await?;
        Ok(normalize(sse_data(response), OpenAiAccumulator::new()))
    }
}
