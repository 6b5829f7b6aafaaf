use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Model provider configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// Wire protocol spoken by the provider
    #[serde(default)]
    pub provider: LlmProviderType,
    /// API key for authentication
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override (required for OpenAI-compatible endpoints)
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Model used when a message does not pick one
    #[serde(default)]
    pub model: Option<String>,
    /// Completion token ceiling per round
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderType::default(),
            api_key: None,
            base_url: None,
            model: None,
            max_tokens: default_max_tokens(),
        }
    }
}

/// Supported provider protocols
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProviderType {
    /// Anthropic Messages API
    #[default]
    Anthropic,
    /// OpenAI-compatible chat completions API
    #[serde(alias = "openai-compat", alias = "openai_compat")]
    Openai,
}

impl LlmProviderType {
    /// Name used in logs and health output
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::Openai => "openai",
        }
    }
}

const fn default_max_tokens() -> u32 {
    4096
}
