use std::time::Duration;

use thiserror::Error;

/// Errors raised while talking to a model provider
#[derive(Debug, Error)]
pub enum LlmError {
    /// Provider rejected the request or could not be reached
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Stream broke or carried a frame we could not understand
    #[error("streaming error: {0}")]
    Streaming(String),

    /// Provider went quiet for longer than the idle limit
    #[error("provider stream idle for more than {}s", .0.as_secs())]
    StreamTimeout(Duration),

    /// Provider is throttling us
    #[error("provider rate limit exceeded")]
    RateLimited {
        /// Seconds the provider asked us to wait, if it said
        retry_after: Option<u64>,
    },

    /// Provider refused our credentials
    #[error("provider rejected credentials")]
    Unauthorized,

    /// Adapter could not be constructed
    #[error("invalid provider configuration: {0}")]
    Config(String),
}

impl LlmError {
    /// Whether sending the same message again may succeed
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Upstream(_) | Self::Streaming(_) | Self::StreamTimeout(_) | Self::RateLimited { .. }
        )
    }
}
