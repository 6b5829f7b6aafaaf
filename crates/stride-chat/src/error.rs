use stride_llm::LlmError;
use stride_store::StoreError;
use thiserror::Error;

/// Failures that end an exchange early
///
/// Tool failures never show up here; they become error-flagged tool results.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Provider(#[from] LlmError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ChatError {
    /// Whether sending the same message again may succeed
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Provider(e) => e.is_retryable(),
            Self::Store(_) => false,
        }
    }
}
