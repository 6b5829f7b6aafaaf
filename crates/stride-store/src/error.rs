use http::StatusCode;
use stride_core::HttpError;
use thiserror::Error;

/// Conversation store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Conversation does not exist or is archived
    #[error("conversation not found: {conversation_id}")]
    NotFound { conversation_id: String },

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be decoded
    #[error("corrupt row: {0}")]
    Corrupt(String),

    /// Database directory could not be prepared
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl HttpError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Corrupt(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Database(_) | Self::Corrupt(_) | Self::Io(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::NotFound { .. } => "Conversation not found".to_owned(),
            Self::Database(_) | Self::Corrupt(_) | Self::Io(_) => "internal server error".to_owned(),
        }
    }
}
