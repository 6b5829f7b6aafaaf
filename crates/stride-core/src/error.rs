use http::StatusCode;
use serde::Serialize;

/// Domain error that knows how it should look over HTTP
///
/// Each crate's error enum implements this so the server can render it
/// without the domain crates depending on axum.
pub trait HttpError: std::error::Error {
    /// Status code for the response
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error kind (e.g. `not_found`)
    fn error_type(&self) -> &str;

    /// Message safe to show a client
    fn client_message(&self) -> String;

    /// JSON body for this error
    fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.error_type().to_owned(),
            message: self.client_message(),
        }
    }
}

/// Wire shape of every non-streaming error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("conversation missing")]
    struct Missing;

    impl HttpError for Missing {
        fn status_code(&self) -> StatusCode {
            StatusCode::NOT_FOUND
        }

        fn error_type(&self) -> &str {
            "not_found"
        }

        fn client_message(&self) -> String {
            "Conversation not found".to_owned()
        }
    }

    #[test]
    fn body_uses_type_and_client_message() {
        let body = serde_json::to_value(Missing.body()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"error": "not_found", "message": "Conversation not found"})
        );
    }
}
