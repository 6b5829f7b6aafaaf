use serde::{Deserialize, Serialize};
use serde_json::Value;
use stride_llm::{StopReason, TokenUsage};
use stride_store::Role;

/// Error code sent when an exchange fails after the stream opened
pub const ERROR_CODE_ORCHESTRATION: &str = "orchestration_error";

/// Event sent to the client during one exchange
///
/// `message_start` comes first and exactly one of `message_end` or `error`
/// comes last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    MessageStart {
        id: String,
        role: Role,
        model: String,
    },
    ContentDelta {
        text: String,
    },
    ToolUseStart {
        id: String,
        tool_name: String,
        input: Value,
    },
    ToolResult {
        id: String,
        output: Value,
        duration_ms: u64,
    },
    MessageEnd {
        id: String,
        tokens_used: TokenUsage,
        stop_reason: StopReason,
    },
    Error {
        code: String,
        message: String,
        retryable: bool,
    },
}

impl StreamEvent {
    pub fn error(code: impl Into<String>, message: impl Into<String>, retryable: bool) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
            retryable,
        }
    }

    /// Value of the `type` tag, used as the SSE event name
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MessageStart { .. } => "message_start",
            Self::ContentDelta { .. } => "content_delta",
            Self::ToolUseStart { .. } => "tool_use_start",
            Self::ToolResult { .. } => "tool_result",
            Self::MessageEnd { .. } => "message_end",
            Self::Error { .. } => "error",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::MessageEnd { .. } | Self::Error { .. })
    }
}
