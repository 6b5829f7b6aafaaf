use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One turn of the conversation as every provider sees it
///
/// A user turn carries either typed text or the results of the tool calls
/// requested by the assistant turn right before it, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    User {
        content: UserContent,
    },
    Assistant {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
}

/// Body of a user turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserContent {
    Text(String),
    ToolResults(Vec<ToolResult>),
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::User {
            content: UserContent::Text(text.into()),
        }
    }

    pub const fn tool_results(results: Vec<ToolResult>) -> Self {
        Self::User {
            content: UserContent::ToolResults(results),
        }
    }

    /// Assistant turn; empty text is stored as `None`
    pub fn assistant(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        let content = content.into();
        Self::Assistant {
            content: (!content.is_empty()).then_some(content),
            tool_calls,
        }
    }
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Arguments, always a JSON object
    pub input: Value,
}

/// Outcome of a tool call, sent back to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub call_id: String,
    /// Tool output serialized as JSON text
    pub content: String,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    /// Result whose content is the JSON serialization of `output`
    pub fn from_output(call_id: impl Into<String>, output: &Value, is_error: bool) -> Self {
        Self {
            call_id: call_id.into(),
            content: output.to_string(),
            is_error,
        }
    }
}
