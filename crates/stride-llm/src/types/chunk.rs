use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use super::ToolCall;

/// Normalized output of one streaming provider call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderChunk {
    /// Fragment of assistant text, forwarded as soon as it arrives
    TextDelta { text: String },
    /// Terminal chunk; nothing follows it
    Done(Completion),
}

/// Summary carried by the terminal `done` chunk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub stop_reason: StopReason,
    pub tokens: TokenUsage,
    pub pending_tool_calls: Vec<ToolCall>,
    pub accumulated_text: String,
}

/// Why the model stopped generating
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    #[default]
    EndTurn,
    /// The model wants tool results before it continues
    ToolUse,
    MaxTokens,
    StopSequence,
    ContentFilter,
}

impl StopReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EndTurn => "end_turn",
            Self::ToolUse => "tool_use",
            Self::MaxTokens => "max_tokens",
            Self::StopSequence => "stop_sequence",
            Self::ContentFilter => "content_filter",
        }
    }

    /// Map an Anthropic `stop_reason`
    pub fn from_anthropic(reason: &str) -> Self {
        match reason {
            "tool_use" => Self::ToolUse,
            "max_tokens" => Self::MaxTokens,
            "stop_sequence" => Self::StopSequence,
            "refusal" => Self::ContentFilter,
            _ => Self::EndTurn,
        }
    }

    /// Map an OpenAI `finish_reason`
    pub fn from_openai(reason: &str) -> Self {
        match reason {
            "tool_calls" | "function_call" => Self::ToolUse,
            "length" => Self::MaxTokens,
            "content_filter" => Self::ContentFilter,
            _ => Self::EndTurn,
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input and output token counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input: u32,
    pub output: u32,
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.input = self.input.saturating_add(rhs.input);
        self.output = self.output.saturating_add(rhs.output);
    }
}
