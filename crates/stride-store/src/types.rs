use serde::{Deserialize, Serialize};
use serde_json::Value;
use stride_llm::TokenUsage;

/// Title given to conversations created without one
pub const DEFAULT_TITLE: &str = "New conversation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

/// Durable trace of one tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub id: String,
    pub tool_name: String,
    pub input: Value,
    /// `None` only when the call never ran
    pub output: Option<Value>,
    pub duration_ms: Option<u64>,
    /// Older rows predate this field
    #[serde(default)]
    pub is_error: bool,
}

/// One persisted message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: String,
    pub conversation_id: String,
    pub role: Role,
    pub content: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub model: Option<String>,
    pub tokens_used: Option<TokenUsage>,
    pub created_at: String,
}

/// Turn about to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewTurn {
    pub role: Role,
    pub content: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub model: Option<String>,
    pub tokens_used: Option<TokenUsage>,
}

impl NewTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_calls: Vec::new(),
            model: None,
            tokens_used: None,
        }
    }

    pub fn assistant(
        content: impl Into<String>,
        tool_calls: Vec<ToolCallRecord>,
        model: impl Into<String>,
        tokens_used: TokenUsage,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls,
            model: Some(model.into()),
            tokens_used: Some(tokens_used),
        }
    }

    pub(crate) fn into_turn(self, id: String, conversation_id: &str, created_at: String) -> Turn {
        Turn {
            id,
            conversation_id: conversation_id.to_owned(),
            role: self.role,
            content: self.content,
            tool_calls: self.tool_calls,
            model: self.model,
            tokens_used: self.tokens_used,
            created_at,
        }
    }
}

/// Conversation with all of its turns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
    pub archived_at: Option<String>,
    pub messages: Vec<Turn>,
}

/// Listing entry for a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
    pub message_count: u64,
    /// First characters of the latest turn
    pub last_message_preview: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationPage {
    pub conversations: Vec<ConversationSummary>,
    /// Non-archived conversations across all pages
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamedConversation {
    pub id: String,
    pub title: String,
}
