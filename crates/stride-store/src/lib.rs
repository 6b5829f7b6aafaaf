//! Conversation persistence for stride
//!
//! [`ConversationStore`] is the seam the chat engine and HTTP routes write
//! through. [`SqliteStore`] is the durable implementation; [`MemoryStore`]
//! keeps everything in process.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

#[cfg(test)]
mod conformance;
pub mod error;
mod id;
mod memory;
mod sqlite;
mod types;

use async_trait::async_trait;

pub use error::StoreError;
pub use id::{new_conversation_id, new_message_id};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use types::{
    Conversation, ConversationPage, ConversationSummary, DEFAULT_TITLE, NewTurn, RenamedConversation, Role,
    ToolCallRecord, Turn,
};

/// Persisted conversations and their turns
///
/// Archived conversations are invisible to every read except
/// [`load_history`](Self::load_history).
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Start a conversation; blank titles fall back to [`DEFAULT_TITLE`]
    async fn create_conversation(&self, title: Option<&str>) -> Result<ConversationSummary, StoreError>;

    /// Non-archived conversations, most recently active first
    async fn list_conversations(&self, limit: u32, offset: u32) -> Result<ConversationPage, StoreError>;

    /// One non-archived conversation with its turns
    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, StoreError>;

    /// Whether a non-archived conversation exists
    async fn conversation_exists(&self, id: &str) -> Result<bool, StoreError>;

    async fn rename_conversation(&self, id: &str, title: &str) -> Result<Option<RenamedConversation>, StoreError>;

    /// Returns `false` when there was nothing to archive
    async fn archive_conversation(&self, id: &str) -> Result<bool, StoreError>;

    /// Persist a turn, assigning its id and timestamp
    async fn append_turn(&self, conversation_id: &str, turn: NewTurn) -> Result<Turn, StoreError>;

    /// All turns of a conversation in chronological order
    async fn load_history(&self, conversation_id: &str) -> Result<Vec<Turn>, StoreError>;

    /// Bump the last-activity timestamp
    async fn touch(&self, conversation_id: &str) -> Result<(), StoreError>;

    /// Cheap liveness check for the health endpoint
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Current time in the stored timestamp format
///
/// Fixed millisecond precision keeps timestamps sortable as text.
pub(crate) fn now() -> String {
    format!("{:.3}", jiff::Timestamp::now())
}

/// Preview length for conversation listings, in characters
const PREVIEW_CHARS: usize = 100;

pub(crate) fn preview(content: &str) -> String {
    content.chars().take(PREVIEW_CHARS).collect()
}

pub(crate) fn resolve_title(title: Option<&str>) -> String {
    match title.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_owned(),
        _ => DEFAULT_TITLE.to_owned(),
    }
}
