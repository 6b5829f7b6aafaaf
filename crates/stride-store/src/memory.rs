use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::types::{Conversation, ConversationPage, ConversationSummary, NewTurn, RenamedConversation, Turn};
use crate::{ConversationStore, StoreError, new_conversation_id, new_message_id, now, preview, resolve_title};

#[derive(Debug)]
struct Record {
    id: String,
    title: String,
    created_at: String,
    updated_at: String,
    archived_at: Option<String>,
    turns: Vec<Turn>,
}

impl Record {
    fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
            message_count: self.turns.len() as u64,
            last_message_preview: self.turns.last().map(|t| preview(&t.content)),
        }
    }

    const fn is_live(&self) -> bool {
        self.archived_at.is_none()
    }
}

/// In-process store for tests and throwaway deployments
#[derive(Debug, Default)]
pub struct MemoryStore {
    conversations: RwLock<HashMap<String, Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn create_conversation(&self, title: Option<&str>) -> Result<ConversationSummary, StoreError> {
        let timestamp = now();
        let record = Record {
            id: new_conversation_id(),
            title: resolve_title(title),
            created_at: timestamp.clone(),
            updated_at: timestamp,
            archived_at: None,
            turns: Vec::new(),
        };
        let summary = record.summary();

        self.conversations.write().await.insert(record.id.clone(), record);
        Ok(summary)
    }

    async fn list_conversations(&self, limit: u32, offset: u32) -> Result<ConversationPage, StoreError> {
        let conversations = self.conversations.read().await;

        let mut live: Vec<&Record> = conversations.values().filter(|r| r.is_live()).collect();
        live.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        Ok(ConversationPage {
            total: live.len() as u64,
            conversations: live
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .map(Record::summary)
                .collect(),
        })
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, StoreError> {
        let conversations = self.conversations.read().await;

        Ok(conversations.get(id).filter(|r| r.is_live()).map(|r| Conversation {
            id: r.id.clone(),
            title: r.title.clone(),
            created_at: r.created_at.clone(),
            updated_at: r.updated_at.clone(),
            archived_at: None,
            messages: r.turns.clone(),
        }))
    }

    async fn conversation_exists(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.conversations.read().await.get(id).is_some_and(Record::is_live))
    }

    async fn rename_conversation(&self, id: &str, title: &str) -> Result<Option<RenamedConversation>, StoreError> {
        let mut conversations = self.conversations.write().await;

        let Some(record) = conversations.get_mut(id).filter(|r| r.is_live()) else {
            return Ok(None);
        };
        record.title = title.trim().to_owned();
        record.updated_at = now();

        Ok(Some(RenamedConversation {
            id: record.id.clone(),
            title: record.title.clone(),
        }))
    }

    async fn archive_conversation(&self, id: &str) -> Result<bool, StoreError> {
        let mut conversations = self.conversations.write().await;

        match conversations.get_mut(id).filter(|r| r.is_live()) {
            Some(record) => {
                record.archived_at = Some(now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn append_turn(&self, conversation_id: &str, turn: NewTurn) -> Result<Turn, StoreError> {
        let mut conversations = self.conversations.write().await;

        let record = conversations
            .get_mut(conversation_id)
            .ok_or_else(|| StoreError::NotFound {
                conversation_id: conversation_id.to_owned(),
            })?;

        let turn = turn.into_turn(new_message_id(), conversation_id, now());
        record.turns.push(turn.clone());
        Ok(turn)
    }

    async fn load_history(&self, conversation_id: &str) -> Result<Vec<Turn>, StoreError> {
        Ok(self
            .conversations
            .read()
            .await
            .get(conversation_id)
            .map(|r| r.turns.clone())
            .unwrap_or_default())
    }

    async fn touch(&self, conversation_id: &str) -> Result<(), StoreError> {
        if let Some(record) = self.conversations.write().await.get_mut(conversation_id) {
            record.updated_at = now();
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
