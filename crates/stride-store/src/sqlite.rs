use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use stride_config::StoreConfig;
use stride_llm::TokenUsage;

use crate::types::{
    Conversation, ConversationPage, ConversationSummary, NewTurn, RenamedConversation, Role, ToolCallRecord, Turn,
};
use crate::{
    ConversationStore, StoreError, new_conversation_id, new_message_id, now, preview, resolve_title,
};

/// Schema, applied idempotently on open
const SCHEMA: [&str; 4] = [
    r"
    CREATE TABLE IF NOT EXISTS conversations (
        id          TEXT PRIMARY KEY,
        title       TEXT NOT NULL,
        created_at  TEXT NOT NULL,
        updated_at  TEXT NOT NULL,
        archived_at TEXT
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_conversations_updated_at
        ON conversations (updated_at)
    ",
    r"
    CREATE TABLE IF NOT EXISTS messages (
        id              TEXT PRIMARY KEY,
        conversation_id TEXT NOT NULL REFERENCES conversations (id),
        role            TEXT NOT NULL CHECK (role IN ('user', 'assistant', 'system')),
        content         TEXT NOT NULL,
        tool_calls      TEXT NOT NULL DEFAULT '[]',
        model           TEXT,
        tokens_used     TEXT,
        created_at      TEXT NOT NULL
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_messages_conversation_id
        ON messages (conversation_id)
    ",
];

/// `SQLite` conversation store
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the configured database and apply the schema
    pub async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let pool = if config.is_in_memory() {
            // Every connection would get its own empty database
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true))
                .await?
        } else {
            if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }

            let options = SqliteConnectOptions::new()
                .filename(&config.path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .foreign_keys(true);

            SqlitePoolOptions::new().max_connections(5).connect_with(options).await?
        };

        let store = Self { pool };
        store.migrate().await?;

        tracing::info!(path = %config.path.display(), "conversation store ready");
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn turns(&self, conversation_id: &str) -> Result<Vec<Turn>, StoreError> {
        let rows = sqlx::query(
            r"
            SELECT id, conversation_id, role, content, tool_calls, model, tokens_used, created_at
            FROM messages
            WHERE conversation_id = ?
            ORDER BY created_at ASC, rowid ASC
            ",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(turn_from_row).collect()
    }
}

fn turn_from_row(row: &SqliteRow) -> Result<Turn, StoreError> {
    let role: String = row.get("role");
    let tool_calls: String = row.get("tool_calls");
    let tokens_used: Option<String> = row.get("tokens_used");

    Ok(Turn {
        id: row.get("id"),
        conversation_id: row.get("conversation_id"),
        role: Role::parse(&role).ok_or_else(|| StoreError::Corrupt(format!("unknown role '{role}'")))?,
        content: row.get("content"),
        tool_calls: serde_json::from_str::<Vec<ToolCallRecord>>(&tool_calls)
            .map_err(|e| StoreError::Corrupt(format!("tool_calls: {e}")))?,
        model: row.get("model"),
        tokens_used: tokens_used
            .map(|raw| serde_json::from_str::<TokenUsage>(&raw))
            .transpose()
            .map_err(|e| StoreError::Corrupt(format!("tokens_used: {e}")))?,
        created_at: row.get("created_at"),
    })
}

fn count(row: &SqliteRow, column: &str) -> u64 {
    u64::try_from(row.get::<i64, _>(column)).unwrap_or_default()
}

fn encode<T: serde::Serialize>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Corrupt(e.to_string()))
}

#[async_trait]
impl ConversationStore for SqliteStore {
    async fn create_conversation(&self, title: Option<&str>) -> Result<ConversationSummary, StoreError> {
        let id = new_conversation_id();
        let title = resolve_title(title);
        let timestamp = now();

        sqlx::query("INSERT INTO conversations (id, title, created_at, updated_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(&title)
            .bind(&timestamp)
            .bind(&timestamp)
            .execute(&self.pool)
            .await?;

        Ok(ConversationSummary {
            id,
            title,
            created_at: timestamp.clone(),
            updated_at: timestamp,
            message_count: 0,
            last_message_preview: None,
        })
    }

    async fn list_conversations(&self, limit: u32, offset: u32) -> Result<ConversationPage, StoreError> {
        let total = sqlx::query("SELECT COUNT(*) AS count FROM conversations WHERE archived_at IS NULL")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(
            r"
            SELECT c.id, c.title, c.created_at, c.updated_at,
                   COUNT(m.id) AS message_count,
                   (SELECT m2.content FROM messages m2
                    WHERE m2.conversation_id = c.id
                    ORDER BY m2.created_at DESC, m2.rowid DESC LIMIT 1) AS last_message
            FROM conversations c
            LEFT JOIN messages m ON m.conversation_id = c.id
            WHERE c.archived_at IS NULL
            GROUP BY c.id
            ORDER BY c.updated_at DESC
            LIMIT ? OFFSET ?
            ",
        )
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await?;

        let conversations = rows
            .iter()
            .map(|r| ConversationSummary {
                id: r.get("id"),
                title: r.get("title"),
                created_at: r.get("created_at"),
                updated_at: r.get("updated_at"),
                message_count: count(r, "message_count"),
                last_message_preview: r.get::<Option<String>, _>("last_message").map(|m| preview(&m)),
            })
            .collect();

        Ok(ConversationPage {
            conversations,
            total: count(&total, "count"),
        })
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, StoreError> {
        let row = sqlx::query(
            r"
            SELECT id, title, created_at, updated_at, archived_at
            FROM conversations
            WHERE id = ? AND archived_at IS NULL
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(Conversation {
            id: row.get("id"),
            title: row.get("title"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            archived_at: row.get("archived_at"),
            messages: self.turns(id).await?,
        }))
    }

    async fn conversation_exists(&self, id: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM conversations WHERE id = ? AND archived_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn rename_conversation(&self, id: &str, title: &str) -> Result<Option<RenamedConversation>, StoreError> {
        let title = title.trim();

        let result = sqlx::query("UPDATE conversations SET title = ?, updated_at = ? WHERE id = ? AND archived_at IS NULL")
            .bind(title)
            .bind(now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok((result.rows_affected() > 0).then(|| RenamedConversation {
            id: id.to_owned(),
            title: title.to_owned(),
        }))
    }

    async fn archive_conversation(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE conversations SET archived_at = ? WHERE id = ? AND archived_at IS NULL")
            .bind(now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn append_turn(&self, conversation_id: &str, turn: NewTurn) -> Result<Turn, StoreError> {
        let turn = turn.into_turn(new_message_id(), conversation_id, now());
        let tool_calls = encode(&turn.tool_calls)?;
        let tokens_used = turn.tokens_used.as_ref().map(encode).transpose()?;

        let inserted = sqlx::query(
            r"
            INSERT INTO messages (id, conversation_id, role, content, tool_calls, model, tokens_used, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&turn.id)
        .bind(conversation_id)
        .bind(turn.role.as_str())
        .bind(&turn.content)
        .bind(&tool_calls)
        .bind(turn.model.as_deref())
        .bind(tokens_used.as_deref())
        .bind(&turn.created_at)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(turn),
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => Err(StoreError::NotFound {
                conversation_id: conversation_id.to_owned(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn load_history(&self, conversation_id: &str) -> Result<Vec<Turn>, StoreError> {
        self.turns(conversation_id).await
    }

    async fn touch(&self, conversation_id: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE conversations SET updated_at = ? WHERE id = ?")
            .bind(now())
            .bind(conversation_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
