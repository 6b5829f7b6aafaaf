//! Behavior every store must share, run against each implementation

use std::time::Duration;

use serde_json::json;
use stride_llm::TokenUsage;

use crate::{ConversationStore, DEFAULT_TITLE, NewTurn, Role, StoreError, ToolCallRecord};

/// Keeps millisecond timestamps apart
async fn tick() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

pub async fn create_and_list(store: &dyn ConversationStore) {
    let untitled = store.create_conversation(None).await.unwrap();
    assert_eq!(untitled.title, DEFAULT_TITLE);
    assert!(untitled.id.starts_with("conv_"));
    assert_eq!(untitled.message_count, 0);

    let blank = store.create_conversation(Some("   ")).await.unwrap();
    assert_eq!(blank.title, DEFAULT_TITLE);

    tick().await;
    let named = store.create_conversation(Some("  Marathon prep ")).await.unwrap();
    assert_eq!(named.title, "Marathon prep");

    let page = store.list_conversations(2, 0).await.unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.conversations.len(), 2);
    assert_eq!(page.conversations[0].id, named.id);

    let rest = store.list_conversations(2, 2).await.unwrap();
    assert_eq!(rest.conversations.len(), 1);
}

pub async fn turns_round_trip_in_order(store: &dyn ConversationStore) {
    let conversation = store.create_conversation(None).await.unwrap();

    let user = store
        .append_turn(&conversation.id, NewTurn::user("How far did I run this year?"))
        .await
        .unwrap();
    assert!(user.id.starts_with("msg_"));
    assert_eq!(user.role, Role::User);

    let record = ToolCallRecord {
        id: "tc_1".to_owned(),
        tool_name: "list_activities".to_owned(),
        input: json!({"year": 2025}),
        output: Some(json!({"activities": []})),
        duration_ms: Some(12),
        is_error: false,
    };
    store
        .append_turn(
            &conversation.id,
            NewTurn::assistant(
                "You have no runs yet.",
                vec![record.clone()],
                "claude-sonnet-4-6",
                TokenUsage { input: 120, output: 40 },
            ),
        )
        .await
        .unwrap();

    let history = store.load_history(&conversation.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].content, "How far did I run this year?");
    assert!(history[0].tool_calls.is_empty());
    assert_eq!(history[0].tokens_used, None);
    assert_eq!(history[1].role, Role::Assistant);
    assert_eq!(history[1].tool_calls, vec![record]);
    assert_eq!(history[1].model.as_deref(), Some("claude-sonnet-4-6"));
    assert_eq!(history[1].tokens_used, Some(TokenUsage { input: 120, output: 40 }));

    let page = store.list_conversations(10, 0).await.unwrap();
    assert_eq!(page.conversations[0].message_count, 2);
    assert_eq!(
        page.conversations[0].last_message_preview.as_deref(),
        Some("You have no runs yet.")
    );

    let loaded = store.get_conversation(&conversation.id).await.unwrap().unwrap();
    assert_eq!(loaded.messages, history);
}

pub async fn rename_and_archive(store: &dyn ConversationStore) {
    let conversation = store.create_conversation(None).await.unwrap();

    let renamed = store
        .rename_conversation(&conversation.id, " Zone 2 ")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.title, "Zone 2");
    assert!(store.rename_conversation("conv_missing", "x").await.unwrap().is_none());

    assert!(store.conversation_exists(&conversation.id).await.unwrap());
    assert!(store.archive_conversation(&conversation.id).await.unwrap());
    assert!(!store.archive_conversation(&conversation.id).await.unwrap());

    assert!(!store.conversation_exists(&conversation.id).await.unwrap());
    assert!(store.get_conversation(&conversation.id).await.unwrap().is_none());
    assert!(store.rename_conversation(&conversation.id, "again").await.unwrap().is_none());
    assert_eq!(store.list_conversations(10, 0).await.unwrap().total, 0);
}

pub async fn touch_reorders_listing(store: &dyn ConversationStore) {
    let first = store.create_conversation(Some("first")).await.unwrap();
    tick().await;
    let second = store.create_conversation(Some("second")).await.unwrap();

    let page = store.list_conversations(10, 0).await.unwrap();
    assert_eq!(page.conversations[0].id, second.id);

    tick().await;
    store.touch(&first.id).await.unwrap();

    let page = store.list_conversations(10, 0).await.unwrap();
    assert_eq!(page.conversations[0].id, first.id);
    assert!(page.conversations[0].updated_at > first.updated_at);
}

pub async fn append_to_unknown_conversation_fails(store: &dyn ConversationStore) {
    let err = store
        .append_turn("conv_missing", NewTurn::user("hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
    assert!(store.load_history("conv_missing").await.unwrap().is_empty());
}
