use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use http::{HeaderValue, StatusCode, header};
use serde::{Deserialize, Serialize};
use stride_chat::ChatSettings;
use stride_store::{ConversationSummary, RenamedConversation};

use crate::error::ApiError;
use crate::state::AppState;
use crate::{export, sse};

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

/// Conversation and messaging routes under `/api/chat`
pub fn chat_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/chat/conversations",
            post(create_conversation).get(list_conversations),
        )
        .route(
            "/api/chat/conversations/{id}",
            get(get_conversation)
                .patch(rename_conversation)
                .delete(archive_conversation),
        )
        .route("/api/chat/conversations/{id}/messages", post(send_message))
        .route("/api/chat/conversations/{id}/export", get(export_conversation))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CreateConversationBody {
    #[serde(default)]
    title: Option<String>,
}

async fn create_conversation(
    State(state): State<AppState>,
    body: Option<Json<CreateConversationBody>>,
) -> Result<(StatusCode, Json<ConversationSummary>), ApiError> {
    let title = body.and_then(|Json(body)| body.title);
    let summary = state.store.create_conversation(title.as_deref()).await?;

    tracing::debug!(conversation_id = %summary.id, "conversation created");
    Ok((StatusCode::CREATED, Json(summary)))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<u32>,
    offset: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ListResponse {
    conversations: Vec<ConversationSummary>,
    total: u64,
    has_more: bool,
}

async fn list_conversations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);

    let page = state.store.list_conversations(limit, offset).await?;
    let seen = u64::from(offset) + page.conversations.len() as u64;

    Ok(Json(ListResponse {
        has_more: seen < page.total,
        conversations: page.conversations,
        total: page.total,
    }))
}

async fn get_conversation(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    let conversation = state.store.get_conversation(&id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(conversation).into_response())
}

#[derive(Debug, Deserialize)]
struct RenameBody {
    #[serde(default)]
    title: String,
}

async fn rename_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<RenameBody>,
) -> Result<Json<RenamedConversation>, ApiError> {
    if body.title.trim().is_empty() {
        return Err(ApiError::bad_request("title is required"));
    }

    let renamed = state
        .store
        .rename_conversation(&id, &body.title)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(renamed))
}

async fn archive_conversation(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    if state.store.archive_conversation(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

#[derive(Debug, Deserialize)]
struct SendMessageBody {
    #[serde(default)]
    content: String,
    #[serde(default)]
    settings: Option<ChatSettings>,
}

async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SendMessageBody>,
) -> Result<Response, ApiError> {
    let content = body.content.trim();
    if content.is_empty() {
        return Err(ApiError::bad_request("content is required"));
    }

    let max = state.max_message_length;
    if body.content.chars().count() > max {
        return Err(ApiError::bad_request(format!("Message too long (max {max} characters)")));
    }

    if !state.store.conversation_exists(&id).await? {
        return Err(ApiError::NotFound);
    }

    if let Some(limiter) = &state.limiter {
        limiter.check()?;
    }

    let events = state
        .orchestrator
        .spawn_exchange(id, content.to_owned(), body.settings.unwrap_or_default());

    Ok(sse::event_stream(events, state.heartbeat_interval))
}

#[derive(Debug, Deserialize)]
struct ExportQuery {
    format: Option<String>,
}

async fn export_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let conversation = state.store.get_conversation(&id).await?.ok_or(ApiError::NotFound)?;

    if query.format.as_deref().is_some_and(|format| format != "markdown") {
        return Err(ApiError::bad_request("Only format=markdown is supported"));
    }

    let body = export::markdown(&conversation, jiff::Zoned::now().date());
    let disposition = format!("attachment; filename=\"{}\"", export::filename(&conversation));

    let mut response = body.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/markdown; charset=utf-8"),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok(response)
}
