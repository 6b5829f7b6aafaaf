//! Mock model backend for integration tests
//!
//! Serves scripted replies as Anthropic (`/v1/messages`) or OpenAI
//! (`/v1/chat/completions`) SSE streams and records every request body.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use futures_util::{StreamExt, stream};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// One scripted model turn
#[derive(Debug, Clone)]
pub enum Reply {
    /// Stream text and stop with `end_turn`
    Text(String),
    /// Stream optional text, then request one tool call
    ToolUse {
        text: String,
        id: String,
        name: String,
        input: Value,
    },
    /// Answer with a non-success status
    Status(u16),
    /// Start a stream and then go quiet
    Stall(Duration),
}

impl Reply {
    pub fn text(text: &str) -> Self {
        Self::Text(text.to_owned())
    }

    pub fn tool_use(id: &str, name: &str, input: Value) -> Self {
        Self::ToolUse {
            text: String::new(),
            id: id.to_owned(),
            name: name.to_owned(),
            input,
        }
    }
}

/// Mock backend that replays scripted replies in order
pub struct MockLlm {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<Value>>,
}

impl MockLlm {
    /// Start the mock server with the replies it should give, in order
    pub async fn start(replies: Vec<Reply>) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/messages", routing::post(handle_anthropic))
            .route("/v1/chat/completions", routing::post(handle_openai))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as a provider
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Request bodies received so far
    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl Drop for MockLlm {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl MockState {
    fn next(&self, body: Value) -> Reply {
        self.requests.lock().unwrap().push(body);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Reply::text("no more scripted replies"))
    }
}

async fn handle_anthropic(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    match state.next(body) {
        Reply::Text(text) => sse(anthropic_text(&text)),
        Reply::ToolUse { text, id, name, input } => sse(anthropic_tool_use(&text, &id, &name, &input)),
        Reply::Status(code) => status(code),
        Reply::Stall(quiet) => stall(
            format!(
                "event: message_start\ndata: {}\n\n",
                json!({"type": "message_start", "message": {"usage": {"input_tokens": 1}}})
            ),
            quiet,
        ),
    }
}

async fn handle_openai(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    match state.next(body) {
        Reply::Text(text) => sse(openai_text(&text)),
        Reply::ToolUse { text, id, name, input } => sse(openai_tool_use(&text, &id, &name, &input)),
        Reply::Status(code) => status(code),
        Reply::Stall(quiet) => stall(
            format!("data: {}\n\n", json!({"choices": [{"index": 0, "delta": {"role": "assistant"}}]})),
            quiet,
        ),
    }
}

fn anthropic_text(text: &str) -> String {
    let mut events = vec![
        json!({"type": "message_start", "message": {"id": "msg_mock", "usage": {"input_tokens": 10, "output_tokens": 1}}}),
        json!({"type": "content_block_start", "index": 0, "content_block": {"type": "text", "text": ""}}),
    ];
    for piece in text.split_inclusive(' ') {
        events.push(json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": piece}}));
    }
    events.extend([
        json!({"type": "content_block_stop", "index": 0}),
        json!({"type": "message_delta", "delta": {"stop_reason": "end_turn"}, "usage": {"output_tokens": 5}}),
        json!({"type": "message_stop"}),
    ]);

    anthropic_frames(&events)
}

fn anthropic_tool_use(text: &str, id: &str, name: &str, input: &Value) -> String {
    let arguments = input.to_string();
    let (head, tail) = arguments.split_at(arguments.len() / 2);

    let mut events = vec![json!({"type": "message_start", "message": {"id": "msg_mock", "usage": {"input_tokens": 12, "output_tokens": 1}}})];
    let mut index = 0;
    if !text.is_empty() {
        events.extend([
            json!({"type": "content_block_start", "index": 0, "content_block": {"type": "text", "text": ""}}),
            json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": text}}),
            json!({"type": "content_block_stop", "index": 0}),
        ]);
        index = 1;
    }
    events.extend([
        json!({"type": "content_block_start", "index": index, "content_block": {"type": "tool_use", "id": id, "name": name, "input": {}}}),
        json!({"type": "content_block_delta", "index": index, "delta": {"type": "input_json_delta", "partial_json": head}}),
        json!({"type": "content_block_delta", "index": index, "delta": {"type": "input_json_delta", "partial_json": tail}}),
        json!({"type": "content_block_stop", "index": index}),
        json!({"type": "message_delta", "delta": {"stop_reason": "tool_use"}, "usage": {"output_tokens": 7}}),
        json!({"type": "message_stop"}),
    ]);

    anthropic_frames(&events)
}

fn anthropic_frames(events: &[Value]) -> String {
    events
        .iter()
        .map(|event| format!("event: {}\ndata: {event}\n\n", event["type"].as_str().unwrap_or("unknown")))
        .collect()
}

fn openai_text(text: &str) -> String {
    let mut chunks = vec![json!({"choices": [{"index": 0, "delta": {"role": "assistant", "content": ""}}]})];
    for piece in text.split_inclusive(' ') {
        chunks.push(json!({"choices": [{"index": 0, "delta": {"content": piece}}]}));
    }
    chunks.push(json!({"choices": [{"index": 0, "delta": {}, "finish_reason": "stop"}]}));
    chunks.push(json!({"choices": [], "usage": {"prompt_tokens": 10, "completion_tokens": 5}}));

    openai_frames(&chunks)
}

fn openai_tool_use(text: &str, id: &str, name: &str, input: &Value) -> String {
    let arguments = input.to_string();
    let (head, tail) = arguments.split_at(arguments.len() / 2);

    let mut chunks = Vec::new();
    if !text.is_empty() {
        chunks.push(json!({"choices": [{"index": 0, "delta": {"role": "assistant", "content": text}}]}));
    }
    chunks.extend([
        json!({"choices": [{"index": 0, "delta": {"tool_calls": [{"index": 0, "id": id, "type": "function", "function": {"name": name, "arguments": head}}]}}]}),
        json!({"choices": [{"index": 0, "delta": {"tool_calls": [{"index": 0, "function": {"arguments": tail}}]}}]}),
        json!({"choices": [{"index": 0, "delta": {}, "finish_reason": "tool_calls"}]}),
        json!({"choices": [], "usage": {"prompt_tokens": 12, "completion_tokens": 7}}),
    ]);

    openai_frames(&chunks)
}

fn openai_frames(chunks: &[Value]) -> String {
    let mut body: String = chunks.iter().map(|chunk| format!("data: {chunk}\n\n")).collect();
    body.push_str("data: [DONE]\n\n");
    body
}

fn sse(body: String) -> Response {
    ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
}

fn status(code: u16) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = json!({"type": "error", "error": {"type": "mock_error", "message": "scripted failure"}});

    (status, Json(body)).into_response()
}

fn stall(first_frame: String, quiet: Duration) -> Response {
    let frames = stream::once(async move { Ok::<_, Infallible>(first_frame) }).chain(stream::once(async move {
        tokio::time::sleep(quiet).await;
        Ok(String::new())
    }));

    ([(header::CONTENT_TYPE, "text/event-stream")], Body::from_stream(frames)).into_response()
}
