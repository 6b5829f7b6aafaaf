use std::sync::Arc;
use std::time::Instant;

use futures_util::{Stream, StreamExt, stream};
use serde::Deserialize;
use stride_config::ChatConfig;
use stride_llm::{
    ChatOptions, ChunkStream, Completion, LlmError, Message, Provider, ProviderChunk, StopReason, TokenUsage, ToolResult,
};
use stride_store::{ConversationStore, NewTurn, Role, ToolCallRecord, Turn, new_message_id};
use stride_tools::ToolExecutor;
use tokio::sync::mpsc;
use tracing::Instrument;

use crate::error::ChatError;
use crate::event::{ERROR_CODE_ORCHESTRATION, StreamEvent};
use crate::prompt::system_prompt;
use crate::reconstruct::reconstruct;

/// Per-message overrides sent by the client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatSettings {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// Writing end of an exchange's event channel
///
/// Sends after the client went away are dropped; the exchange carries on.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<StreamEvent>,
}

impl EventSink {
    pub const fn new(tx: mpsc::Sender<StreamEvent>) -> Self {
        Self { tx }
    }

    pub async fn emit(&self, event: StreamEvent) {
        if self.tx.send(event).await.is_err() {
            tracing::trace!("client disconnected, dropping event");
        }
    }
}

/// Totals carried across the rounds of one exchange
#[derive(Debug, Default)]
struct Accumulated {
    text: String,
    tool_calls: Vec<ToolCallRecord>,
    tokens: TokenUsage,
    stop_reason: StopReason,
}

/// Drives exchanges between the user, the model and the tools
pub struct Orchestrator {
    provider: Arc<dyn Provider>,
    tools: ToolExecutor,
    store: Arc<dyn ConversationStore>,
    config: ChatConfig,
    default_model: String,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: ToolExecutor,
        store: Arc<dyn ConversationStore>,
        config: ChatConfig,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            tools,
            store,
            config,
            default_model: default_model.into(),
        }
    }

    /// Run one exchange, writing its events to `sink`
    ///
    /// Returns the persisted assistant turn. On error nothing past the user
    /// turn is persisted and no terminal event has been written; the caller
    /// owns reporting the failure.
    pub async fn orchestrate(
        &self,
        conversation_id: &str,
        user_content: &str,
        settings: &ChatSettings,
        sink: &EventSink,
    ) -> Result<Turn, ChatError> {
        let message_id = new_message_id();
        let model = settings.model.clone().unwrap_or_else(|| self.default_model.clone());

        sink.emit(StreamEvent::MessageStart {
            id: message_id.clone(),
            role: Role::Assistant,
            model: model.clone(),
        })
        .await;

        let history = self.store.load_history(conversation_id).await?;
        let mut messages = reconstruct(&history);
        messages.push(Message::user(user_content));

        self.store
            .append_turn(conversation_id, NewTurn::user(user_content))
            .await?;

        let options = ChatOptions {
            model: model.clone(),
            temperature: settings.temperature.unwrap_or(self.config.default_temperature),
            system: system_prompt(),
            tools: self.tools.catalog().tools(),
            max_tokens: None,
        };

        let mut acc = Accumulated::default();

        for round in 1..=self.config.max_tool_rounds {
            let completion = self.stream_round(&messages, &options, sink).await?;

            acc.text.push_str(&completion.accumulated_text);
            acc.tokens += completion.tokens;
            acc.stop_reason = completion.stop_reason;

            tracing::debug!(
                round,
                stop_reason = %completion.stop_reason,
                tool_calls = completion.pending_tool_calls.len(),
                "round finished"
            );

            if completion.stop_reason != StopReason::ToolUse || completion.pending_tool_calls.is_empty() {
                break;
            }

            let results = self.dispatch_tools(&completion, &mut acc, sink).await;

            messages.push(Message::assistant(
                completion.accumulated_text,
                completion.pending_tool_calls,
            ));
            messages.push(Message::tool_results(results));

            if round == self.config.max_tool_rounds {
                tracing::warn!(rounds = round, "tool round limit reached");
            }
        }

        let turn = self
            .store
            .append_turn(
                conversation_id,
                NewTurn::assistant(acc.text, acc.tool_calls, model, acc.tokens),
            )
            .await?;
        self.store.touch(conversation_id).await?;

        sink.emit(StreamEvent::MessageEnd {
            id: message_id,
            tokens_used: acc.tokens,
            stop_reason: acc.stop_reason,
        })
        .await;

        Ok(turn)
    }

    /// Stream one model call, forwarding text as it arrives
    async fn stream_round(
        &self,
        messages: &[Message],
        options: &ChatOptions,
        sink: &EventSink,
    ) -> Result<Completion, ChatError> {
        let idle = self.config.stream_idle_timeout;

        let mut chunks: ChunkStream = tokio::time::timeout(idle, self.provider.stream_chat(messages, options))
            .await
            .map_err(|_| LlmError::StreamTimeout(idle))??;

        loop {
            let next = tokio::time::timeout(idle, chunks.next())
                .await
                .map_err(|_| LlmError::StreamTimeout(idle))?;

            match next {
                Some(Ok(ProviderChunk::TextDelta { text })) => {
                    sink.emit(StreamEvent::ContentDelta { text }).await;
                }
                Some(Ok(ProviderChunk::Done(completion))) => return Ok(completion),
                Some(Err(e)) => return Err(e.into()),
                None => {
                    return Err(LlmError::Streaming("provider stream ended without a done chunk".to_owned()).into());
                }
            }
        }
    }

    /// Run the round's tool calls one after another, in request order
    async fn dispatch_tools(
        &self,
        completion: &Completion,
        acc: &mut Accumulated,
        sink: &EventSink,
    ) -> Vec<ToolResult> {
        let mut results = Vec::with_capacity(completion.pending_tool_calls.len());

        for call in &completion.pending_tool_calls {
            sink.emit(StreamEvent::ToolUseStart {
                id: call.id.clone(),
                tool_name: call.name.clone(),
                input: call.input.clone(),
            })
            .await;

            let invocation = self.tools.invoke(&call.name, call.input.clone()).await;

            sink.emit(StreamEvent::ToolResult {
                id: call.id.clone(),
                output: invocation.output.clone(),
                duration_ms: invocation.duration_ms,
            })
            .await;

            results.push(ToolResult::from_output(
                call.id.clone(),
                &invocation.output,
                invocation.is_error,
            ));
            acc.tool_calls.push(ToolCallRecord {
                id: call.id.clone(),
                tool_name: call.name.clone(),
                input: call.input.clone(),
                output: Some(invocation.output),
                duration_ms: Some(invocation.duration_ms),
                is_error: invocation.is_error,
            });
        }

        results
    }

    /// Run an exchange on its own task and stream its events
    ///
    /// The task outlives the returned stream, so a client that disconnects
    /// never interrupts a round. Failures end the stream with an
    /// `orchestration_error` event.
    pub fn spawn_exchange(
        self: &Arc<Self>,
        conversation_id: String,
        content: String,
        settings: ChatSettings,
    ) -> impl Stream<Item = StreamEvent> + Send + 'static {
        let (tx, rx) = mpsc::channel(self.config.event_buffer);
        let this = Arc::clone(self);
        let span = tracing::info_span!("exchange", conversation_id = %conversation_id);

        tokio::spawn(
            async move {
                let sink = EventSink::new(tx);
                let started = Instant::now();

                match this.orchestrate(&conversation_id, &content, &settings, &sink).await {
                    Ok(turn) => tracing::info!(
                        message_id = %turn.id,
                        tool_calls = turn.tool_calls.len(),
                        elapsed = ?started.elapsed(),
                        "exchange complete"
                    ),
                    Err(e) => {
                        tracing::error!(error = %e, retryable = e.is_retryable(), "chat orchestration failed");
                        sink.emit(StreamEvent::error(ERROR_CODE_ORCHESTRATION, e.to_string(), true))
                            .await;
                    }
                }
            }
            .instrument(span),
        );

        stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|event| (event, rx)) })
    }
}
