//! Canonical messages to Anthropic requests, Anthropic stream to chunks

use std::collections::BTreeMap;

use super::{StreamAccumulator, parse_arguments};
use crate::error::LlmError;
use crate::protocol::anthropic::{
    AnthropicContent, AnthropicContentBlock, AnthropicMessage, AnthropicRequest, AnthropicStreamContentBlock,
    AnthropicStreamDelta, AnthropicStreamEvent, AnthropicTool,
};
use crate::types::{ChatOptions, Completion, Message, ProviderChunk, StopReason, TokenUsage, ToolCall, UserContent};

/// Build a streaming request
pub fn build_request(messages: &[Message], options: &ChatOptions, default_max_tokens: u32) -> AnthropicRequest {
    AnthropicRequest {
        model: options.model.clone(),
        max_tokens: options.max_tokens.unwrap_or(default_max_tokens),
        system: (!options.system.is_empty()).then(|| options.system.clone()),
        messages: messages.iter().filter_map(to_wire_message).collect(),
        temperature: options.temperature,
        tools: options
            .tools
            .iter()
            .map(|tool| AnthropicTool {
                name: tool.name.clone(),
                description: tool.description.clone(),
                input_schema: tool.input_schema.clone(),
            })
            .collect(),
        stream: true,
    }
}

/// Map one message to the wire, or `None` when it has nothing to send
///
/// Anthropic rejects assistant turns with empty content, so a reply that
/// produced neither text nor tool calls is left out of the history.
fn to_wire_message(message: &Message) -> Option<AnthropicMessage> {
    let wire = match message {
        Message::User {
            content: UserContent::Text(text),
        } => AnthropicMessage {
            role: "user",
            content: AnthropicContent::Text(text.clone()),
        },
        // All results of a round share one user turn
        Message::User {
            content: UserContent::ToolResults(results),
        } => AnthropicMessage {
            role: "user",
            content: AnthropicContent::Blocks(
                results
                    .iter()
                    .map(|r| AnthropicContentBlock::ToolResult {
                        tool_use_id: r.call_id.clone(),
                        content: r.content.clone(),
                        is_error: r.is_error,
                    })
                    .collect(),
            ),
        },
        Message::Assistant { content, tool_calls } if tool_calls.is_empty() => {
            let text = content.as_deref().filter(|t| !t.is_empty())?;
            AnthropicMessage {
                role: "assistant",
                content: AnthropicContent::Text(text.to_owned()),
            }
        }
        Message::Assistant { content, tool_calls } => {
            let text = content
                .iter()
                .filter(|t| !t.is_empty())
                .map(|t| AnthropicContentBlock::Text { text: t.clone() });
            let calls = tool_calls.iter().map(|call| AnthropicContentBlock::ToolUse {
                id: call.id.clone(),
                name: call.name.clone(),
                input: call.input.clone(),
            });

            AnthropicMessage {
                role: "assistant",
                content: AnthropicContent::Blocks(text.chain(calls).collect()),
            }
        }
    };

    Some(wire)
}

/// Tool call whose input is still arriving
#[derive(Debug, Default)]
struct PendingToolUse {
    id: String,
    name: String,
    input_json: String,
}

/// Accumulates one Anthropic message stream
///
/// Tool inputs are buffered per content block index, since text and tool
/// blocks share one index space.
#[derive(Debug, Default)]
pub struct AnthropicAccumulator {
    text: String,
    tool_uses: BTreeMap<u32, PendingToolUse>,
    tokens: TokenUsage,
    stop_reason: Option<StopReason>,
    finished: bool,
}

impl AnthropicAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    fn text_delta(&mut self, text: &str) -> Vec<ProviderChunk> {
        if text.is_empty() {
            return Vec::new();
        }
        self.text.push_str(text);
        vec![ProviderChunk::TextDelta { text: text.to_owned() }]
    }
}

impl StreamAccumulator for AnthropicAccumulator {
    fn push(&mut self, data: &str) -> Result<Vec<ProviderChunk>, LlmError> {
        let event: AnthropicStreamEvent = serde_json::from_str(data)
            .map_err(|e| LlmError::Streaming(format!("malformed Anthropic event: {e}")))?;

        let chunks = match event {
            AnthropicStreamEvent::MessageStart { message } => {
                if let Some(usage) = message.usage {
                    self.tokens.input = usage.input_tokens;
                }
                Vec::new()
            }

            AnthropicStreamEvent::ContentBlockStart { index, content_block } => match content_block {
                AnthropicStreamContentBlock::Text { text } => self.text_delta(&text),
                AnthropicStreamContentBlock::ToolUse { id, name } => {
                    self.tool_uses.insert(
                        index,
                        PendingToolUse {
                            id,
                            name,
                            input_json: String::new(),
                        },
                    );
                    Vec::new()
                }
                AnthropicStreamContentBlock::Other => Vec::new(),
            },

            AnthropicStreamEvent::ContentBlockDelta { index, delta } => match delta {
                AnthropicStreamDelta::TextDelta { text } => self.text_delta(&text),
                AnthropicStreamDelta::InputJsonDelta { partial_json } => {
                    match self.tool_uses.get_mut(&index) {
                        Some(pending) => pending.input_json.push_str(&partial_json),
                        None => tracing::debug!(index, "input delta for unknown content block"),
                    }
                    Vec::new()
                }
                AnthropicStreamDelta::Other => Vec::new(),
            },

            AnthropicStreamEvent::MessageDelta { delta, usage } => {
                if let Some(reason) = delta.stop_reason {
                    self.stop_reason = Some(StopReason::from_anthropic(&reason));
                }
                if let Some(usage) = usage {
                    self.tokens.output = usage.output_tokens;
                }
                Vec::new()
            }

            AnthropicStreamEvent::MessageStop => {
                self.finished = true;
                Vec::new()
            }

            AnthropicStreamEvent::Error { error } => {
                return Err(LlmError::Upstream(format!("{}: {}", error.error_type, error.message)));
            }

            AnthropicStreamEvent::ContentBlockStop | AnthropicStreamEvent::Ping | AnthropicStreamEvent::Unknown => {
                Vec::new()
            }
        };

        Ok(chunks)
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn finish(&mut self) -> Completion {
        let pending_tool_calls = std::mem::take(&mut self.tool_uses)
            .into_values()
            .map(|pending| ToolCall {
                input: parse_arguments(&pending.name, &pending.input_json),
                id: pending.id,
                name: pending.name,
            })
            .collect();

        Completion {
            stop_reason: self.stop_reason.take().unwrap_or_default(),
            tokens: self.tokens,
            pending_tool_calls,
            accumulated_text: std::mem::take(&mut self.text),
        }
    }
}
