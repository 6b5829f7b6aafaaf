//! Canonical messages to `OpenAI` requests, `OpenAI` stream to chunks

use std::collections::BTreeMap;

use super::{StreamAccumulator, parse_arguments};
use crate::error::LlmError;
use crate::protocol::openai::{
    OpenAiFunction, OpenAiFunctionCall, OpenAiMessage, OpenAiRequest, OpenAiStreamChunk, OpenAiStreamOptions,
    OpenAiTool, OpenAiToolCall,
};
use crate::types::{ChatOptions, Completion, Message, ProviderChunk, StopReason, TokenUsage, ToolCall, UserContent};

/// End-of-stream sentinel sent in place of a JSON chunk
const DONE_SENTINEL: &str = "[DONE]";

/// Build a streaming request
///
/// `include_usage` asks the server for a trailing usage chunk.
pub fn build_request(
    messages: &[Message],
    options: &ChatOptions,
    default_max_tokens: u32,
    include_usage: bool,
) -> OpenAiRequest {
    let mut wire = Vec::with_capacity(messages.len() + 1);

    if !options.system.is_empty() {
        wire.push(text_message("system", options.system.clone()));
    }
    for message in messages {
        push_wire_messages(&mut wire, message);
    }

    OpenAiRequest {
        model: options.model.clone(),
        messages: wire,
        temperature: options.temperature,
        max_tokens: Some(options.max_tokens.unwrap_or(default_max_tokens)),
        tools: options
            .tools
            .iter()
            .map(|tool| OpenAiTool {
                tool_type: "function",
                function: OpenAiFunction {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    parameters: tool.input_schema.clone(),
                },
            })
            .collect(),
        stream: true,
        stream_options: include_usage.then_some(OpenAiStreamOptions { include_usage: true }),
    }
}

const fn text_message(role: &'static str, content: String) -> OpenAiMessage {
    OpenAiMessage {
        role,
        content: Some(content),
        tool_calls: Vec::new(),
        tool_call_id: None,
    }
}

fn push_wire_messages(wire: &mut Vec<OpenAiMessage>, message: &Message) {
    match message {
        Message::User {
            content: UserContent::Text(text),
        } => wire.push(text_message("user", text.clone())),

        // One `tool` message per result
        Message::User {
            content: UserContent::ToolResults(results),
        } => wire.extend(results.iter().map(|r| OpenAiMessage {
            role: "tool",
            content: Some(r.content.clone()),
            tool_calls: Vec::new(),
            tool_call_id: Some(r.call_id.clone()),
        })),

        Message::Assistant { content, tool_calls } => wire.push(OpenAiMessage {
            role: "assistant",
            content: content.clone(),
            tool_calls: tool_calls
                .iter()
                .map(|call| OpenAiToolCall {
                    id: call.id.clone(),
                    tool_type: "function",
                    function: OpenAiFunctionCall {
                        name: call.name.clone(),
                        arguments: call.input.to_string(),
                    },
                })
                .collect(),
            tool_call_id: None,
        }),
    }
}

/// Tool call whose arguments are still arriving
#[derive(Debug, Default)]
struct PendingFunctionCall {
    id: String,
    name: String,
    arguments: String,
}

/// Accumulates one chat completion stream
///
/// Tool call fragments are keyed by their `index` in the `tool_calls` array.
#[derive(Debug, Default)]
pub struct OpenAiAccumulator {
    text: String,
    calls: BTreeMap<u32, PendingFunctionCall>,
    tokens: TokenUsage,
    finish_reason: Option<StopReason>,
    finished: bool,
}

impl OpenAiAccumulator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StreamAccumulator for OpenAiAccumulator {
    fn push(&mut self, data: &str) -> Result<Vec<ProviderChunk>, LlmError> {
        if data == DONE_SENTINEL {
            self.finished = true;
            return Ok(Vec::new());
        }

        let chunk: OpenAiStreamChunk =
            serde_json::from_str(data).map_err(|e| LlmError::Streaming(format!("malformed completion chunk: {e}")))?;

        if let Some(usage) = chunk.usage {
            self.tokens = TokenUsage {
                input: usage.prompt_tokens,
                output: usage.completion_tokens,
            };
        }

        let Some(choice) = chunk.choices.into_iter().next() else {
            return Ok(Vec::new());
        };

        if let Some(reason) = choice.finish_reason {
            self.finish_reason = Some(StopReason::from_openai(&reason));
        }

        for fragment in choice.delta.tool_calls.unwrap_or_default() {
            let pending = self.calls.entry(fragment.index).or_default();
            if let Some(id) = fragment.id.filter(|id| !id.is_empty()) {
                pending.id = id;
            }
            if let Some(function) = fragment.function {
                if let Some(name) = function.name.filter(|n| !n.is_empty()) {
                    pending.name = name;
                }
                if let Some(arguments) = function.arguments {
                    pending.arguments.push_str(&arguments);
                }
            }
        }

        match choice.delta.content {
            Some(text) if !text.is_empty() => {
                self.text.push_str(&text);
                Ok(vec![ProviderChunk::TextDelta { text }])
            }
            _ => Ok(Vec::new()),
        }
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn finish(&mut self) -> Completion {
        let pending_tool_calls = std::mem::take(&mut self.calls)
            .into_values()
            .map(|pending| ToolCall {
                input: parse_arguments(&pending.name, &pending.arguments),
                // Some compatible servers never send an id
                id: if pending.id.is_empty() {
                    format!("call_{}", uuid::Uuid::new_v4().simple())
                } else {
                    pending.id
                },
                name: pending.name,
            })
            .collect();

        Completion {
            stop_reason: self.finish_reason.take().unwrap_or_default(),
            tokens: self.tokens,
            pending_tool_calls,
            accumulated_text: std::mem::take(&mut self.text),
        }
    }
}
