use stride_llm::{Message, ToolCall, ToolResult};
use stride_store::{Role, Turn};

/// Rebuild the provider-neutral message list from stored turns
///
/// An assistant turn with tool calls expands into the assistant message
/// followed by a tool-results message holding every call that produced
/// output. System turns are not replayed.
pub fn reconstruct(history: &[Turn]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len());

    for turn in history {
        match turn.role {
            Role::User => messages.push(Message::user(turn.content.clone())),
            Role::Assistant => {
                let calls = turn
                    .tool_calls
                    .iter()
                    .map(|record| ToolCall {
                        id: record.id.clone(),
                        name: record.tool_name.clone(),
                        input: record.input.clone(),
                    })
                    .collect();
                messages.push(Message::assistant(turn.content.clone(), calls));

                let results: Vec<ToolResult> = turn
                    .tool_calls
                    .iter()
                    .filter_map(|record| {
                        let output = record.output.as_ref()?;
                        Some(ToolResult::from_output(record.id.clone(), output, record.is_error))
                    })
                    .collect();
                if !results.is_empty() {
                    messages.push(Message::tool_results(results));
                }
            }
            Role::System => {}
        }
    }

    messages
}
