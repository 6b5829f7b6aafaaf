//! Conversion between canonical types and vendor wire formats

pub mod anthropic;
pub mod openai;

use serde_json::{Map, Value};

use crate::error::LlmError;
use crate::types::{Completion, ProviderChunk};

/// Per-call state that turns vendor SSE payloads into canonical chunks
///
/// One accumulator lives for exactly one streaming call. Text deltas are
/// handed back immediately; tool call fragments are buffered until
/// [`finish`](Self::finish) builds the terminal [`Completion`].
pub trait StreamAccumulator: Send + 'static {
    /// Feed one SSE `data` payload
    fn push(&mut self, data: &str) -> Result<Vec<ProviderChunk>, LlmError>;

    /// Whether the vendor signalled the end of the stream
    fn is_finished(&self) -> bool;

    /// Drain the buffers into the terminal summary
    fn finish(&mut self) -> Completion;
}

/// Parse concatenated tool call arguments
///
/// An empty buffer means no arguments. Anything that is not a JSON object
/// becomes an empty object so the call still reaches the tool.
pub fn parse_arguments(tool: &str, buffer: &str) -> Value {
    let raw = if buffer.trim().is_empty() { "{}" } else { buffer };

    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => value,
        Ok(other) => {
            tracing::warn!(tool, kind = %json_kind(&other), "tool arguments were not an object");
            Value::Object(Map::new())
        }
        Err(e) => {
            tracing::warn!(tool, error = %e, "tool arguments were not valid JSON");
            Value::Object(Map::new())
        }
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn arguments_parse_or_fall_back_to_empty_object() {
        assert_eq!(parse_arguments("t", r#"{"year":2025}"#), json!({"year": 2025}));
        assert_eq!(parse_arguments("t", ""), json!({}));
        assert_eq!(parse_arguments("t", "  "), json!({}));
        assert_eq!(parse_arguments("t", r#"{"year":20"#), json!({}));
        assert_eq!(parse_arguments("t", "[1,2]"), json!({}));
    }
}
