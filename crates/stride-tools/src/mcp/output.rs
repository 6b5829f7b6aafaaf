use rmcp::model::{CallToolResult, RawContent};
use serde_json::{Map, Value, json};

use crate::catalog::ToolOutput;

/// Turn an MCP call result into a JSON tool output
///
/// The first text block wins: a JSON object is used as is, anything else
/// is wrapped as `{"raw": text}`. Results without text fall back to the
/// structured content, or an empty object.
pub fn tool_output(result: CallToolResult) -> ToolOutput {
    let text = result.content.iter().find_map(|content| match &content.raw {
        RawContent::Text(block) => Some(block.text.as_str()),
        _ => None,
    });

    let output = match text {
        Some(text) => match serde_json::from_str::<Value>(text) {
            Ok(value @ Value::Object(_)) => value,
            _ => json!({ "raw": text }),
        },
        None => result
            .structured_content
            .clone()
            .unwrap_or_else(|| Value::Object(Map::new())),
    };

    ToolOutput {
        output,
        is_error: result.is_error.unwrap_or(false),
    }
}
