use async_trait::async_trait;
use serde_json::Value;
use stride_llm::ToolSpec;

use crate::error::ToolError;

/// Result of one tool call as reported by the tool itself
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub output: Value,
    /// The tool flagged its own output as an error
    pub is_error: bool,
}

impl ToolOutput {
    pub const fn ok(output: Value) -> Self {
        Self { output, is_error: false }
    }

    pub const fn error(output: Value) -> Self {
        Self { output, is_error: true }
    }
}

/// Discoverable set of named tools
///
/// Shared by every concurrent exchange, so implementations must allow
/// independent calls from many tasks.
#[async_trait]
pub trait ToolCatalog: Send + Sync {
    /// Tools offered to the model
    fn tools(&self) -> Vec<ToolSpec>;

    /// Invoke a tool by name
    async fn call(&self, name: &str, input: Value) -> Result<ToolOutput, ToolError>;

    /// Whether the catalog can currently serve calls
    fn is_connected(&self) -> bool;
}
