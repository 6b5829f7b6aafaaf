use thiserror::Error;

/// Tool catalog errors
#[derive(Debug, Error)]
pub enum ToolError {
    /// No connected server exposes this tool
    #[error("tool not found: {tool}")]
    NotFound { tool: String },

    /// Connection or protocol failure talking to the tool server
    #[error("transport error: {0}")]
    Transport(String),

    /// Tool server rejected or failed the call
    #[error("tool execution failed: {0}")]
    Execution(String),
}
