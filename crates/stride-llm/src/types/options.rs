use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-call settings handed to a provider
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOptions {
    pub model: String,
    pub temperature: f32,
    pub system: String,
    pub tools: Vec<ToolSpec>,
    /// Falls back to the adapter's configured ceiling
    pub max_tokens: Option<u32>,
}

/// A tool the model may call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// JSON Schema for the tool input
    pub input_schema: Value,
}
