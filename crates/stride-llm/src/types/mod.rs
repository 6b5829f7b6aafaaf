//! Provider-neutral types shared by every adapter

mod chunk;
mod message;
mod options;

pub use chunk::{Completion, ProviderChunk, StopReason, TokenUsage};
pub use message::{Message, ToolCall, ToolResult, UserContent};
pub use options::{ChatOptions, ToolSpec};
