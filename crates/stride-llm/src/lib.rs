//! Model provider adapters for stride
//!
//! Turns the provider-neutral [`Message`] list into a vendor request, opens
//! a streaming call, and normalizes the vendor's frames into a sequence of
//! [`ProviderChunk`]s that always ends with exactly one `done`.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod convert;
pub mod error;
pub mod protocol;
pub mod provider;
pub mod types;

pub use error::LlmError;
pub use provider::{ChunkStream, Provider, from_config};
pub use types::{
    ChatOptions, Completion, Message, ProviderChunk, StopReason, TokenUsage, ToolCall, ToolResult, ToolSpec,
    UserContent,
};
