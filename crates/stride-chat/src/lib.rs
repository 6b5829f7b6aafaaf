//! Chat orchestration engine for stride
//!
//! One exchange takes a user message through a bounded loop of model
//! rounds and tool calls, streaming [`StreamEvent`]s as it goes and
//! persisting the finished turn.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod error;
mod event;
mod orchestrator;
mod prompt;
mod reconstruct;

pub use error::ChatError;
pub use event::{ERROR_CODE_ORCHESTRATION, StreamEvent};
pub use orchestrator::{ChatSettings, EventSink, Orchestrator};
pub use prompt::system_prompt;
pub use reconstruct::reconstruct;
