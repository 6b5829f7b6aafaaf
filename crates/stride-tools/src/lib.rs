//! Tool catalog and executor for stride
//!
//! Tools are discovered from MCP servers and invoked by name. The
//! [`ToolExecutor`] wraps any [`ToolCatalog`] with a per-call timeout and
//! turns every failure into a structured, error-flagged output.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod catalog;
pub mod error;
mod executor;
pub mod mcp;

pub use catalog::{ToolCatalog, ToolOutput};
pub use error::ToolError;
pub use executor::{ToolExecutor, ToolInvocation};
pub use mcp::McpCatalog;
