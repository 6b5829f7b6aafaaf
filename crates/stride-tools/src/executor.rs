use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::time::Instant;

use crate::catalog::{ToolCatalog, ToolOutput};

/// Error code carried in the output of a failed invocation
const EXECUTION_ERROR: &str = "tool_execution_error";

/// Outcome of one bounded tool invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub output: Value,
    pub is_error: bool,
    pub duration_ms: u64,
}

/// Runs catalog tools under a wall-clock limit
///
/// [`invoke`](Self::invoke) never fails: timeouts and catalog errors come
/// back as `{"error": "tool_execution_error", "message": ...}` outputs.
#[derive(Clone)]
pub struct ToolExecutor {
    catalog: Arc<dyn ToolCatalog>,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(catalog: Arc<dyn ToolCatalog>, timeout: Duration) -> Self {
        Self { catalog, timeout }
    }

    pub fn catalog(&self) -> &Arc<dyn ToolCatalog> {
        &self.catalog
    }

    pub async fn invoke(&self, name: &str, input: Value) -> ToolInvocation {
        let started = Instant::now();

        let ToolOutput { output, is_error } = match tokio::time::timeout(self.timeout, self.catalog.call(name, input)).await
        {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::warn!(tool = name, error = %e, "tool call failed");
                failure(e.to_string())
            }
            Err(_) => {
                let timeout_ms = millis(self.timeout);
                tracing::warn!(tool = name, timeout_ms, "tool call timed out");
                failure(format!("Tool \"{name}\" timed out after {timeout_ms}ms"))
            }
        };

        let duration_ms = millis(started.elapsed());
        tracing::debug!(tool = name, duration_ms, is_error, "tool call finished");

        ToolInvocation {
            output,
            is_error,
            duration_ms,
        }
    }
}

fn failure(message: String) -> ToolOutput {
    ToolOutput::error(json!({ "error": EXECUTION_ERROR, "message": message }))
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
