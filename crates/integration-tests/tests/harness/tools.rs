//! In-process tool catalog standing in for an MCP server

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use stride_llm::ToolSpec;
use stride_tools::{ToolCatalog, ToolError, ToolOutput};

/// `get_activities` answers at once, `slow_report` never in time,
/// `broken` always fails
#[derive(Default)]
pub struct FakeTools {
    calls: Mutex<Vec<(String, Value)>>,
}

impl FakeTools {
    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolCatalog for FakeTools {
    fn tools(&self) -> Vec<ToolSpec> {
        ["get_activities", "slow_report", "broken"]
            .into_iter()
            .map(|name| ToolSpec {
                name: name.to_owned(),
                description: Some(format!("Test tool {name}")),
                input_schema: json!({"type": "object", "properties": {}}),
            })
            .collect()
    }

    async fn call(&self, name: &str, input: Value) -> Result<ToolOutput, ToolError> {
        self.calls.lock().unwrap().push((name.to_owned(), input.clone()));

        match name {
            "get_activities" => Ok(ToolOutput::ok(json!({
                "activities": [{"type": "Run", "distance_km": 10.2}],
                "limit": input["limit"],
            }))),
            "slow_report" => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(ToolOutput::ok(json!({"report": "late"})))
            }
            "broken" => Err(ToolError::Execution("database offline".to_owned())),
            _ => Err(ToolError::NotFound { tool: name.to_owned() }),
        }
    }

    fn is_connected(&self) -> bool {
        true
    }
}
