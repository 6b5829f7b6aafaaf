//! Tool catalog backed by downstream MCP servers

mod client;
mod output;

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use stride_config::McpConfig;
use stride_llm::ToolSpec;

pub use self::client::McpClient;
pub use self::output::tool_output;
use crate::catalog::{ToolCatalog, ToolOutput};
use crate::error::ToolError;

/// Tools aggregated from every connected MCP server
///
/// Names are exposed unqualified. When two servers offer the same name the
/// server declared first keeps it.
pub struct McpCatalog {
    clients: Vec<McpClient>,
    configured: usize,
    tools: Vec<ToolSpec>,
    /// Tool name to index into `clients`
    routes: HashMap<String, usize>,
}

impl McpCatalog {
    /// Connect to all configured MCP servers
    ///
    /// Servers that fail to connect are logged and skipped rather than
    /// failing startup.
    pub async fn connect(config: &McpConfig) -> Self {
        let mut clients = Vec::with_capacity(config.servers.len());

        for (name, server_config) in &config.servers {
            match McpClient::connect(name, server_config).await {
                Ok(client) => clients.push(client),
                Err(e) => {
                    tracing::warn!(server = name, error = %e, "failed to connect to MCP server, skipping");
                }
            }
        }

        let mut catalog = Self {
            clients,
            configured: config.servers.len(),
            tools: Vec::new(),
            routes: HashMap::new(),
        };
        catalog.refresh_tools().await;
        catalog
    }

    /// Rebuild the tool list from all connected servers
    pub async fn refresh_tools(&mut self) {
        let mut tools = Vec::new();
        let mut routes = HashMap::new();

        for (index, client) in self.clients.iter().enumerate() {
            let server_tools = match client.list_tools().await {
                Ok(server_tools) => server_tools,
                Err(e) => {
                    tracing::warn!(server = client.server_name(), error = %e, "failed to list tools from MCP server");
                    continue;
                }
            };

            for tool in server_tools {
                let name = tool.name.to_string();
                if routes.contains_key(&name) {
                    tracing::warn!(
                        server = client.server_name(),
                        tool = %name,
                        "duplicate tool name, keeping the first server's"
                    );
                    continue;
                }

                tools.push(ToolSpec {
                    name: name.clone(),
                    description: tool.description.as_deref().map(str::to_owned),
                    input_schema: Value::Object((*tool.input_schema).clone()),
                });
                routes.insert(name, index);
            }
        }

        tracing::info!(
            servers = self.clients.len(),
            tools = tools.len(),
            "aggregated MCP tools"
        );
        self.tools = tools;
        self.routes = routes;
    }

    pub fn server_count(&self) -> usize {
        self.clients.len()
    }
}

#[async_trait]
impl ToolCatalog for McpCatalog {
    fn tools(&self) -> Vec<ToolSpec> {
        self.tools.clone()
    }

    async fn call(&self, name: &str, input: Value) -> Result<ToolOutput, ToolError> {
        let client = self
            .routes
            .get(name)
            .and_then(|&index| self.clients.get(index))
            .ok_or_else(|| ToolError::NotFound { tool: name.to_owned() })?;

        let arguments = match input {
            Value::Object(map) => Some(map),
            _ => None,
        };

        let result = client.call_tool(name, arguments).await?;
        Ok(tool_output(result))
    }

    /// Every configured server is connected
    fn is_connected(&self) -> bool {
        self.clients.len() == self.configured && self.clients.iter().all(McpClient::is_connected)
    }
}
