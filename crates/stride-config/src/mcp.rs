use std::collections::HashMap;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Deserialize;
use url::Url;

/// MCP servers that provide the tool catalog
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct McpConfig {
    /// Servers keyed by name, queried in declaration order
    #[serde(default)]
    pub servers: IndexMap<String, McpServerConfig>,
}

/// How to reach one MCP server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "transport", rename_all = "snake_case")]
pub enum McpServerConfig {
    /// Child process speaking MCP over stdin/stdout
    Stdio(StdioConfig),
    /// Remote server using the streamable HTTP transport
    StreamableHttp(HttpConfig),
}

/// STDIO transport configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StdioConfig {
    /// Command to execute
    pub command: String,
    /// Command arguments
    #[serde(default)]
    pub args: Vec<String>,
    /// Extra environment for the child
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// Working directory for the child
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Server URL
    pub url: Url,
}
