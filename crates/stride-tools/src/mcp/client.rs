use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};

use rmcp::model::{CallToolRequestParam, CallToolResult, JsonObject, Tool};
use rmcp::service::{Peer, RoleClient, RunningService, ServiceError, ServiceExt as _};
use rmcp::transport::TokioChildProcess;
use stride_config::{HttpConfig, McpServerConfig, StdioConfig};
use tokio::sync::RwLock;

use crate::error::ToolError;

/// Live session with one MCP server
///
/// `generation` increases on every reconnect so callers that saw a broken
/// peer can tell whether someone else already replaced it.
struct Session {
    service: RunningService<RoleClient, ()>,
    generation: u64,
}

/// Connected MCP server wrapping a running rmcp service
///
/// Calls run on a cloned peer, so the lock is only held to read or swap the
/// session and concurrent calls proceed independently.
pub struct McpClient {
    session: RwLock<Session>,
    server_name: String,
    server_config: McpServerConfig,
    connected: AtomicBool,
}

impl McpClient {
    /// Connect and complete the MCP handshake
    pub async fn connect(name: &str, config: &McpServerConfig) -> Result<Self, ToolError> {
        let service = Self::open(config).await?;

        tracing::info!(server = name, "connected to MCP server");

        Ok(Self::with_service(name, config, service))
    }

    fn with_service(name: &str, config: &McpServerConfig, service: RunningService<RoleClient, ()>) -> Self {
        Self {
            session: RwLock::new(Session { service, generation: 0 }),
            server_name: name.to_owned(),
            server_config: config.clone(),
            connected: AtomicBool::new(true),
        }
    }

    async fn open(config: &McpServerConfig) -> Result<RunningService<RoleClient, ()>, ToolError> {
        match config {
            McpServerConfig::Stdio(c) => Self::connect_stdio(c).await,
            McpServerConfig::StreamableHttp(c) => Self::connect_streamable_http(c).await,
        }
    }

    async fn connect_stdio(config: &StdioConfig) -> Result<RunningService<RoleClient, ()>, ToolError> {
        let mut cmd = tokio::process::Command::new(&config.command);
        cmd.args(&config.args);
        for (k, v) in &config.env {
            cmd.env(k, v);
        }
        if let Some(cwd) = &config.cwd {
            cmd.current_dir(cwd);
        }

        let transport =
            TokioChildProcess::new(cmd).map_err(|e| ToolError::Transport(format!("failed to spawn process: {e}")))?;

        ().serve(transport)
            .await
            .map_err(|e| ToolError::Transport(format!("STDIO handshake failed: {e}")))
    }

    async fn connect_streamable_http(config: &HttpConfig) -> Result<RunningService<RoleClient, ()>, ToolError> {
        use rmcp::transport::StreamableHttpClientTransport;
        use rmcp::transport::streamable_http_client::StreamableHttpClientTransportConfig;

        let transport_config = StreamableHttpClientTransportConfig::with_uri(config.url.as_str());
        let transport = StreamableHttpClientTransport::with_client(reqwest::Client::new(), transport_config);

        ().serve(transport)
            .await
            .map_err(|e| ToolError::Transport(format!("StreamableHTTP handshake failed: {e}")))
    }

    async fn peer(&self) -> (Peer<RoleClient>, u64) {
        let session = self.session.read().await;
        (session.service.peer().clone(), session.generation)
    }

    /// List all tools on this server
    pub async fn list_tools(&self) -> Result<Vec<Tool>, ToolError> {
        let (peer, _) = self.peer().await;
        peer.list_all_tools()
            .await
            .map_err(|e| ToolError::Transport(format!("list_tools failed on {}: {e}", self.server_name)))
    }

    /// Call a tool, reconnecting once if the transport fails
    ///
    /// Errors the server itself returns are passed through without
    /// reconnecting.
    pub async fn call_tool(&self, name: &str, arguments: Option<JsonObject>) -> Result<CallToolResult, ToolError> {
        let (peer, generation) = self.peer().await;
        let first_error = match peer.call_tool(request(name, arguments.clone())).await {
            Ok(result) => return Ok(result),
            Err(ServiceError::McpError(e)) => {
                return Err(ToolError::Execution(format!(
                    "tool '{name}' failed on {}: {}",
                    self.server_name, e.message
                )));
            }
            Err(e) => e,
        };

        tracing::warn!(server = %self.server_name, tool = name, error = %first_error, "MCP call failed, reconnecting");

        let peer = self.reconnect(generation).await?;

        peer.call_tool(request(name, arguments)).await.map_err(|e| {
            ToolError::Execution(format!(
                "tool '{name}' failed on {} after reconnect: {e}",
                self.server_name
            ))
        })
    }

    /// Replace the session seen at `generation`, unless another call already did
    async fn reconnect(&self, generation: u64) -> Result<Peer<RoleClient>, ToolError> {
        let mut session = self.session.write().await;
        if session.generation != generation {
            return Ok(session.service.peer().clone());
        }

        let service = match Self::open(&self.server_config).await {
            Ok(service) => service,
            Err(e) => {
                self.connected.store(false, Ordering::Relaxed);
                return Err(e);
            }
        };
        self.connected.store(true, Ordering::Relaxed);

        session.service = service;
        session.generation += 1;
        Ok(session.service.peer().clone())
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

fn request(name: &str, arguments: Option<JsonObject>) -> CallToolRequestParam {
    CallToolRequestParam {
        name: Cow::Owned(name.to_owned()),
        arguments,
    }
}
