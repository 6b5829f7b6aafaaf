//! Test server wrapper that starts stride on a random port

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{Value, json};
use stride_config::Config;
use stride_server::Server;
use stride_store::SqliteStore;
use stride_tools::ToolCatalog;
use tokio_util::sync::CancellationToken;

use super::sse::{self, SseEvent};

/// A running test server instance
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
}

impl TestServer {
    /// Start a test server exactly as the binary would build it
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        let server = Server::new(config).await?;
        Self::serve(server).await
    }

    /// Start a test server whose tools come from `catalog`
    pub async fn start_with_tools(config: Config, catalog: Arc<dyn ToolCatalog>) -> anyhow::Result<Self> {
        let provider = stride_llm::from_config(&config.llm)?;
        let store = Arc::new(SqliteStore::open(&config.store).await?);
        let server = Server::from_parts(&config, provider, catalog, store)?;
        Self::serve(server).await
    }

    async fn serve(server: Server) -> anyhow::Result<Self> {
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        // Bind the listener here so we know the actual port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, server.into_router())
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            shutdown,
            client: reqwest::Client::new(),
        })
    }

    /// Absolute URL for a path on the running server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Get a reference to the HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Create a conversation and return its id
    pub async fn create_conversation(&self, title: Option<&str>) -> String {
        let body = title.map_or_else(|| json!({}), |title| json!({"title": title}));
        let created: Value = self
            .client
            .post(self.url("/api/chat/conversations"))
            .json(&body)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        created["id"].as_str().unwrap().to_owned()
    }

    /// Post a chat message without reading the response
    pub async fn post_message(&self, conversation_id: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(&format!("/api/chat/conversations/{conversation_id}/messages")))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    /// Send a chat message and collect the whole event stream
    pub async fn chat(&self, conversation_id: &str, content: &str) -> Vec<SseEvent> {
        let response = self.post_message(conversation_id, json!({"content": content})).await;
        assert_eq!(response.status(), 200, "chat request rejected");

        sse::parse(&response.text().await.unwrap())
    }

    /// Fetch a conversation with its messages
    pub async fn conversation(&self, conversation_id: &str) -> Value {
        self.client
            .get(self.url(&format!("/api/chat/conversations/{conversation_id}")))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
