//! HTTP surface for stride: conversation CRUD, streamed chat and health

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod cors;
mod error;
mod export;
mod health;
mod rate_limit;
mod routes;
mod sse;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use stride_chat::Orchestrator;
use stride_config::Config;
use stride_llm::Provider;
use stride_store::{ConversationStore, SqliteStore};
use stride_tools::{McpCatalog, ToolCatalog, ToolExecutor};
use tower_http::trace::TraceLayer;

use crate::rate_limit::MessageLimiter;
use crate::state::AppState;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// Connects the tool servers and opens the conversation database.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let provider = stride_llm::from_config(&config.llm)?;
        let catalog: Arc<dyn ToolCatalog> = Arc::new(McpCatalog::connect(&config.mcp).await);
        let store: Arc<dyn ConversationStore> = Arc::new(SqliteStore::open(&config.store).await?);

        tracing::info!(
            provider = provider.name(),
            model = config.default_model(),
            tools = catalog.tools().len(),
            "chat engine ready"
        );

        Self::from_parts(&config, provider, catalog, store)
    }

    /// Build the server around already constructed collaborators
    pub fn from_parts(
        config: &Config,
        provider: Arc<dyn Provider>,
        catalog: Arc<dyn ToolCatalog>,
        store: Arc<dyn ConversationStore>,
    ) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3001)));

        let limiter = config
            .server
            .rate_limit
            .as_ref()
            .map(MessageLimiter::new)
            .transpose()?
            .map(Arc::new);

        let tools = ToolExecutor::new(Arc::clone(&catalog), config.chat.tool_timeout);
        let orchestrator = Orchestrator::new(
            provider,
            tools,
            Arc::clone(&store),
            config.chat.clone(),
            config.default_model(),
        );

        let state = AppState {
            orchestrator: Arc::new(orchestrator),
            store,
            catalog,
            limiter,
            max_message_length: config.chat.max_message_length,
            heartbeat_interval: config.chat.heartbeat_interval,
        };

        let mut app = routes::chat_router(state.clone());

        if config.server.health.enabled {
            app = app.route(
                &config.server.health.path,
                axum::routing::get(health::health_handler).with_state(state),
            );
        }

        // Apply middleware layers (innermost first)
        app = app.layer(TraceLayer::new_for_http());

        if let Some(ref cors_config) = config.server.cors {
            app = app.layer(cors::cors_layer(cors_config));
        }

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered. Exchanges already
    /// running finish on their own tasks.
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
