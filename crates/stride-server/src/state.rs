use std::sync::Arc;
use std::time::Duration;

use stride_chat::Orchestrator;
use stride_store::ConversationStore;
use stride_tools::ToolCatalog;

use crate::rate_limit::MessageLimiter;

/// Shared state behind every route
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub store: Arc<dyn ConversationStore>,
    pub catalog: Arc<dyn ToolCatalog>,
    pub limiter: Option<Arc<MessageLimiter>>,
    pub max_message_length: usize,
    pub heartbeat_interval: Duration,
}
