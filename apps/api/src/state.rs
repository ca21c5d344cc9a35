use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ChatModel;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum
/// extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable chat backend. Production: `LlmClient`. Tests: scripted fakes.
    pub llm: Arc<dyn ChatModel>,
    pub sessions: SessionStore,
    pub config: Config,
}
