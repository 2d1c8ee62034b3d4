use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ModelProvider;
use crate::store::MenuStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Bounded in-memory menu store. Built fresh per process (and per test).
    pub store: Arc<MenuStore>,
    /// Pluggable model backend. Production: `LlmClient`. Tests: stubs.
    pub llm: Arc<dyn ModelProvider>,
    pub config: Config,
}
