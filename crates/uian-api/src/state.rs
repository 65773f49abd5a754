//! Application state shared across handlers.

use std::sync::Arc;

use uian_core::CaseRepository;
use uian_rag::{CaseAdvisor, EmbeddingSync};

/// Dependencies injected into every handler. Constructed once at startup
/// with explicit configuration; there is no global client state.
#[derive(Clone)]
pub struct AppState {
    /// Clinical case store.
    pub cases: Arc<dyn CaseRepository>,
    /// Advisory pipeline behind the chat endpoint.
    pub advisor: Arc<CaseAdvisor>,
    /// Embedding sync service for single and batch runs.
    pub sync: Arc<EmbeddingSync>,
}
