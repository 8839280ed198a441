use std::sync::Arc;

use crate::interview::agents::AgentConfigurator;
use crate::interview::progress::ProgressTracker;
use crate::machine_coding::atlas::DocumentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<ProgressTracker>,
    /// Built once from `config.livekit`; static for the process lifetime.
    pub agents: Arc<AgentConfigurator>,
    /// Atlas Data API in production, an in-memory fake in tests.
    pub documents: Arc<dyn DocumentStore>,
}
