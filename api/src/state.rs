use std::sync::Arc;

use omteam_core::pipeline::AgentClient;

/// Shared by every handler. Holds no per-request or per-user state.
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<dyn AgentClient>,
}

impl AppState {
    pub fn new(agent: Arc<dyn AgentClient>) -> Self {
        Self { agent }
    }
}
