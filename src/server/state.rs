//! Server application state shared across handlers

use crate::config::AppConfig;
use crate::interview::{DiscoverySession, Orchestrator};
use crate::llm::CompletionService;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// One live session entry. The per-session mutex serializes turns: a second
/// message for the same session waits until the first finishes its full
/// extract-infer-respond cycle.
pub type SessionHandle = Arc<Mutex<DiscoverySession>>;

#[derive(Clone)]
pub struct ServerAppState {
    pub orchestrator: Arc<Orchestrator>,
    pub oracle: Arc<dyn CompletionService>,
    pub sessions: Arc<Mutex<HashMap<String, SessionHandle>>>,
    pub config: Arc<AppConfig>,
}

impl ServerAppState {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        oracle: Arc<dyn CompletionService>,
        config: AppConfig,
    ) -> Self {
        Self {
            orchestrator,
            oracle,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            config: Arc::new(config),
        }
    }

    /// Register a new session and return its handle
    pub async fn insert_session(&self, session: DiscoverySession) -> SessionHandle {
        let id = session.id.clone();
        let handle = Arc::new(Mutex::new(session));
        self.sessions.lock().await.insert(id, handle.clone());
        handle
    }

    /// Look up a session handle by id
    pub async fn session(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.lock().await.get(id).cloned()
    }
}
