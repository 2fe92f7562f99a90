// Orchestrator - session-level mode routing around the interview engine

use super::engine::{DiscoveryEngine, InterviewState};
use crate::llm::{questions, CompletionService};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Fixed refusal for anything outside process discovery
pub const REFUSAL_MESSAGE: &str = "I'm sorry, I'm only capable of helping with order management \
     and O2C process discovery. Please let me know if you'd like to walk through your order \
     process.";

/// Greeting returned when a session is created, before any routing
pub const SESSION_GREETING: &str = "Hello! I'm a consultant here to understand your end-to-end \
     Order-to-Cash process. Tell me when you're ready to walk through how orders move through \
     your organization.";

/// A trigger message longer than this is assumed to already carry process
/// detail worth extracting
const TRIGGER_WORD_THRESHOLD: usize = 5;

/// Which conversational mode a session is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    General,
    Discovery,
}

/// One chat session: mode plus (once started) the interview aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverySession {
    pub id: String,
    pub mode: SessionMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview: Option<InterviewState>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DiscoverySession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            mode: SessionMode::General,
            interview: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for DiscoverySession {
    fn default() -> Self {
        Self::new()
    }
}

/// Routes each inbound message either into the interview engine or to the
/// general-mode intent check.
pub struct Orchestrator {
    engine: DiscoveryEngine,
    oracle: Arc<dyn CompletionService>,
}

impl Orchestrator {
    pub fn new(engine: DiscoveryEngine, oracle: Arc<dyn CompletionService>) -> Self {
        Self { engine, oracle }
    }

    pub fn engine(&self) -> &DiscoveryEngine {
        &self.engine
    }

    /// Main entry point for one user message in a session
    pub fn handle_message(&self, session: &mut DiscoverySession, user_input: &str) -> String {
        session.updated_at = Utc::now();

        match session.mode {
            SessionMode::Discovery => {
                let state = session
                    .interview
                    .get_or_insert_with(|| self.engine.start_conversation().1);

                let response = self.engine.process_turn(state, user_input);

                if !state.is_active() {
                    session.mode = SessionMode::General;
                }
                response
            }

            SessionMode::General => {
                match questions::route_intent(self.oracle.as_ref(), user_input) {
                    questions::Intent::ProcessDiscovery => {
                        session.mode = SessionMode::Discovery;
                        let (opening, mut state) = self.engine.start_conversation();

                        // a rich trigger message may already answer questions;
                        // run it through the engine before replying
                        let response =
                            if user_input.split_whitespace().count() > TRIGGER_WORD_THRESHOLD {
                                self.engine.process_turn(&mut state, user_input)
                            } else {
                                opening
                            };

                        if !state.is_active() {
                            session.mode = SessionMode::General;
                        }
                        session.interview = Some(state);
                        format!("I can help with that. {}", response)
                    }
                    questions::Intent::Other => REFUSAL_MESSAGE.to_string(),
                }
            }
        }
    }
}
