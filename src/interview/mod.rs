//! Conversation-driven attribute collection
//!
//! The engine owns the per-turn algorithm; the orchestrator wraps it with
//! session-level mode routing (general chat vs active interview).

mod engine;
mod orchestrator;

pub use engine::{DiscoveryEngine, InterviewLimits, InterviewState, COMPLETION_ACK};
pub use orchestrator::{
    DiscoverySession, Orchestrator, SessionMode, REFUSAL_MESSAGE, SESSION_GREETING,
};
