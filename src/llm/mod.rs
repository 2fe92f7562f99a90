//! Completion-service boundary
//!
//! Everything that talks to the external completion service lives here. The
//! service is an opaque text-completion oracle behind the narrow
//! [`CompletionService`] trait, so the state machine can be tested against a
//! deterministic stub. Any oracle fault is "no usable output" to callers;
//! nothing in this module panics or bubbles an error into the interview.

mod client;
pub mod extraction;
pub mod questions;

pub use client::HttpCompletionClient;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Configuration
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "https://api.together.xyz/v1";
pub const DEFAULT_MODEL: &str = "Qwen/Qwen2.5-72B-Instruct-Turbo";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Explicit client configuration. Passed in at construction; there is no
/// process-wide mutable key/model state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// ============================================================================
// Request / Response Contract
// ============================================================================

/// One prior message in a completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// A completion request: system instruction, ordered prior messages,
/// sampling temperature.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub messages: Vec<ChatTurn>,
    pub temperature: f32,
}

impl CompletionRequest {
    /// The common single-user-message shape
    pub fn single(system: impl Into<String>, user: impl Into<String>, temperature: f32) -> Self {
        Self {
            system: system.into(),
            messages: vec![ChatTurn::user(user)],
            temperature,
        }
    }
}

/// Faults from the completion service. Callers inside the interview loop
/// always degrade these to "nothing extracted".
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Request(String),

    #[error("completion API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("completion response was malformed: {0}")]
    Malformed(String),
}

/// The opaque text-completion oracle
pub trait CompletionService: Send + Sync {
    fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;
}
