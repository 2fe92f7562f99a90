// Core Models - Canonical type definitions for discovery sessions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Message Role Enum
// ============================================================================

/// Enum for transcript message roles with compile-time validation.
/// Serializes/deserializes as lowercase strings for the JSON API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }

    /// Label used when formatting transcript lines for the extraction context
    pub fn speaker_label(&self) -> &'static str {
        match self {
            MessageRole::User => "User",
            MessageRole::Assistant => "Consultant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            _ => Err(format!(
                "Invalid message role: '{}'. Expected 'user' or 'assistant'",
                s
            )),
        }
    }
}

// ============================================================================
// Transcript
// ============================================================================

/// One entry in the interview transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEntry {
    pub role: MessageRole,
    pub text: String,
}

impl TranscriptEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            text: text.into(),
        }
    }

    /// Format as a plain `Speaker: text` line for the rolling context
    pub fn as_context_line(&self) -> String {
        format!("{}: {}", self.role.speaker_label(), self.text)
    }
}

// ============================================================================
// Interview Phase
// ============================================================================

/// Lifecycle phase of one interview session.
/// Transitions only move forward; a Completed session never reopens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewPhase {
    AwaitingFirstTurn,
    Interviewing,
    Completed,
}

impl InterviewPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, InterviewPhase::Completed)
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

// ============================================================================
// Conversation Style
// ============================================================================

/// Rough classification of how the user communicates. Informational only:
/// it never changes control flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStyle {
    Narrative,
    Brief,
    #[default]
    Neutral,
}

impl ConversationStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationStyle::Narrative => "narrative",
            ConversationStyle::Brief => "brief",
            ConversationStyle::Neutral => "neutral",
        }
    }
}

// ============================================================================
// Collected Data
// ============================================================================

/// Sentinel written when a topic is abandoned via force-skip. Counts as
/// "answered" for completion purposes but never as captured data.
pub const NOT_DISCUSSED: &str = "[Not discussed]";

/// Attribute key → answer value map captured during an interview.
///
/// First-write-wins: once a key holds a value, later extractions cannot
/// silently replace it. Backed by a BTreeMap so serialized snapshots are
/// stable for replay tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectedData(BTreeMap<String, String>);

impl CollectedData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|v| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// True when the key holds a real answer (present and not the sentinel)
    pub fn is_discussed(&self, key: &str) -> bool {
        matches!(self.0.get(key), Some(v) if v != NOT_DISCUSSED)
    }

    /// Record a value under the first-write rule. Returns true if the value
    /// was written, false if the key was already present.
    pub fn record(&mut self, key: &str, value: impl Into<String>) -> bool {
        if self.0.contains_key(key) {
            return false;
        }
        self.0.insert(key.to_string(), value.into());
        true
    }

    /// Write the not-discussed sentinel into an absent key. A key that
    /// already holds any value (real or sentinel) is left untouched.
    pub fn force_skip(&mut self, key: &str) -> bool {
        if self.0.contains_key(key) {
            return false;
        }
        self.0.insert(key.to_string(), NOT_DISCUSSED.to_string());
        true
    }

    /// Number of keys holding real (non-sentinel) answers
    pub fn captured_count(&self) -> usize {
        self.0.values().filter(|v| *v != NOT_DISCUSSED).count()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

// ============================================================================
// Progress Snapshot
// ============================================================================

/// The interview topic currently being asked about, with its outstanding keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusArea {
    pub topic: String,
    pub attributes: Vec<String>,
}

/// Progress over the applicable mandatory checklist, for API clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryProgress {
    /// Applicable mandatory attributes holding real answers
    pub captured: usize,
    /// Applicable mandatory attributes in total
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_focus: Option<FocusArea>,
}

// ============================================================================
// Interview Record
// ============================================================================

/// One completed interview, appended to the durable record file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewRecord {
    pub timestamp: DateTime<Utc>,
    pub attribute_count: usize,
    pub data: CollectedData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!("user".parse::<MessageRole>().unwrap(), MessageRole::User);
        assert_eq!(
            "Assistant".parse::<MessageRole>().unwrap(),
            MessageRole::Assistant
        );
        assert!("bot".parse::<MessageRole>().is_err());
        assert_eq!(MessageRole::User.to_string(), "user");
    }

    #[test]
    fn test_first_write_wins() {
        let mut data = CollectedData::new();
        assert!(data.record("credit_limit", "$50,000"));
        assert!(!data.record("credit_limit", "$10,000"));
        assert_eq!(data.get("credit_limit"), Some("$50,000"));
    }

    #[test]
    fn test_force_skip_never_overwrites() {
        let mut data = CollectedData::new();
        data.record("order_receiver", "Sales team");
        assert!(!data.force_skip("order_receiver"));
        assert_eq!(data.get("order_receiver"), Some("Sales team"));

        assert!(data.force_skip("manual_intake_method"));
        assert_eq!(data.get("manual_intake_method"), Some(NOT_DISCUSSED));
        assert!(!data.is_discussed("manual_intake_method"));
    }

    #[test]
    fn test_captured_count_ignores_sentinel() {
        let mut data = CollectedData::new();
        data.record("a", "real value");
        data.force_skip("b");
        assert_eq!(data.len(), 2);
        assert_eq!(data.captured_count(), 1);
    }

    #[test]
    fn test_phase_terminality() {
        assert!(InterviewPhase::Completed.is_terminal());
        assert!(InterviewPhase::Interviewing.is_active());
        assert!(InterviewPhase::AwaitingFirstTurn.is_active());
    }

    #[test]
    fn test_transcript_context_line() {
        let entry = TranscriptEntry::user("We use EDI");
        assert_eq!(entry.as_context_line(), "User: We use EDI");
        let entry = TranscriptEntry::assistant("How do orders come in?");
        assert_eq!(entry.as_context_line(), "Consultant: How do orders come in?");
    }
}
