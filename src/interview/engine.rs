// Conversation State Machine - drives the interview one turn at a time
//
// Per-turn: extract -> merge (first-write) -> infer -> completion check ->
// focus selection -> stuck detection -> respond. The oracle failing at any
// point degrades to "nothing extracted"; the stuck budgets guarantee the
// interview still terminates.

use crate::file_storage::RecordSink;
use crate::inference;
use crate::llm::{extraction, questions, CompletionService};
use crate::models::{
    CollectedData, ConversationStyle, InterviewPhase, InterviewRecord, TranscriptEntry,
};
use crate::schema::{self, QuestionSpec, SchemaError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Fixed acknowledgement returned at the terminal transition
pub const COMPLETION_ACK: &str = "This has been incredibly insightful. I have captured all the \
     key process details for your Order-to-Cash process. Your information has been recorded.";

/// Transcript entries included in the rolling extraction context
/// (three exchanges)
const ROLLING_CONTEXT_ENTRIES: usize = 6;

// ============================================================================
// Limits
// ============================================================================

/// Stuck-detection budgets. Product-tuning constants, not structural
/// requirements; override via the `[interview]` config section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct InterviewLimits {
    /// Clarification prompts allowed per session
    pub clarification_budget: u32,
    /// Consecutive zero-capture turns tolerated per topic before force-skip
    pub topic_attempts: u32,
    /// Utterances below this word count are "short" for stuck detection
    pub short_answer_words: usize,
}

impl Default for InterviewLimits {
    fn default() -> Self {
        Self {
            clarification_budget: 2,
            topic_attempts: 3,
            short_answer_words: 6,
        }
    }
}

// ============================================================================
// Session State
// ============================================================================

/// Per-session interview aggregate, mutated exclusively by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewState {
    pub phase: InterviewPhase,
    pub collected_data: CollectedData,
    pub transcript: Vec<TranscriptEntry>,
    pub user_responses: Vec<String>,
    /// Hierarchical id of the last question posed; biases extraction
    pub current_question_id: Option<String>,
    pub question_count: u32,
    pub clarifications_used: u32,
    /// Consecutive zero-capture turns per focus topic
    pub topic_misses: HashMap<String, u32>,
    pub style: ConversationStyle,
}

impl InterviewState {
    pub fn new() -> Self {
        Self {
            phase: InterviewPhase::AwaitingFirstTurn,
            collected_data: CollectedData::new(),
            transcript: Vec::new(),
            user_responses: Vec::new(),
            current_question_id: None,
            question_count: 0,
            clarifications_used: 0,
            topic_misses: HashMap::new(),
            style: ConversationStyle::Neutral,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    /// Last few transcript entries as plain text for extraction context
    fn rolling_context(&self) -> String {
        let start = self.transcript.len().saturating_sub(ROLLING_CONTEXT_ENTRIES);
        self.transcript[start..]
            .iter()
            .map(|entry| entry.as_context_line())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for InterviewState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Engine
// ============================================================================

pub struct DiscoveryEngine {
    sequence: Vec<QuestionSpec>,
    oracle: Arc<dyn CompletionService>,
    sink: Arc<dyn RecordSink>,
    limits: InterviewLimits,
}

impl DiscoveryEngine {
    /// Build an engine over the built-in question flow. Schema validation
    /// happens here: a bad flow is a configuration fault that must abort
    /// initialization, not surface mid-interview.
    pub fn new(
        oracle: Arc<dyn CompletionService>,
        sink: Arc<dyn RecordSink>,
        limits: InterviewLimits,
    ) -> Result<Self, SchemaError> {
        let sequence = schema::question_sequence();
        schema::validate(&sequence)?;
        Ok(Self {
            sequence,
            oracle,
            sink,
            limits,
        })
    }

    pub fn sequence(&self) -> &[QuestionSpec] {
        &self.sequence
    }

    /// Open the interview: greeting plus the first scheduled question.
    pub fn start_conversation(&self) -> (String, InterviewState) {
        let mut state = InterviewState::new();
        state.phase = InterviewPhase::Interviewing;

        let opening = match schema::next_question(&self.sequence, &state.collected_data) {
            Some(first) => {
                state.current_question_id = Some(first.id.to_string());
                state.question_count = 1;
                format!(
                    "Thank you for your time. I'm here to understand your Order-to-Cash \
                     process. Let's start with the basics: {}",
                    first.prompt.unwrap_or("How do orders come into your organization?")
                )
            }
            None => "Thank you for your time.".to_string(),
        };

        state.transcript.push(TranscriptEntry::assistant(&opening));
        (opening, state)
    }

    /// Process one inbound user utterance: a single synchronous step.
    pub fn process_turn(&self, state: &mut InterviewState, user_input: &str) -> String {
        if state.phase.is_terminal() {
            // no extraction after the terminal transition
            return COMPLETION_ACK.to_string();
        }
        state.phase = InterviewPhase::Interviewing;

        state.transcript.push(TranscriptEntry::user(user_input));
        state.user_responses.push(user_input.to_string());
        state.style = questions::assess_conversation_style(&state.user_responses);

        let context = state.rolling_context();
        let expected_key = state
            .current_question_id
            .as_deref()
            .and_then(|id| schema::find_by_id(&self.sequence, id))
            .map(|spec| spec.key);

        let extracted = extraction::extract_mentioned_attributes(
            self.oracle.as_ref(),
            &self.sequence,
            user_input,
            &context,
            expected_key,
        );

        let mut captured = 0usize;
        for (key, value) in &extracted {
            if schema::find_by_key(&self.sequence, key).is_none() {
                log::debug!("discarding unknown extracted key '{}'", key);
                continue;
            }
            if state.collected_data.record(key, value.clone()) {
                log::info!("[Captured] {}: {}", key, value);
                captured += 1;
            }
        }

        inference::run_inferences(&self.sequence, &mut state.collected_data);

        if let Some(ack) = self.try_complete(state) {
            return ack;
        }

        // canonical order is total: the first unanswered applicable node
        // wins deterministically
        let focus = schema::next_question(&self.sequence, &state.collected_data)
            .expect("incomplete interview must have a next question");
        let focus_topic = focus.topic.to_string();

        if captured > 0 {
            // any progress breaks every consecutive-miss streak
            state.topic_misses.clear();
        } else {
            let misses = state.topic_misses.entry(focus_topic.clone()).or_insert(0);
            *misses += 1;
            let miss_count = *misses;
            let is_short =
                user_input.split_whitespace().count() < self.limits.short_answer_words;

            if is_short {
                if state.clarifications_used < self.limits.clarification_budget
                    && miss_count < self.limits.topic_attempts
                {
                    state.clarifications_used += 1;
                    let clarification = clarification_text(focus);
                    state
                        .transcript
                        .push(TranscriptEntry::assistant(&clarification));
                    return clarification;
                }
                return self.abandon_topic(state, &focus_topic, &context);
            }

            if miss_count >= self.limits.topic_attempts {
                return self.abandon_topic(state, &focus_topic, &context);
            }
        }

        self.pose_question(state, focus, &context)
    }

    /// Force-skip every remaining attribute of a stuck topic, then move
    /// straight on so the user is never asked about an abandoned topic.
    fn abandon_topic(&self, state: &mut InterviewState, topic: &str, context: &str) -> String {
        for key in schema::topic_mandatory_keys(&self.sequence, &state.collected_data, topic) {
            if state.collected_data.force_skip(&key) {
                log::info!("[Skipped] {} (topic '{}' abandoned)", key, topic);
            }
        }
        state.topic_misses.remove(topic);

        inference::run_inferences(&self.sequence, &mut state.collected_data);
        if let Some(ack) = self.try_complete(state) {
            return ack;
        }

        let focus = schema::next_question(&self.sequence, &state.collected_data)
            .expect("incomplete interview must have a next question");
        self.pose_question(state, focus, context)
    }

    /// Terminal check. On completion the snapshot is persisted exactly once;
    /// a sink failure is logged and swallowed, never reopening the session.
    fn try_complete(&self, state: &mut InterviewState) -> Option<String> {
        if !schema::is_complete(&self.sequence, &state.collected_data) {
            return None;
        }

        let record = InterviewRecord {
            timestamp: Utc::now(),
            attribute_count: state.collected_data.len(),
            data: state.collected_data.clone(),
        };
        if let Err(e) = self.sink.append(&record) {
            log::warn!("interview record append failed: {}", e);
        }

        state.phase = InterviewPhase::Completed;
        state.current_question_id = None;
        state
            .transcript
            .push(TranscriptEntry::assistant(COMPLETION_ACK));
        Some(COMPLETION_ACK.to_string())
    }

    fn pose_question(
        &self,
        state: &mut InterviewState,
        focus: &QuestionSpec,
        context: &str,
    ) -> String {
        let question = questions::generate_next_question(self.oracle.as_ref(), focus, context);
        state.current_question_id = Some(focus.id.to_string());
        state.question_count += 1;
        state.transcript.push(TranscriptEntry::assistant(&question));
        question
    }
}

/// Restate the pending question with its example answers
fn clarification_text(focus: &QuestionSpec) -> String {
    let base = focus.prompt.unwrap_or_default();
    if focus.examples.is_empty() {
        format!("Let me put that differently: {}", base)
    } else {
        format!(
            "Let me put that differently: {} For example: {}.",
            base,
            focus.examples.join("; ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_storage::StorageError;
    use crate::llm::{CompletionError, CompletionRequest};
    use std::sync::Mutex;

    /// Oracle stub: answers extraction calls from a scripted map of
    /// utterance fragments to JSON, everything else with a fixed line.
    struct ScriptedOracle {
        script: Vec<(&'static str, &'static str)>,
    }

    impl ScriptedOracle {
        fn new(script: Vec<(&'static str, &'static str)>) -> Self {
            Self { script }
        }

        fn silent() -> Self {
            Self { script: vec![] }
        }
    }

    impl CompletionService for ScriptedOracle {
        fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
            if request.system.contains("extracting ORDER PROCESS") {
                // match against the latest answer only, not the rolling
                // context, the way a competent extractor would
                let content = &request.messages[0].content;
                let latest = content
                    .rsplit("USER'S LATEST ANSWER:")
                    .next()
                    .unwrap_or(content);
                for (fragment, json) in &self.script {
                    if latest.contains(fragment) {
                        return Ok(json.to_string());
                    }
                }
                return Ok("{}".to_string());
            }
            Ok("Could you tell me more about that part of the process?".to_string())
        }
    }

    /// Sink stub counting appended records
    #[derive(Default)]
    struct MemorySink {
        records: Mutex<Vec<InterviewRecord>>,
    }

    impl RecordSink for MemorySink {
        fn append(&self, record: &InterviewRecord) -> Result<(), StorageError> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    /// Sink stub that always fails
    struct FailingSink;

    impl RecordSink for FailingSink {
        fn append(&self, _record: &InterviewRecord) -> Result<(), StorageError> {
            Err(StorageError::Append("disk full".to_string()))
        }
    }

    fn engine_with(
        oracle: ScriptedOracle,
        sink: Arc<dyn RecordSink>,
    ) -> DiscoveryEngine {
        DiscoveryEngine::new(Arc::new(oracle), sink, InterviewLimits::default()).unwrap()
    }

    #[test]
    fn test_start_conversation_poses_first_question() {
        let engine = engine_with(ScriptedOracle::silent(), Arc::new(MemorySink::default()));
        let (opening, state) = engine.start_conversation();
        assert!(opening.contains("How do orders come into your organization?"));
        assert_eq!(state.current_question_id.as_deref(), Some("1"));
        assert_eq!(state.phase, InterviewPhase::Interviewing);
    }

    #[test]
    fn test_multi_capture_advances_to_first_unanswered_in_order() {
        // one utterance answers question 1 and question 3; focus must land
        // on question 2, not jump ahead
        let oracle = ScriptedOracle::new(vec![(
            "portal orders and our checklist",
            r#"{"order_origin_channels": "B2B portal only",
                "required_verification_fields": "Customer ID, SKU, quantity"}"#,
        )]);
        let engine = engine_with(oracle, Arc::new(MemorySink::default()));
        let (_, mut state) = engine.start_conversation();

        engine.process_turn(&mut state, "We take portal orders and our checklist covers the rest");

        assert!(state.collected_data.contains("order_origin_channels"));
        assert!(state.collected_data.contains("required_verification_fields"));
        assert_eq!(state.current_question_id.as_deref(), Some("2"));
    }

    #[test]
    fn test_unknown_extracted_keys_are_discarded() {
        let oracle = ScriptedOracle::new(vec![(
            "portal",
            r#"{"order_origin_channels": "Portal", "made_up_key": "noise"}"#,
        )]);
        let engine = engine_with(oracle, Arc::new(MemorySink::default()));
        let (_, mut state) = engine.start_conversation();

        engine.process_turn(&mut state, "Everything arrives through the portal");
        assert!(!state.collected_data.contains("made_up_key"));
        assert!(state.collected_data.contains("order_origin_channels"));
    }

    #[test]
    fn test_clarification_then_force_skip_on_short_answers() {
        let engine = engine_with(ScriptedOracle::silent(), Arc::new(MemorySink::default()));
        let (_, mut state) = engine.start_conversation();

        // first two short non-answers spend the clarification budget and
        // keep the focus in place
        let reply = engine.process_turn(&mut state, "hmm");
        assert!(reply.contains("Let me put that differently"));
        assert_eq!(state.current_question_id.as_deref(), Some("1"));

        let reply = engine.process_turn(&mut state, "not sure");
        assert!(reply.contains("Let me put that differently"));
        assert_eq!(state.clarifications_used, 2);

        // third short non-answer: budget gone, topic abandoned, focus moves
        engine.process_turn(&mut state, "dunno");
        assert_eq!(
            state.collected_data.get("order_origin_channels"),
            Some(crate::models::NOT_DISCUSSED)
        );
        assert_eq!(state.current_question_id.as_deref(), Some("2"));
    }

    #[test]
    fn test_force_skip_preserves_real_values() {
        let oracle = ScriptedOracle::new(vec![(
            "email and EDI",
            r#"{"order_origin_channels": "Email plus EDI 850"}"#,
        )]);
        let engine = engine_with(oracle, Arc::new(MemorySink::default()));
        let (_, mut state) = engine.start_conversation();

        engine.process_turn(&mut state, "Orders arrive by email and EDI both");
        // now stuck on manual_intake_method; burn through the topic
        engine.process_turn(&mut state, "eh");
        engine.process_turn(&mut state, "pass");
        engine.process_turn(&mut state, "skip");

        assert_eq!(
            state.collected_data.get("order_origin_channels"),
            Some("Email plus EDI 850")
        );
        assert_eq!(
            state.collected_data.get("manual_intake_method"),
            Some(crate::models::NOT_DISCUSSED)
        );
    }

    #[test]
    fn test_dead_oracle_interview_is_bounded_and_completes() {
        let engine = engine_with(ScriptedOracle::silent(), Arc::new(MemorySink::default()));
        let (_, mut state) = engine.start_conversation();

        let total_applicable =
            schema::applicable_mandatory(engine.sequence(), &state.collected_data).len();
        let bound = total_applicable * 4;

        let mut turns = 0;
        while state.is_active() && turns <= bound {
            engine.process_turn(&mut state, "I would rather not talk about any of this today");
            turns += 1;
        }

        assert_eq!(state.phase, InterviewPhase::Completed);
        assert!(turns <= bound, "took {} turns, bound was {}", turns, bound);
    }

    #[test]
    fn test_completion_persists_exactly_once() {
        let sink = Arc::new(MemorySink::default());
        let oracle = ScriptedOracle::new(vec![(
            "everything",
            r#"{"order_origin_channels": "EDI 850 and B2B portal",
                "primary_order_system": "SAP ECC",
                "required_verification_fields": "Customer ID, SKU, quantity, price",
                "verification_success_rate": "95% pass first time",
                "credit_approval_type": "Fully automated scoring under threshold",
                "auto_approval_limit": "$50,000",
                "credit_decision_to_sales": "Dashboard alert",
                "credit_decision_to_customer": "Automated confirmation"}"#,
        )]);
        let engine = engine_with(oracle, sink.clone());
        let (_, mut state) = engine.start_conversation();

        let reply = engine.process_turn(&mut state, "Here is everything at once");
        assert_eq!(reply, COMPLETION_ACK);
        assert_eq!(state.phase, InterviewPhase::Completed);
        assert_eq!(sink.records.lock().unwrap().len(), 1);

        // a terminal session never re-extracts or re-persists
        let reply = engine.process_turn(&mut state, "one more thing");
        assert_eq!(reply, COMPLETION_ACK);
        assert_eq!(sink.records.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_sink_failure_still_completes() {
        let oracle = ScriptedOracle::new(vec![(
            "everything",
            r#"{"order_origin_channels": "EDI 850 and B2B portal",
                "primary_order_system": "SAP ECC",
                "required_verification_fields": "Customer ID, SKU, quantity, price",
                "verification_success_rate": "95% pass first time",
                "credit_approval_type": "Fully automated scoring under threshold",
                "auto_approval_limit": "$50,000",
                "credit_decision_to_sales": "Dashboard alert",
                "credit_decision_to_customer": "Automated confirmation"}"#,
        )]);
        let engine = engine_with(oracle, Arc::new(FailingSink));
        let (_, mut state) = engine.start_conversation();

        let reply = engine.process_turn(&mut state, "Here is everything at once");
        assert_eq!(reply, COMPLETION_ACK);
        assert_eq!(state.phase, InterviewPhase::Completed);
    }

    #[test]
    fn test_inference_unlocks_precondition_same_turn() {
        // answering credit_approval_type with "both" must unlock the
        // auto-limit question before the next question is chosen
        let oracle = ScriptedOracle::new(vec![
            (
                "portal only",
                r#"{"order_origin_channels": "B2B portal and EDI",
                    "primary_order_system": "NetSuite",
                    "required_verification_fields": "Checklist in ERP",
                    "verification_success_rate": "97%"}"#,
            ),
            (
                "depends on size",
                r#"{"credit_approval_type": "Both, depending on order size"}"#,
            ),
        ]);
        let engine = engine_with(oracle, Arc::new(MemorySink::default()));
        let (_, mut state) = engine.start_conversation();

        engine.process_turn(&mut state, "We are portal only with a clean checklist");
        engine.process_turn(&mut state, "It depends on size honestly");

        assert_eq!(state.collected_data.get("has_auto_approval"), Some("Yes"));
        assert_eq!(state.collected_data.get("has_manual_credit"), Some("Yes"));
        // next focus is the freshly unlocked auto_approval_limit node
        assert_eq!(state.current_question_id.as_deref(), Some("4.1.1"));
    }

    #[test]
    fn test_progress_resets_topic_miss_counter() {
        let oracle = ScriptedOracle::new(vec![(
            "portal answer",
            r#"{"order_origin_channels": "B2B portal"}"#,
        )]);
        let engine = engine_with(oracle, Arc::new(MemorySink::default()));
        let (_, mut state) = engine.start_conversation();

        engine.process_turn(&mut state, "let me think about the whole intake question here");
        assert_eq!(state.topic_misses.get("Order Intake"), Some(&1));

        engine.process_turn(&mut state, "ok the portal answer");
        assert!(!state.topic_misses.contains_key("Order Intake"));
    }
}
