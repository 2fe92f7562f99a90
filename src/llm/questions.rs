// Intent routing, question phrasing and style assessment

use super::{CompletionRequest, CompletionService};
use crate::models::ConversationStyle;
use crate::schema::QuestionSpec;

/// Classified intent of a general-mode utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    ProcessDiscovery,
    Other,
}

/// Decide whether the user wants to start process discovery. Any oracle
/// failure classifies as Other; the user just gets the standard refusal and
/// can try again.
pub fn route_intent(oracle: &dyn CompletionService, user_input: &str) -> Intent {
    let system = "Classify the user's intent.\n\
                  PROCESS_DISCOVERY = user wants to report, map, or discuss how their order process works\n\
                  OTHER = anything else\n\n\
                  Reply with ONLY one word: PROCESS_DISCOVERY or OTHER";

    match oracle.complete(CompletionRequest::single(system, user_input, 0.0)) {
        Ok(response) if response.to_uppercase().contains("PROCESS") => Intent::ProcessDiscovery,
        Ok(_) => Intent::Other,
        Err(e) => {
            log::warn!("intent routing failed, defaulting to Other: {}", e);
            Intent::Other
        }
    }
}

/// Questions shorter than this many words are asked verbatim
const REPHRASE_WORD_THRESHOLD: usize = 15;

/// Produce the natural-language form of the next question. Short prompts go
/// out verbatim; longer ones are rephrased by the oracle, falling back to
/// the base prompt when the oracle fails or answers with noise.
pub fn generate_next_question(
    oracle: &dyn CompletionService,
    spec: &QuestionSpec,
    _rolling_context: &str,
) -> String {
    let base_question = spec.prompt.unwrap_or_default().to_string();

    if base_question.split_whitespace().count() < REPHRASE_WORD_THRESHOLD {
        return base_question;
    }

    let examples = if spec.examples.is_empty() {
        "N/A".to_string()
    } else {
        spec.examples
            .iter()
            .take(2)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };

    let system = format!(
        "You are a consultant conducting a process discovery interview.\n\
         Rephrase the following question to sound natural and conversational.\n\
         Keep the same meaning but make it flow naturally in conversation.\n\
         Return ONLY the rephrased question, nothing else.\n\n\
         Original question: {}\n\
         Examples of valid answers: {}",
        base_question, examples
    );

    match oracle.complete(CompletionRequest::single(
        system,
        "Rephrase this question naturally.",
        0.5,
    )) {
        Ok(response) if response.trim().len() > 10 => response.trim().to_string(),
        Ok(_) => base_question,
        Err(e) => {
            log::debug!("question rephrasing failed, using base prompt: {}", e);
            base_question
        }
    }
}

/// Classify the user's communication style from their recent responses.
/// Purely informational; length-based.
pub fn assess_conversation_style(recent_responses: &[String]) -> ConversationStyle {
    if recent_responses.is_empty() {
        return ConversationStyle::Neutral;
    }

    let total_words: usize = recent_responses
        .iter()
        .map(|r| r.split_whitespace().count())
        .sum();
    let avg = total_words as f64 / recent_responses.len() as f64;

    if avg > 50.0 {
        ConversationStyle::Narrative
    } else if avg < 10.0 {
        ConversationStyle::Brief
    } else {
        ConversationStyle::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::CompletionError;
    use crate::schema::{find_by_key, question_sequence};

    struct FixedOracle(Option<String>);

    impl CompletionService for FixedOracle {
        fn complete(&self, _request: CompletionRequest) -> Result<String, CompletionError> {
            self.0
                .clone()
                .ok_or_else(|| CompletionError::Request("stubbed outage".to_string()))
        }
    }

    #[test]
    fn test_route_intent() {
        let oracle = FixedOracle(Some("PROCESS_DISCOVERY".to_string()));
        assert_eq!(
            route_intent(&oracle, "I want to report our order process"),
            Intent::ProcessDiscovery
        );

        let oracle = FixedOracle(Some("OTHER".to_string()));
        assert_eq!(route_intent(&oracle, "what's the weather"), Intent::Other);

        let oracle = FixedOracle(None);
        assert_eq!(route_intent(&oracle, "anything"), Intent::Other);
    }

    #[test]
    fn test_short_question_goes_out_verbatim() {
        let sequence = question_sequence();
        let spec = find_by_key(&sequence, "order_origin_channels").unwrap();
        // oracle would mangle it; verbatim path must not call through
        let oracle = FixedOracle(Some("MANGLED".to_string()));
        assert_eq!(
            generate_next_question(&oracle, spec, ""),
            "How do orders come into your organization?"
        );
    }

    #[test]
    fn test_long_question_falls_back_on_outage() {
        let sequence = question_sequence();
        let spec = find_by_key(&sequence, "credit_approval_type").unwrap();
        let oracle = FixedOracle(None);
        assert_eq!(
            generate_next_question(&oracle, spec, ""),
            spec.prompt.unwrap()
        );
    }

    #[test]
    fn test_long_question_uses_rephrasing() {
        let sequence = question_sequence();
        let spec = find_by_key(&sequence, "credit_approval_type").unwrap();
        let oracle = FixedOracle(Some(
            "Walk me through what happens on the credit side when an order lands.".to_string(),
        ));
        let question = generate_next_question(&oracle, spec, "");
        assert!(question.starts_with("Walk me through"));
    }

    #[test]
    fn test_style_assessment() {
        assert_eq!(assess_conversation_style(&[]), ConversationStyle::Neutral);
        assert_eq!(
            assess_conversation_style(&["EDI".to_string(), "yes".to_string()]),
            ConversationStyle::Brief
        );
        let long = "word ".repeat(60).trim().to_string();
        assert_eq!(
            assess_conversation_style(&[long]),
            ConversationStyle::Narrative
        );
        let medium = "we use an ERP with a checklist for orders and verification".to_string();
        assert_eq!(
            assess_conversation_style(&[medium]),
            ConversationStyle::Neutral
        );
    }
}
