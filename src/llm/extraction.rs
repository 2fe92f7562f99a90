// Extraction Adapter - one utterance in, attribute key/value pairs out
//
// The oracle is instructed to answer with a flat JSON object restricted to
// schema keys. Its output is parsed defensively: the span from the first '{'
// to the last '}' is taken, anything around it is ignored, and every failure
// mode collapses to an empty result. "Nothing extracted" and "oracle down"
// are the same thing to the state machine.

use super::{CompletionRequest, CompletionService};
use crate::schema::{QuestionKind, QuestionSpec};
use std::collections::BTreeMap;

/// Most attributes listed in one extraction prompt
const MAX_PROMPT_ATTRIBUTES: usize = 20;

/// Extract every attribute mentioned in `user_input`. Multi-attribute
/// answers are the normal case: one rich reply may fill several keys at
/// once, or none at all.
pub fn extract_mentioned_attributes(
    oracle: &dyn CompletionService,
    sequence: &[QuestionSpec],
    user_input: &str,
    rolling_context: &str,
    expected_key: Option<&str>,
) -> BTreeMap<String, String> {
    let system = build_extraction_prompt(sequence, expected_key);

    let user_message = if rolling_context.is_empty() {
        format!("USER'S ANSWER: {}", user_input)
    } else {
        format!(
            "CONVERSATION CONTEXT:\n{}\n\nUSER'S LATEST ANSWER: {}",
            rolling_context, user_input
        )
    };

    let response = match oracle.complete(CompletionRequest::single(system, user_message, 0.0)) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("extraction call failed, treating as empty: {}", e);
            return BTreeMap::new();
        }
    };

    parse_attribute_json(&response)
}

/// Build the system prompt enumerating the attributes to look for
fn build_extraction_prompt(sequence: &[QuestionSpec], expected_key: Option<&str>) -> String {
    let attr_lines: Vec<String> = sequence
        .iter()
        .filter(|s| s.kind == QuestionKind::Mandatory && s.prompt.is_some())
        .take(MAX_PROMPT_ATTRIBUTES)
        .map(|s| {
            let question = s.prompt.unwrap_or_default();
            let truncated: String = question.chars().take(50).collect();
            let examples = if s.examples.is_empty() {
                "any value".to_string()
            } else {
                s.examples
                    .iter()
                    .take(2)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            format!("- {}: {}... (e.g., {})", s.key, truncated, examples)
        })
        .collect();

    let mut prompt = format!(
        "You are extracting ORDER PROCESS information from a client interview.\n\
         The user may mention MULTIPLE things in one response. Extract ALL that apply.\n\n\
         ATTRIBUTES TO LOOK FOR:\n{}\n\n\
         RULES:\n\
         1. Extract EVERY attribute the user mentions, not just one\n\
         2. Even brief mentions count (e.g., 'PDF' -> manual_intake_method: 'PDF')\n\
         3. If they mention 'EDI, portal, and email/PDF' - that answers MULTIPLE questions\n\
         4. Return valid JSON with ALL found attributes\n\
         5. If nothing found, return {{}}\n",
        attr_lines.join("\n")
    );

    if let Some(key) = expected_key {
        prompt.push_str(&format!(
            "\nThe question just asked maps to `{}`. A short or bare answer should be \
             recorded under that key.\n",
            key
        ));
    }

    prompt.push_str(
        "\nEXAMPLE: If the user says 'We get orders via EDI from retailers and signed PDFs by email'\n\
         Return: {\"order_origin_channels\": \"EDI from retailers, email with signed PDFs\", \
         \"manual_intake_method\": \"Email with signed PDF attachments\"}",
    );

    prompt
}

/// Pull the first `{...}` span out of the oracle's reply and read it as a
/// flat string map. String values pass through; numbers and booleans are
/// stringified; nulls, arrays and nested objects are dropped.
pub fn parse_attribute_json(response: &str) -> BTreeMap<String, String> {
    let trimmed = response.trim();
    let Some(start) = trimmed.find('{') else {
        return BTreeMap::new();
    };
    let Some(end) = trimmed.rfind('}') else {
        return BTreeMap::new();
    };
    if end < start {
        return BTreeMap::new();
    }

    let parsed: serde_json::Value = match serde_json::from_str(&trimmed[start..=end]) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("extraction JSON parse error: {}", e);
            return BTreeMap::new();
        }
    };

    let Some(object) = parsed.as_object() else {
        return BTreeMap::new();
    };

    let mut result = BTreeMap::new();
    for (key, value) in object {
        let coerced = match value {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        };
        if let Some(v) = coerced {
            if !v.is_empty() {
                result.insert(key.clone(), v);
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::CompletionError;
    use crate::schema::question_sequence;

    /// Oracle stub returning a fixed response
    struct FixedOracle(Result<String, ()>);

    impl CompletionService for FixedOracle {
        fn complete(&self, _request: CompletionRequest) -> Result<String, CompletionError> {
            self.0
                .clone()
                .map_err(|_| CompletionError::Request("stubbed outage".to_string()))
        }
    }

    #[test]
    fn test_parse_tolerates_surrounding_commentary() {
        let response = "Sure! Here is what I found:\n{\"credit_approval_type\": \"Both\"}\nLet me know.";
        let parsed = parse_attribute_json(response);
        assert_eq!(parsed.get("credit_approval_type").map(String::as_str), Some("Both"));
    }

    #[test]
    fn test_parse_failure_is_empty() {
        assert!(parse_attribute_json("no json here").is_empty());
        assert!(parse_attribute_json("{broken json").is_empty());
        assert!(parse_attribute_json("").is_empty());
        assert!(parse_attribute_json("} {").is_empty());
    }

    #[test]
    fn test_parse_coerces_scalars_and_drops_the_rest() {
        let response = r#"{"verification_success_rate": 80, "has_auto_approval": true,
            "ignored_null": null, "ignored_list": ["a"], "ignored_obj": {"x": 1}}"#;
        let parsed = parse_attribute_json(response);
        assert_eq!(parsed.get("verification_success_rate").map(String::as_str), Some("80"));
        assert_eq!(parsed.get("has_auto_approval").map(String::as_str), Some("true"));
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_oracle_outage_yields_empty() {
        let sequence = question_sequence();
        let oracle = FixedOracle(Err(()));
        let result =
            extract_mentioned_attributes(&oracle, &sequence, "we use EDI", "", None);
        assert!(result.is_empty());
    }

    #[test]
    fn test_multi_attribute_response_passes_through() {
        let sequence = question_sequence();
        let oracle = FixedOracle(Ok(
            r#"{"order_origin_channels": "EDI and email", "manual_intake_method": "Email PDF"}"#
                .to_string(),
        ));
        let result =
            extract_mentioned_attributes(&oracle, &sequence, "EDI and email PDFs", "", None);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_prompt_mentions_expected_key() {
        let sequence = question_sequence();
        let prompt = build_extraction_prompt(&sequence, Some("order_origin_channels"));
        assert!(prompt.contains("`order_origin_channels`"));
        let prompt = build_extraction_prompt(&sequence, None);
        assert!(!prompt.contains("maps to"));
    }
}
