// Attribute Schema - the ordered, conditionally-branching interview flow
//
// The flow is a flat sequence of QuestionSpecs in canonical traversal order.
// Hierarchical ids ("4.2.1") are display tokens only; control flow is driven
// entirely by sequence position, preconditions and inference sources.

mod flow;

pub use flow::question_sequence;

use crate::inference::KeywordClassifier;
use crate::models::{CollectedData, DiscoveryProgress, FocusArea};
use std::collections::HashSet;
use thiserror::Error;

// ============================================================================
// Question Specs
// ============================================================================

/// Whether a node is asked directly or computed from another answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Mandatory,
    Inferred,
}

/// Gate evaluated against collected data before a node applies.
/// An unsatisfied precondition skips the node entirely: it is neither asked
/// nor counted toward totals.
#[derive(Debug, Clone)]
pub enum Precondition {
    /// The referenced key holds exactly this value
    KeyEquals {
        key: &'static str,
        value: &'static str,
    },
}

impl Precondition {
    pub fn referenced_key(&self) -> &'static str {
        match self {
            Precondition::KeyEquals { key, .. } => key,
        }
    }

    pub fn evaluate(&self, data: &CollectedData) -> bool {
        match self {
            Precondition::KeyEquals { key, value } => data.get(key) == Some(*value),
        }
    }
}

/// Derivation attached to an Inferred node
#[derive(Debug, Clone)]
pub struct Inference {
    /// Captured key feeding the derivation
    pub source: &'static str,
    /// Pure classifier computing the derived label
    pub rule: KeywordClassifier,
}

/// One node in the interview flow
#[derive(Debug, Clone)]
pub struct QuestionSpec {
    /// Hierarchical position token, display/ordering only
    pub id: &'static str,
    /// Unique attribute identifier, stable across releases
    pub key: &'static str,
    pub kind: QuestionKind,
    /// Interview topic grouping, used for focus and stuck tracking
    pub topic: &'static str,
    /// Question text; absent for Inferred nodes
    pub prompt: Option<&'static str>,
    /// Illustrative answers, shown to the user and fed to the extractor
    pub examples: &'static [&'static str],
    pub precondition: Option<Precondition>,
    pub inference: Option<Inference>,
}

impl QuestionSpec {
    /// Whether this node applies given current data
    pub fn applies(&self, data: &CollectedData) -> bool {
        self.precondition
            .as_ref()
            .map(|p| p.evaluate(data))
            .unwrap_or(true)
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Configuration faults in the question flow. These abort initialization;
/// none of them is recoverable at runtime.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("duplicate attribute key '{0}'")]
    DuplicateKey(String),

    #[error("node '{key}' references '{referenced}' which no earlier node produces")]
    ForwardReference { key: String, referenced: String },

    #[error("mandatory node '{0}' has no prompt")]
    MissingPrompt(String),

    #[error("inferred node '{0}' must not carry a prompt")]
    UnexpectedPrompt(String),

    #[error("inferred node '{0}' has no inference rule")]
    MissingInference(String),
}

/// Validate the flow invariants: globally unique keys, prompts exactly on
/// Mandatory nodes, and every precondition or inference source referencing
/// only keys produced by earlier-positioned nodes (which also rules out
/// self-reference and cycles).
pub fn validate(sequence: &[QuestionSpec]) -> Result<(), SchemaError> {
    let mut seen: HashSet<&str> = HashSet::new();

    for spec in sequence {
        match spec.kind {
            QuestionKind::Mandatory => {
                if spec.prompt.is_none() {
                    return Err(SchemaError::MissingPrompt(spec.key.to_string()));
                }
            }
            QuestionKind::Inferred => {
                if spec.prompt.is_some() {
                    return Err(SchemaError::UnexpectedPrompt(spec.key.to_string()));
                }
                match &spec.inference {
                    None => return Err(SchemaError::MissingInference(spec.key.to_string())),
                    Some(inf) if !seen.contains(inf.source) => {
                        return Err(SchemaError::ForwardReference {
                            key: spec.key.to_string(),
                            referenced: inf.source.to_string(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        if let Some(pre) = &spec.precondition {
            let referenced = pre.referenced_key();
            if !seen.contains(referenced) {
                return Err(SchemaError::ForwardReference {
                    key: spec.key.to_string(),
                    referenced: referenced.to_string(),
                });
            }
        }

        if !seen.insert(spec.key) {
            return Err(SchemaError::DuplicateKey(spec.key.to_string()));
        }
    }

    Ok(())
}

// ============================================================================
// Applicability Queries
// ============================================================================

/// Mandatory nodes whose precondition holds given current data, in flow order
pub fn applicable_mandatory<'a>(
    sequence: &'a [QuestionSpec],
    data: &CollectedData,
) -> Vec<&'a QuestionSpec> {
    sequence
        .iter()
        .filter(|s| s.kind == QuestionKind::Mandatory && s.applies(data))
        .collect()
}

/// Applicable mandatory nodes that hold no value yet (sentinel counts as
/// answered), in flow order
pub fn missing_mandatory<'a>(
    sequence: &'a [QuestionSpec],
    data: &CollectedData,
) -> Vec<&'a QuestionSpec> {
    applicable_mandatory(sequence, data)
        .into_iter()
        .filter(|s| !data.contains(s.key))
        .collect()
}

/// First unanswered applicable mandatory node: the current interview focus
pub fn next_question<'a>(
    sequence: &'a [QuestionSpec],
    data: &CollectedData,
) -> Option<&'a QuestionSpec> {
    missing_mandatory(sequence, data).into_iter().next()
}

/// True once every applicable mandatory node holds a value
pub fn is_complete(sequence: &[QuestionSpec], data: &CollectedData) -> bool {
    missing_mandatory(sequence, data).is_empty()
}

/// Outstanding attributes grouped by topic, preserving flow order
pub fn missing_by_topic(sequence: &[QuestionSpec], data: &CollectedData) -> Vec<FocusArea> {
    let mut areas: Vec<FocusArea> = Vec::new();
    for spec in missing_mandatory(sequence, data) {
        match areas.last_mut() {
            Some(area) if area.topic == spec.topic => {
                area.attributes.push(spec.key.to_string())
            }
            _ => areas.push(FocusArea {
                topic: spec.topic.to_string(),
                attributes: vec![spec.key.to_string()],
            }),
        }
    }
    areas
}

/// The topic currently blocking completion, if any
pub fn current_focus(sequence: &[QuestionSpec], data: &CollectedData) -> Option<FocusArea> {
    missing_by_topic(sequence, data).into_iter().next()
}

/// Keys of applicable mandatory nodes belonging to one topic
pub fn topic_mandatory_keys(
    sequence: &[QuestionSpec],
    data: &CollectedData,
    topic: &str,
) -> Vec<String> {
    applicable_mandatory(sequence, data)
        .into_iter()
        .filter(|s| s.topic == topic)
        .map(|s| s.key.to_string())
        .collect()
}

/// Progress snapshot over the applicable mandatory checklist
pub fn progress(sequence: &[QuestionSpec], data: &CollectedData) -> DiscoveryProgress {
    let applicable = applicable_mandatory(sequence, data);
    let captured = applicable
        .iter()
        .filter(|s| data.is_discussed(s.key))
        .count();
    DiscoveryProgress {
        captured,
        total: applicable.len(),
        current_focus: current_focus(sequence, data),
    }
}

/// Look up a node by its attribute key
pub fn find_by_key<'a>(sequence: &'a [QuestionSpec], key: &str) -> Option<&'a QuestionSpec> {
    sequence.iter().find(|s| s.key == key)
}

/// Look up a node by its hierarchical id
pub fn find_by_id<'a>(sequence: &'a [QuestionSpec], id: &str) -> Option<&'a QuestionSpec> {
    sequence.iter().find(|s| s.id == id)
}
