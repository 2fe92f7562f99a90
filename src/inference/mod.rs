// Inference Engine - derives secondary attributes from captured answers
//
// Rules are small closed classifiers over free text: an ordered list of
// (keyword set, label) pairs checked by case-insensitive substring match,
// with a fallback label when nothing matches. No external calls.

use crate::models::{CollectedData, NOT_DISCUSSED};
use crate::schema::{QuestionKind, QuestionSpec};

// ============================================================================
// Keyword Classifier
// ============================================================================

/// One (keywords, label) rule inside a classifier
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub keywords: &'static [&'static str],
    pub label: &'static str,
}

/// Ordered keyword classifier mapping free text to a closed label set.
/// Rules are evaluated in priority order; the first whose keyword list hits
/// the lower-cased input wins.
#[derive(Debug, Clone, Copy)]
pub struct KeywordClassifier {
    pub name: &'static str,
    pub rules: &'static [KeywordRule],
    pub fallback: &'static str,
}

impl KeywordClassifier {
    pub fn classify(&self, text: &str) -> &'static str {
        let lower = text.to_lowercase();
        for rule in self.rules {
            if rule.keywords.iter().any(|kw| lower.contains(kw)) {
                return rule.label;
            }
        }
        self.fallback
    }
}

// ============================================================================
// O2C Classifiers
// ============================================================================

/// Does any order intake channel involve a manual hand-off?
pub const MANUAL_CHANNEL: KeywordClassifier = KeywordClassifier {
    name: "manual_channel",
    rules: &[KeywordRule {
        keywords: &["manual", "email", "pdf", "phone", "fax", "paper"],
        label: "Yes",
    }],
    fallback: "No",
};

/// Is the order system of record an ERP?
pub const ERP_SYSTEM: KeywordClassifier = KeywordClassifier {
    name: "erp_system",
    rules: &[KeywordRule {
        keywords: &["erp", "sap", "oracle", "netsuite", "dynamics"],
        label: "ERP",
    }],
    fallback: "Non-ERP",
};

/// Does credit approval include an automatic path?
pub const AUTO_APPROVAL: KeywordClassifier = KeywordClassifier {
    name: "auto_approval",
    rules: &[KeywordRule {
        keywords: &["auto", "threshold", "both"],
        label: "Yes",
    }],
    fallback: "No",
};

/// Does credit approval include a manual review path?
pub const MANUAL_CREDIT: KeywordClassifier = KeywordClassifier {
    name: "manual_credit",
    rules: &[KeywordRule {
        keywords: &["manual", "analyst", "review", "queue", "both"],
        label: "Yes",
    }],
    fallback: "No",
};

// ============================================================================
// Inference Pass
// ============================================================================

/// Derive every Inferred attribute whose source is present and whose own key
/// is still absent. Idempotent: with no new source data a second pass writes
/// nothing. Returns the number of keys written.
pub fn run_inferences(sequence: &[QuestionSpec], data: &mut CollectedData) -> usize {
    let mut written = 0;
    for spec in sequence {
        if spec.kind != QuestionKind::Inferred {
            continue;
        }
        let Some(inference) = &spec.inference else {
            continue;
        };
        if data.contains(spec.key) {
            continue;
        }
        let Some(source_value) = data.get(inference.source) else {
            continue;
        };
        if source_value == NOT_DISCUSSED {
            // a skipped source answers nothing; deriving from the sentinel
            // text would be classification noise
            continue;
        }
        let label = inference.rule.classify(source_value);
        if data.record(spec.key, label) {
            log::debug!("[Inferred] {}: {}", spec.key, label);
            written += 1;
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::question_sequence;

    #[test]
    fn test_manual_channel_classifier() {
        assert_eq!(MANUAL_CHANNEL.classify("EDI and signed PDFs by email"), "Yes");
        assert_eq!(MANUAL_CHANNEL.classify("EDI 850 and B2B portal only"), "No");
        assert_eq!(MANUAL_CHANNEL.classify("Phone orders to the desk"), "Yes");
    }

    #[test]
    fn test_erp_classifier() {
        assert_eq!(ERP_SYSTEM.classify("SAP ECC 6.0"), "ERP");
        assert_eq!(ERP_SYSTEM.classify("NetSuite"), "ERP");
        assert_eq!(ERP_SYSTEM.classify("A custom Access database"), "Non-ERP");
    }

    #[test]
    fn test_credit_classifiers() {
        assert_eq!(AUTO_APPROVAL.classify("Automatic under a threshold"), "Yes");
        assert_eq!(AUTO_APPROVAL.classify("All orders reviewed by hand"), "No");
        assert_eq!(MANUAL_CREDIT.classify("Credit analyst works a queue"), "Yes");
        assert_eq!(MANUAL_CREDIT.classify("Fully automated scoring"), "No");
        // "both" unlocks both branches
        assert_eq!(AUTO_APPROVAL.classify("Both, depending on size"), "Yes");
        assert_eq!(MANUAL_CREDIT.classify("Both, depending on size"), "Yes");
    }

    #[test]
    fn test_run_inferences_is_idempotent() {
        let sequence = question_sequence();
        let mut data = CollectedData::new();
        data.record("order_origin_channels", "Email with signed PDF, EDI 850");

        let first = run_inferences(&sequence, &mut data);
        assert_eq!(first, 1);
        assert_eq!(data.get("has_manual_intake"), Some("Yes"));

        let snapshot = data.clone();
        let second = run_inferences(&sequence, &mut data);
        assert_eq!(second, 0);
        assert_eq!(data, snapshot);
    }

    #[test]
    fn test_inference_waits_for_source() {
        let sequence = question_sequence();
        let mut data = CollectedData::new();
        assert_eq!(run_inferences(&sequence, &mut data), 0);
        assert!(!data.contains("has_manual_intake"));

        data.record("credit_approval_type", "Auto-approve under $50k, analyst above");
        run_inferences(&sequence, &mut data);
        assert_eq!(data.get("has_auto_approval"), Some("Yes"));
        assert_eq!(data.get("has_manual_credit"), Some("Yes"));
    }

    #[test]
    fn test_inference_never_overwrites() {
        let sequence = question_sequence();
        let mut data = CollectedData::new();
        data.record("primary_order_system", "SAP");
        data.record("uses_erp", "Non-ERP");
        run_inferences(&sequence, &mut data);
        // first-write rule holds even when the rule disagrees
        assert_eq!(data.get("uses_erp"), Some("Non-ERP"));
    }
}
