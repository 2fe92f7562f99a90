// Gap Analyzer - compares a collected snapshot against the reference table
//
// Pure and deterministic: no oracle call, identical input gives identical
// output. Heuristic matchers run in a fixed priority order; the first hit
// marks the attribute as a gap with its issue string.

use super::reference::BestPractice;
use crate::models::{CollectedData, NOT_DISCUSSED};
use regex::Regex;
use serde::{Deserialize, Serialize};

// ============================================================================
// Result Types
// ============================================================================

/// An attribute deviating from the reference standard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapFinding {
    pub attribute: String,
    pub current: String,
    pub standard: String,
    pub issue: String,
    pub risk: String,
}

/// An attribute aligned with the reference standard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignedAttribute {
    pub attribute: String,
    pub current: String,
}

/// A reference attribute not captured yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingAttribute {
    pub attribute: String,
    pub standard: String,
    pub risk: String,
}

/// Full gap analysis over one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapResult {
    pub gaps: Vec<GapFinding>,
    pub strengths: Vec<AlignedAttribute>,
    pub missing: Vec<MissingAttribute>,
    /// round(100 × strengths / reference table size): the denominator is the
    /// whole table, so uncaptured attributes hold the score down
    pub score: u8,
}

impl GapResult {
    pub fn gap_keys(&self) -> impl Iterator<Item = &str> {
        self.gaps.iter().map(|g| g.attribute.as_str())
    }

    pub fn has_gap(&self, key: &str) -> bool {
        self.gaps.iter().any(|g| g.attribute == key)
    }

    pub fn is_aligned(&self, key: &str) -> bool {
        self.strengths.iter().any(|s| s.attribute == key)
    }

    pub fn is_missing(&self, key: &str) -> bool {
        self.missing.iter().any(|m| m.attribute == key)
    }
}

// ============================================================================
// Matchers
// ============================================================================

/// One gap heuristic: inspects the lower-cased captured value against a
/// reference entry, returns the issue string on a hit.
struct GapMatcher {
    name: &'static str,
    check: fn(&BestPractice, &str) -> Option<String>,
}

/// Priority-ordered matcher list. First hit wins.
const MATCHERS: &[GapMatcher] = &[
    GapMatcher {
        name: "manual_process",
        check: manual_process,
    },
    GapMatcher {
        name: "low_success_rate",
        check: low_success_rate,
    },
    GapMatcher {
        name: "fragmentation",
        check: fragmentation,
    },
    GapMatcher {
        name: "manual_notification",
        check: manual_notification,
    },
];

const MANUAL_WORDS: &[&str] = &["manual", "paper", "email", "spreadsheet", "excel"];
const AUTOMATION_WORDS: &[&str] = &["automated", "system", "real-time"];
const FRAGMENTATION_WORDS: &[&str] = &["separate", "different system", "re-key", "manual entry"];
const NOTIFY_STANDARD_WORDS: &[&str] = &["dashboard", "automated", "alert"];
const NOTIFY_MANUAL_WORDS: &[&str] = &["phone", "call", "email"];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Manual/paper handling where the standard expects automation
fn manual_process(practice: &BestPractice, value: &str) -> Option<String> {
    let standard = practice.standard.to_lowercase();
    if contains_any(value, MANUAL_WORDS) && contains_any(&standard, AUTOMATION_WORDS) {
        return Some("Manual process vs automated standard".to_string());
    }
    None
}

/// Success rate below the floor on rate-style attributes. Leading
/// non-digit characters are stripped before parsing.
fn low_success_rate(practice: &BestPractice, value: &str) -> Option<String> {
    let floor = practice.success_rate_floor?;
    let number = Regex::new(r"\d+").unwrap();
    let rate: u32 = number.find(value)?.as_str().parse().ok()?;
    if rate < floor {
        return Some(format!("Success rate {}% below the {}% floor", rate, floor));
    }
    None
}

/// Data hopping between disconnected systems
fn fragmentation(_practice: &BestPractice, value: &str) -> Option<String> {
    if contains_any(value, FRAGMENTATION_WORDS) {
        return Some("System fragmentation vs integrated approach".to_string());
    }
    None
}

/// Phone/email notification where the standard expects dashboards or alerts
fn manual_notification(practice: &BestPractice, value: &str) -> Option<String> {
    let standard = practice.standard.to_lowercase();
    if contains_any(&standard, NOTIFY_STANDARD_WORDS) && contains_any(value, NOTIFY_MANUAL_WORDS) {
        return Some("Manual notification vs automated alerts".to_string());
    }
    None
}

// ============================================================================
// Analysis
// ============================================================================

/// Classify every reference attribute as gap, strength or missing and score
/// the snapshot. A force-skipped sentinel counts as missing: an abandoned
/// topic must not inflate either list.
pub fn analyze_gaps(data: &CollectedData, table: &[BestPractice]) -> GapResult {
    let mut gaps = Vec::new();
    let mut strengths = Vec::new();
    let mut missing = Vec::new();

    for practice in table {
        let value = match data.get(practice.key) {
            Some(v) if v != NOT_DISCUSSED => v,
            _ => {
                missing.push(MissingAttribute {
                    attribute: practice.key.to_string(),
                    standard: practice.standard.to_string(),
                    risk: practice.risk_if_missing.to_string(),
                });
                continue;
            }
        };

        let lower = value.to_lowercase();
        let hit = MATCHERS
            .iter()
            .find_map(|m| (m.check)(practice, &lower).map(|issue| (m.name, issue)));

        match hit {
            Some((name, issue)) => {
                log::debug!("gap matcher '{}' hit on {}", name, practice.key);
                gaps.push(GapFinding {
                    attribute: practice.key.to_string(),
                    current: value.to_string(),
                    standard: practice.standard.to_string(),
                    issue,
                    risk: practice.risk_if_missing.to_string(),
                });
            }
            None => strengths.push(AlignedAttribute {
                attribute: practice.key.to_string(),
                current: value.to_string(),
            }),
        }
    }

    let score = if table.is_empty() {
        0
    } else {
        ((strengths.len() * 100) as f64 / table.len() as f64).round() as u8
    };

    GapResult {
        gaps,
        strengths,
        missing,
        score,
    }
}

// ============================================================================
// Summary
// ============================================================================

fn title_case(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render the gap analysis as a Markdown report
pub fn generate_gap_summary(result: &GapResult) -> String {
    let mut summary = String::from("## Gap Analysis Summary\n\n");
    summary.push_str(&format!("**Alignment Score: {}%**\n\n", result.score));

    if result.score >= 80 {
        summary.push_str("**Overall: strong alignment with the reference process**\n\n");
    } else if result.score >= 50 {
        summary.push_str("**Overall: moderate alignment, improvement opportunities exist**\n\n");
    } else {
        summary.push_str("**Overall: significant gaps identified**\n\n");
    }

    if !result.gaps.is_empty() {
        summary.push_str("### Gaps Identified\n\n");
        for (i, gap) in result.gaps.iter().enumerate() {
            summary.push_str(&format!("**{}. {}**\n", i + 1, title_case(&gap.attribute)));
            summary.push_str(&format!("   - *Current:* {}\n", gap.current));
            summary.push_str(&format!("   - *Standard:* {}\n", gap.standard));
            summary.push_str(&format!("   - *Issue:* {}\n", gap.issue));
            summary.push_str(&format!("   - *Risk:* {}\n\n", gap.risk));
        }
    }

    if !result.strengths.is_empty() {
        summary.push_str("### Areas of Strength\n\n");
        for strength in result.strengths.iter().take(5) {
            let mut current = strength.current.clone();
            if current.len() > 50 {
                current.truncate(50);
            }
            summary.push_str(&format!(
                "- **{}**: {}\n",
                title_case(&strength.attribute),
                current
            ));
        }
    }

    if !result.missing.is_empty() {
        summary.push_str(&format!(
            "\n### Not Yet Captured\n\n{} reference attributes have no answer yet; \
             the score treats them as unaligned.\n",
            result.missing.len()
        ));
    }

    summary.push_str("\n### Recommendations\n\n");
    let mut rec = 1;
    if result.has_gap("manual_intake_method") || result.has_gap("order_origin_channels") {
        summary.push_str(&format!(
            "{}. **Automate manual intake**: consider OCR/e-mail parsing for order capture\n",
            rec
        ));
        rec += 1;
    }
    if result.has_gap("credit_decision_to_sales") || result.has_gap("credit_decision_to_customer") {
        summary.push_str(&format!(
            "{}. **Automate notifications**: move from phone/e-mail to dashboard alerts\n",
            rec
        ));
        rec += 1;
    }
    if result.gap_keys().any(|k| k.contains("verification")) {
        summary.push_str(&format!(
            "{}. **Tighten validation**: add real-time validation rules at order entry\n",
            rec
        ));
    }

    summary
}
