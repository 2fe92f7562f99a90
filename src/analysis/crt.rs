// Constraint analysis - current-reality tree over the captured process
//
// The oracle proposes undesirable effects, intermediate effects and root
// causes with causal links. When it fails or returns noise, a deterministic
// fallback derives the tree from the captured manual-intake / manual-credit
// flags, so the analysis endpoint always has something to show.

use crate::llm::{CompletionRequest, CompletionService};
use crate::models::CollectedData;
use serde::{Deserialize, Serialize};

// ============================================================================
// Tree Types
// ============================================================================

/// One node in the current-reality tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrtNode {
    pub id: String,
    pub label: String,
}

/// One causal link, pointing from cause to effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrtEdge {
    pub from: String,
    pub to: String,
}

/// Current-reality tree: root causes at the bottom, undesirable effects on
/// top, intermediate effects connecting them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrtAnalysis {
    pub udes: Vec<CrtNode>,
    pub intermediate_effects: Vec<CrtNode>,
    pub root_causes: Vec<CrtNode>,
    pub connections: Vec<CrtEdge>,
}

impl CrtAnalysis {
    pub fn is_empty(&self) -> bool {
        self.udes.is_empty() && self.root_causes.is_empty()
    }
}

// ============================================================================
// Analysis
// ============================================================================

const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are a constraint-analysis expert reviewing an Order-to-Cash (O2C) process.

Based on the captured process data, identify:
1. UDEs (Undesirable Effects): observable negative outcomes in the process
2. Intermediate Effects: mid-level symptoms connecting root causes to UDEs
3. Root Causes: underlying system/process issues causing the problems

Follow these rules:
- Identify 3-5 UDEs based on process gaps and inefficiencies
- Identify 3-5 Intermediate Effects that explain the causal chain
- Identify 2-4 Root Causes that are the fundamental issues
- Create logical cause-effect connections (from root causes UP to UDEs)

Return your analysis as JSON in this exact format:
{
    "udes": [{"id": "UDE1", "label": "Short description of negative outcome"}],
    "intermediate_effects": [{"id": "I1", "label": "Short description of symptom"}],
    "root_causes": [{"id": "RC1", "label": "Short description of root cause"}],
    "connections": [{"from": "RC1", "to": "I1"}, {"from": "I1", "to": "UDE1"}]
}

Focus on issues like manual data entry errors, credit approval bottlenecks,
communication delays between teams, system bypasses, and single points of
failure."#;

/// Build the current-reality tree for a snapshot. Returns None for an empty
/// snapshot; otherwise the oracle's tree, or the deterministic fallback when
/// the oracle fails.
pub fn analyze_constraints(
    oracle: &dyn CompletionService,
    data: &CollectedData,
) -> Option<CrtAnalysis> {
    if data.is_empty() {
        return None;
    }

    let data_summary: String = data
        .iter()
        .filter(|(key, _)| !key.starts_with("has_") && !key.starts_with("uses_"))
        .map(|(key, value)| format!("- {}: {}", key, value))
        .collect::<Vec<_>>()
        .join("\n");

    let user_message = format!(
        "Analyze this Order-to-Cash process data and identify the current-reality tree:\n\n\
         CAPTURED PROCESS DATA:\n{}\n\n\
         Return ONLY valid JSON with udes, intermediate_effects, root_causes, and connections.",
        data_summary
    );

    let analysis = oracle
        .complete(CompletionRequest::single(
            ANALYSIS_SYSTEM_PROMPT,
            user_message,
            0.3,
        ))
        .ok()
        .and_then(|response| parse_analysis(&response));

    Some(analysis.unwrap_or_else(|| default_analysis(data)))
}

/// Parse the oracle's JSON, tolerating fenced code blocks and commentary
fn parse_analysis(response: &str) -> Option<CrtAnalysis> {
    let mut text = response.trim();
    if let Some(fenced) = text.split("```json").nth(1) {
        text = fenced.split("```").next().unwrap_or(fenced);
    } else if let Some(fenced) = text.split("```").nth(1) {
        text = fenced;
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }

    match serde_json::from_str::<CrtAnalysis>(&text[start..=end]) {
        Ok(analysis) if !analysis.is_empty() => Some(analysis),
        Ok(_) => None,
        Err(e) => {
            log::warn!("constraint analysis JSON parse error: {}", e);
            None
        }
    }
}

/// Deterministic tree derived from the captured process flags, used when the
/// oracle gives no usable output
fn default_analysis(data: &CollectedData) -> CrtAnalysis {
    let mut analysis = CrtAnalysis::default();

    if data.get("has_manual_intake") == Some("Yes") {
        analysis.udes.push(CrtNode {
            id: "UDE1".to_string(),
            label: "Downstream delays due to missing order data".to_string(),
        });
        analysis.udes.push(CrtNode {
            id: "UDE2".to_string(),
            label: "Inconsistent order entry quality across channels".to_string(),
        });
        analysis.intermediate_effects.push(CrtNode {
            id: "I1".to_string(),
            label: "Manual orders often lack necessary specific info".to_string(),
        });
        analysis.intermediate_effects.push(CrtNode {
            id: "I2".to_string(),
            label: "Order entry prioritizes speed over checklist adherence".to_string(),
        });
        analysis.root_causes.push(CrtNode {
            id: "RC1".to_string(),
            label: "Entry checklist is bypassable for non-core fields".to_string(),
        });
        analysis.root_causes.push(CrtNode {
            id: "RC2".to_string(),
            label: "The same people handle data entry and verification".to_string(),
        });
        analysis.connections.extend([
            CrtEdge { from: "RC1".to_string(), to: "I2".to_string() },
            CrtEdge { from: "RC2".to_string(), to: "I2".to_string() },
            CrtEdge { from: "I2".to_string(), to: "I1".to_string() },
            CrtEdge { from: "I1".to_string(), to: "UDE1".to_string() },
            CrtEdge { from: "I1".to_string(), to: "UDE2".to_string() },
        ]);
    }

    if data.get("has_manual_credit") == Some("Yes") {
        analysis.udes.push(CrtNode {
            id: "UDE3".to_string(),
            label: "High manual effort for credit approvals".to_string(),
        });
        analysis.udes.push(CrtNode {
            id: "UDE4".to_string(),
            label: "Delayed notification to customer on order status".to_string(),
        });
        analysis.intermediate_effects.push(CrtNode {
            id: "I3".to_string(),
            label: "Credit approval bottlenecks during high volume".to_string(),
        });
        analysis.intermediate_effects.push(CrtNode {
            id: "I4".to_string(),
            label: "Sales acts as information relay between teams".to_string(),
        });
        analysis.root_causes.push(CrtNode {
            id: "RC3".to_string(),
            label: "Credit approvals rely on manual review".to_string(),
        });
        analysis.root_causes.push(CrtNode {
            id: "RC4".to_string(),
            label: "No automated notification for held orders".to_string(),
        });
        analysis.connections.extend([
            CrtEdge { from: "RC3".to_string(), to: "I3".to_string() },
            CrtEdge { from: "I3".to_string(), to: "UDE3".to_string() },
            CrtEdge { from: "RC3".to_string(), to: "I4".to_string() },
            CrtEdge { from: "RC4".to_string(), to: "I4".to_string() },
            CrtEdge { from: "I4".to_string(), to: "UDE4".to_string() },
        ]);
    }

    if analysis.udes.is_empty() {
        analysis.udes.push(CrtNode {
            id: "UDE1".to_string(),
            label: "Process variability across order channels".to_string(),
        });
        analysis.udes.push(CrtNode {
            id: "UDE2".to_string(),
            label: "Potential for data inconsistencies".to_string(),
        });
        analysis.intermediate_effects.push(CrtNode {
            id: "I1".to_string(),
            label: "Varying process maturity across channels".to_string(),
        });
        analysis.root_causes.push(CrtNode {
            id: "RC1".to_string(),
            label: "Multiple intake channels with different workflows".to_string(),
        });
        analysis.root_causes.push(CrtNode {
            id: "RC2".to_string(),
            label: "Manual touchpoints in order processing".to_string(),
        });
        analysis.connections.extend([
            CrtEdge { from: "RC1".to_string(), to: "I1".to_string() },
            CrtEdge { from: "RC2".to_string(), to: "I1".to_string() },
            CrtEdge { from: "I1".to_string(), to: "UDE1".to_string() },
            CrtEdge { from: "I1".to_string(), to: "UDE2".to_string() },
        ]);
    }

    analysis
}

/// Markdown summary of the tree
pub fn generate_crt_summary(analysis: &CrtAnalysis) -> String {
    let mut summary = String::from("## Current Reality Tree Analysis\n\n");
    summary.push_str(
        "Constraint analysis of the captured Order-to-Cash process.\n\n",
    );

    summary.push_str("### Identified Undesirable Effects\n\n");
    for ude in &analysis.udes {
        summary.push_str(&format!("- **{}**: {}\n", ude.id, ude.label));
    }

    summary.push_str("\n### Root Causes\n\n");
    for rc in &analysis.root_causes {
        summary.push_str(&format!("- **{}**: {}\n", rc.id, rc.label));
    }

    summary.push_str(
        "\n### Core Problem\n\nThe tree points at **process variability and manual \
         hand-offs** as the core constraints. Addressing the root causes cascades through \
         the intermediate symptoms and removes or reduces the undesirable effects.\n",
    );

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::CompletionError;

    struct FixedOracle(Option<String>);

    impl CompletionService for FixedOracle {
        fn complete(&self, _request: CompletionRequest) -> Result<String, CompletionError> {
            self.0
                .clone()
                .ok_or_else(|| CompletionError::Request("stubbed outage".to_string()))
        }
    }

    fn manual_data() -> CollectedData {
        let mut data = CollectedData::new();
        data.record("order_origin_channels", "Email PDFs mostly");
        data.record("has_manual_intake", "Yes");
        data
    }

    #[test]
    fn test_empty_snapshot_yields_none() {
        let oracle = FixedOracle(None);
        assert!(analyze_constraints(&oracle, &CollectedData::new()).is_none());
    }

    #[test]
    fn test_oracle_outage_falls_back_deterministically() {
        let oracle = FixedOracle(None);
        let first = analyze_constraints(&oracle, &manual_data()).unwrap();
        let second = analyze_constraints(&oracle, &manual_data()).unwrap();
        assert_eq!(first, second);
        assert!(!first.udes.is_empty());
        assert!(first.root_causes.iter().any(|rc| rc.id == "RC1"));
    }

    #[test]
    fn test_fenced_oracle_json_is_parsed() {
        let response = "```json\n{\"udes\": [{\"id\": \"UDE1\", \"label\": \"Slow orders\"}],\
            \"intermediate_effects\": [], \"root_causes\": [{\"id\": \"RC1\", \
            \"label\": \"Manual re-keying\"}], \"connections\": [{\"from\": \"RC1\", \
            \"to\": \"UDE1\"}]}\n```";
        let oracle = FixedOracle(Some(response.to_string()));
        let analysis = analyze_constraints(&oracle, &manual_data()).unwrap();
        assert_eq!(analysis.udes[0].label, "Slow orders");
        assert_eq!(analysis.connections[0].from, "RC1");
    }

    #[test]
    fn test_noise_response_falls_back() {
        let oracle = FixedOracle(Some("I could not produce the tree, sorry.".to_string()));
        let analysis = analyze_constraints(&oracle, &manual_data()).unwrap();
        // fallback tree for manual intake
        assert!(analysis.udes.iter().any(|u| u.id == "UDE1"));
        assert!(analysis.intermediate_effects.iter().any(|i| i.id == "I2"));
    }

    #[test]
    fn test_generic_fallback_without_flags() {
        let mut data = CollectedData::new();
        data.record("primary_order_system", "Custom tool");
        let oracle = FixedOracle(None);
        let analysis = analyze_constraints(&oracle, &data).unwrap();
        assert_eq!(analysis.udes.len(), 2);
        assert_eq!(analysis.root_causes.len(), 2);
    }

    #[test]
    fn test_summary_lists_udes_and_root_causes() {
        let oracle = FixedOracle(None);
        let analysis = analyze_constraints(&oracle, &manual_data()).unwrap();
        let summary = generate_crt_summary(&analysis);
        assert!(summary.contains("Undesirable Effects"));
        assert!(summary.contains("UDE1"));
        assert!(summary.contains("Root Causes"));
    }
}
