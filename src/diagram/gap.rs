// Color-coded gap diagram
//
// Green = aligned with the standard, red = gap, yellow = partial,
// gray = not captured.

use super::short_value;
use crate::analysis::GapResult;
use crate::models::CollectedData;

/// Render the gap analysis as a color-coded Mermaid flow
pub fn generate_gap_diagram(data: &CollectedData, gap: &GapResult) -> String {
    let mut diagram = String::from(
        "graph TD\n    %% Gap analysis: green = aligned, red = gap, yellow = partial\n\n    \
         classDef green fill:#28a745,stroke:#1e7e34,color:#fff\n    \
         classDef red fill:#dc3545,stroke:#c82333,color:#fff\n    \
         classDef yellow fill:#ffc107,stroke:#d39e00,color:#000\n    \
         classDef default fill:#6c757d,stroke:#545b62,color:#fff\n\n    \
         Start((Order Received)) --> IntakeChannel\n",
    );

    let channel_class = if gap.has_gap("order_origin_channels") {
        "red"
    } else if data.contains("order_origin_channels") {
        "green"
    } else {
        "default"
    };
    diagram.push_str(&format!(
        "    IntakeChannel{{{{\"Channel Type\"}}}}:::{}\n",
        channel_class
    ));

    let has_manual = data.get("has_manual_intake") == Some("Yes");
    if has_manual {
        let manual_class = if gap.has_gap("manual_intake_method") {
            "red"
        } else {
            "green"
        };
        let method = short_value(data.get("manual_intake_method").unwrap_or("Email/PDF"), 20);
        diagram.push_str(&format!(
            "    IntakeChannel --> ManualIntake[\"Manual: {}\"]:::{}\n",
            method, manual_class
        ));
    }

    let channels = data.get("order_origin_channels").unwrap_or("").to_lowercase();
    let has_auto_channel = channels.contains("portal") || channels.contains("edi");
    if has_auto_channel {
        diagram.push_str("    IntakeChannel --> AutoIntake[\"Portal/EDI\"]:::green\n");
        if has_manual {
            diagram.push_str("    ManualIntake --> OrderCreated\n");
        }
        diagram.push_str("    AutoIntake --> OrderCreated\n");
    } else if has_manual {
        diagram.push_str("    ManualIntake --> OrderCreated\n");
    } else {
        diagram.push_str("    IntakeChannel --> OrderCreated\n");
    }

    let system_class = if data.get("uses_erp") == Some("ERP") {
        "green"
    } else {
        "yellow"
    };
    let system = short_value(data.get("primary_order_system").unwrap_or("System"), 15);
    diagram.push_str(&format!("    OrderCreated[\"{}\"]:::{}\n", system, system_class));

    let verify_class = if gap.has_gap("verification_success_rate") {
        "red"
    } else {
        "green"
    };
    diagram.push_str(&format!(
        "    OrderCreated --> Verification{{{{\"Data Verification\"}}}}:::{}\n",
        verify_class
    ));

    let credit_class = if data.get("has_auto_approval") == Some("Yes") {
        "green"
    } else {
        "yellow"
    };
    diagram.push_str(&format!(
        "    Verification --> CreditCheck{{{{\"Credit Check\"}}}}:::{}\n",
        credit_class
    ));

    if data.get("has_auto_approval") == Some("Yes") {
        let limit = short_value(data.get("auto_approval_limit").unwrap_or("$50k"), 10);
        diagram.push_str(&format!(
            "    CreditCheck -- \"Under {}\" --> AutoApprove[Auto-Approve]:::green\n",
            limit
        ));
    }

    if data.get("has_manual_credit") == Some("Yes") {
        let manual_credit_class = if gap.has_gap("credit_decision_to_sales")
            || gap.has_gap("credit_decision_to_customer")
        {
            "red"
        } else {
            "green"
        };
        let approver = short_value(data.get("manual_credit_approver").unwrap_or("Analyst"), 15);
        diagram.push_str(&format!(
            "    CreditCheck -- \"Above limit\" --> ManualReview[\"{}\"]:::{}\n",
            approver, manual_credit_class
        ));
        diagram.push_str(&format!(
            "    ManualReview --> Decision{{{{\"Decision\"}}}}:::{}\n",
            manual_credit_class
        ));
        diagram.push_str("    Decision --> Released\n");
    }

    if data.get("has_auto_approval") == Some("Yes") {
        diagram.push_str("    AutoApprove --> Released\n");
    }

    diagram.push_str("    Released((Order Released)):::green\n");
    diagram
}
