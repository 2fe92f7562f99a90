// As-is process diagram from captured data

use super::short_value;
use crate::models::CollectedData;

/// Render the captured intake-to-release flow as a Mermaid graph.
/// Returns None when nothing has been captured yet.
pub fn generate_process_diagram(data: &CollectedData) -> Option<String> {
    if data.is_empty() {
        return None;
    }

    let channels = data.get("order_origin_channels").unwrap_or("");
    let channels_lower = channels.to_lowercase();
    let has_manual = data.get("has_manual_intake") == Some("Yes");
    let has_portal = channels_lower.contains("portal") || channels_lower.contains("b2b");
    let has_edi = channels_lower.contains("edi");

    let receiver = short_value(data.get("order_receiver").unwrap_or("Order Team"), 20);
    let system = short_value(data.get("primary_order_system").unwrap_or("System"), 20);
    let manual_method = data
        .get("manual_intake_method")
        .map(|v| short_value(v, 20))
        .unwrap_or_default();

    let has_auto = data.get("has_auto_approval") == Some("Yes");
    let has_manual_credit = data.get("has_manual_credit") == Some("Yes");
    let auto_limit = short_value(data.get("auto_approval_limit").unwrap_or("$50k"), 10);
    let approver = short_value(
        data.get("manual_credit_approver").unwrap_or("Credit Analyst"),
        20,
    );
    let factors = short_value(
        data.get("credit_decision_factors").unwrap_or("AR balance, history"),
        20,
    );

    let mut diagram = String::from(
        "graph TD\n    %% Start\n    Start((Order Received)) --> IntakeType{Intake Channel}\n",
    );

    if has_manual {
        let manual_desc = if manual_method.is_empty() {
            "Manual Entry".to_string()
        } else {
            format!("Receive {}", manual_method)
        };
        diagram.push_str(&format!(
            "\n    %% Manual Lane\n    subgraph \"{} Lane\"\n    IntakeType -- Manual --> ManEntry[\"{}\"]\n    ManEntry --> SystemEntry\n    end\n",
            receiver, manual_desc
        ));
    }

    if has_portal || has_edi {
        diagram.push_str("\n    %% Automated Channels\n    subgraph \"Customer Pool\"\n");
        if has_portal {
            diagram.push_str("    Portal[Submit via B2B Portal]\n");
        }
        if has_edi {
            diagram.push_str("    EDI[Send EDI Order]\n");
        }
        diagram.push_str("    end\n");

        if has_portal {
            diagram.push_str("    IntakeType -- Portal --> Portal\n    Portal --> SystemEntry\n");
        }
        if has_edi {
            diagram.push_str("    IntakeType -- EDI --> EDI\n    EDI --> SystemEntry\n");
        }
    }

    diagram.push_str(&format!(
        "\n    %% System Processing\n    subgraph \"{} Lane\"\n    SystemEntry[Create Order Record]\n    CreditGate{{Credit Check}}\n    SystemEntry --> CreditGate\n",
        system
    ));

    if has_auto {
        diagram.push_str(&format!(
            "    CreditGate -- \"Under {}\" --> AutoApprove[Auto-Approve]\n",
            auto_limit
        ));
    }

    if has_manual_credit {
        diagram.push_str("    CreditGate -- \"Above threshold\" --> FlagQueue[Flag for Review]\n");
        diagram.push_str("    UpdateStatus[Update Status]\n    end\n");
        diagram.push_str(&format!(
            "\n    %% Credit Review Lane\n    subgraph \"{} Lane\"\n    FlagQueue --> Review[Review Dashboard]\n    Review --> CheckData[Check {}]\n    CheckData --> Decision{{Decision}}\n    Decision -- Approve --> UpdateStatus\n    Decision -- Reject --> UpdateStatus\n    Decision -- Conditional --> UpdateStatus\n    end\n",
            approver, factors
        ));
    } else {
        diagram.push_str("    end\n");
    }

    if has_auto {
        diagram.push_str("    AutoApprove --> EndProcess((Continue to Fulfillment))\n");
    }
    if has_manual_credit {
        diagram.push_str("    UpdateStatus --> EndProcess((Continue to Fulfillment))\n");
    } else if !has_auto {
        diagram.push_str("    CreditGate --> EndProcess((Continue to Fulfillment))\n");
    }

    Some(diagram)
}

/// Compact linear overview for sparse snapshots. Returns None below three
/// captured attributes, where even the overview would be guesswork.
pub fn simple_process_diagram(data: &CollectedData) -> Option<String> {
    if data.len() < 3 {
        return None;
    }

    let mut diagram = String::from("graph LR\n    A[Order Received] --> B{Channel}\n");

    let channels = data.get("order_origin_channels").unwrap_or("").to_lowercase();
    if channels.contains("manual") || channels.contains("email") || channels.contains("pdf") {
        diagram.push_str("    B --> C[Manual Entry]\n");
    }
    if channels.contains("portal") || channels.contains("b2b") {
        diagram.push_str("    B --> D[Portal]\n");
    }
    if channels.contains("edi") {
        diagram.push_str("    B --> E[EDI]\n");
    }

    if let Some(system) = data.get("primary_order_system") {
        let label = short_value(system, 20);
        diagram.push_str(&format!("    C --> F[{}]\n    D --> F\n    E --> F\n", label));
    }

    match data.get("credit_approval_type") {
        Some(credit) => {
            let lower = credit.to_lowercase();
            diagram.push_str("    F --> G{Credit Check}\n");
            if lower.contains("auto") {
                diagram.push_str("    G --> H[Auto-Approve]\n");
            }
            if lower.contains("manual") || lower.contains("analyst") {
                diagram.push_str("    G --> I[Manual Review]\n");
            }
            diagram.push_str("    H --> J((Fulfillment))\n    I --> J\n");
        }
        None => diagram.push_str("    F --> J((Fulfillment))\n"),
    }

    Some(diagram)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rich_data() -> CollectedData {
        let mut data = CollectedData::new();
        data.record("order_origin_channels", "EDI, B2B portal, email PDFs");
        data.record("has_manual_intake", "Yes");
        data.record("manual_intake_method", "Email with signed PDF");
        data.record("order_receiver", "Sales team");
        data.record("primary_order_system", "SAP ECC");
        data.record("credit_approval_type", "Both");
        data.record("has_auto_approval", "Yes");
        data.record("has_manual_credit", "Yes");
        data.record("auto_approval_limit", "$50,000");
        data.record("manual_credit_approver", "Credit analyst Sam");
        data
    }

    #[test]
    fn test_empty_data_renders_nothing() {
        assert!(generate_process_diagram(&CollectedData::new()).is_none());
    }

    #[test]
    fn test_full_diagram_covers_all_lanes() {
        let diagram = generate_process_diagram(&rich_data()).unwrap();
        assert!(diagram.starts_with("graph TD"));
        assert!(diagram.contains("Sales team Lane"));
        assert!(diagram.contains("Submit via B2B Portal"));
        assert!(diagram.contains("Send EDI Order"));
        assert!(diagram.contains("SAP ECC Lane"));
        assert!(diagram.contains("AutoApprove"));
        assert!(diagram.contains("Credit analyst Sam Lane"));
        assert!(diagram.contains("EndProcess"));
    }

    #[test]
    fn test_automated_only_shop_has_no_manual_lane() {
        let mut data = CollectedData::new();
        data.record("order_origin_channels", "EDI 850 only");
        data.record("has_manual_intake", "No");
        data.record("primary_order_system", "NetSuite");
        let diagram = generate_process_diagram(&data).unwrap();
        assert!(!diagram.contains("Manual Lane"));
        assert!(diagram.contains("Send EDI Order"));
        // no credit info: the gate flows straight through
        assert!(diagram.contains("CreditGate --> EndProcess"));
    }

    #[test]
    fn test_simple_diagram_requires_three_attributes() {
        let mut data = CollectedData::new();
        data.record("order_origin_channels", "EDI");
        assert!(simple_process_diagram(&data).is_none());

        data.record("primary_order_system", "SAP");
        data.record("credit_approval_type", "Manual review");
        let diagram = simple_process_diagram(&data).unwrap();
        assert!(diagram.starts_with("graph LR"));
        assert!(diagram.contains("Manual Review"));
    }
}
