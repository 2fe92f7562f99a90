// Reference Order-to-Cash process diagram
//
// The fixed best-practice flow the captured process is compared against.

/// Full reference flow with stage subgraphs
const DETAILED_DIAGRAM: &str = r#"graph TD
    %% Reference Order-to-Cash Process

    subgraph "1. Pre-Sales"
    Inquiry[Customer Inquiry] --> Quotation[Create Quotation]
    Quotation --> QuoteApproval{Quote Accepted?}
    end

    subgraph "2. Sales Order Processing"
    QuoteApproval -- Yes --> SalesOrder[Create Sales Order]
    SalesOrder --> OrderConf[Order Confirmation to Customer]
    end

    subgraph "3. Credit & Availability Check"
    SalesOrder --> CreditCheck{Credit Check}
    CreditCheck -- Blocked --> CreditRelease[Credit Manager Release]
    CreditRelease --> ATPCheck
    CreditCheck -- Passed --> ATPCheck{Availability Check}
    ATPCheck -- Available --> Delivery
    ATPCheck -- Not Available --> BackOrder[Backorder Processing]
    BackOrder --> Planning[Production Planning]
    Planning --> ATPCheck
    end

    subgraph "4. Delivery Processing"
    Delivery[Create Outbound Delivery]
    Delivery --> Picking[Picking]
    Picking --> Packing[Packing]
    end

    subgraph "5. Goods Issue & Shipping"
    Packing --> GoodsIssue[Post Goods Issue]
    GoodsIssue --> ShipDoc[Shipment Document]
    ShipDoc --> CarrierLabel[Carrier Label & Tracking]
    CarrierLabel --> ASN[Send ASN to Customer]
    end

    subgraph "6. Billing"
    GoodsIssue --> BillingDue[Billing Due List]
    BillingDue --> Invoice[Create Invoice]
    Invoice --> OutputInv[Send Invoice to Customer]
    Invoice --> AcctDoc[Accounting Document]
    end

    subgraph "7. Accounts Receivable"
    AcctDoc --> AR[Accounts Receivable]
    AR --> Payment{Payment Received?}
    Payment -- Yes --> CashApp[Cash Application]
    Payment -- No --> Dunning[Dunning Process]
    Dunning --> Collections[Collections Management]
    Collections --> Payment
    CashApp --> Cleared[Invoice Cleared]
    end

    %% End
    Cleared --> Complete((O2C Complete))
    ASN --> Complete
"#;

/// Simplified linear flow
const SIMPLE_DIAGRAM: &str = r#"graph LR
    A[Inquiry] --> B[Quotation]
    B --> C[Sales Order]
    C --> D{Credit Check}
    D --> E{Availability Check}
    E --> F[Delivery]
    F --> G[Picking]
    G --> H[Packing]
    H --> I[Goods Issue]
    I --> J[Shipping]
    I --> K[Billing]
    K --> L[Invoice]
    L --> M[Payment]
    M --> N[Cash Applied]
"#;

/// The reference O2C process diagram. `detailed` selects the full
/// subgraph form over the linear overview.
pub fn standard_diagram(detailed: bool) -> &'static str {
    if detailed {
        DETAILED_DIAGRAM
    } else {
        SIMPLE_DIAGRAM
    }
}

/// The reference process stages, in order, for comparison views
pub fn reference_stages() -> Vec<&'static str> {
    vec![
        "Pre-Sales (Inquiry, Quotation)",
        "Sales Order Processing",
        "Credit Management",
        "Availability Check",
        "Delivery Processing",
        "Picking & Packing",
        "Post Goods Issue",
        "Shipping",
        "Billing",
        "Accounts Receivable",
        "Cash Application",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_variants_are_mermaid_graphs() {
        assert!(standard_diagram(true).starts_with("graph TD"));
        assert!(standard_diagram(false).starts_with("graph LR"));
        assert!(standard_diagram(true).contains("Cash Application"));
    }

    #[test]
    fn test_stage_list_is_ordered() {
        let stages = reference_stages();
        assert_eq!(stages.len(), 11);
        assert_eq!(stages[0], "Pre-Sales (Inquiry, Quotation)");
        assert_eq!(stages[10], "Cash Application");
    }
}
