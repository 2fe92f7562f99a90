// Best-practice reference table for the O2C process
//
// One entry per schema attribute. The `standard` text doubles as matcher
// input: gap heuristics read it for automation/dashboard vocabulary, so the
// wording here is load-bearing.

/// One reference entry: what good looks like for an attribute
#[derive(Debug, Clone)]
pub struct BestPractice {
    pub key: &'static str,
    pub standard: &'static str,
    pub risk_if_missing: &'static str,
    /// Minimum acceptable percentage for success-rate style attributes
    pub success_rate_floor: Option<u32>,
}

/// The full reference table, one entry per interview attribute
pub fn best_practice_table() -> Vec<BestPractice> {
    vec![
        BestPractice {
            key: "order_origin_channels",
            standard: "Digital channels (EDI, portal) feeding the order system in real-time",
            risk_if_missing: "Untracked intake channels delay order entry and hide demand",
            success_rate_floor: None,
        },
        BestPractice {
            key: "has_manual_intake",
            standard: "Manual intake minimized; exceptions captured in the system of record",
            risk_if_missing: "Unknown share of orders bypassing system controls",
            success_rate_floor: None,
        },
        BestPractice {
            key: "manual_intake_method",
            standard: "Automated capture (OCR, e-mail parsing) into the order system",
            risk_if_missing: "Re-typing errors and lost orders at the intake step",
            success_rate_floor: None,
        },
        BestPractice {
            key: "order_receiver",
            standard: "Orders land in a system work queue, not a personal inbox",
            risk_if_missing: "Single person becomes the intake bottleneck",
            success_rate_floor: None,
        },
        BestPractice {
            key: "primary_order_system",
            standard: "Single integrated ERP as the system of record for orders",
            risk_if_missing: "No authoritative view of open orders",
            success_rate_floor: None,
        },
        BestPractice {
            key: "uses_erp",
            standard: "ERP-backed order management end to end",
            risk_if_missing: "Order data scattered across disconnected tools",
            success_rate_floor: None,
        },
        BestPractice {
            key: "required_verification_fields",
            standard: "System-enforced required fields validated in real-time at entry",
            risk_if_missing: "Incomplete orders discovered downstream where fixes are costly",
            success_rate_floor: None,
        },
        BestPractice {
            key: "verification_success_rate",
            standard: "At least 95% of orders pass validation first time",
            risk_if_missing: "Rework loops between sales and order management",
            success_rate_floor: Some(90),
        },
        BestPractice {
            key: "credit_approval_type",
            standard: "Automated credit check at order entry with rule-based release",
            risk_if_missing: "Credit exposure decided ad hoc per order",
            success_rate_floor: None,
        },
        BestPractice {
            key: "has_auto_approval",
            standard: "Automatic approval below a defined, system-held threshold",
            risk_if_missing: "Every order waits on a person regardless of size",
            success_rate_floor: None,
        },
        BestPractice {
            key: "auto_approval_limit",
            standard: "Documented auto-approval threshold maintained in the system",
            risk_if_missing: "Inconsistent release decisions across analysts",
            success_rate_floor: None,
        },
        BestPractice {
            key: "has_manual_credit",
            standard: "Manual review limited to flagged exceptions in a system queue",
            risk_if_missing: "Review effort spent on orders that should self-release",
            success_rate_floor: None,
        },
        BestPractice {
            key: "manual_credit_approver",
            standard: "Dedicated credit role working a system queue with full context",
            risk_if_missing: "Credit decisions depend on one person's availability",
            success_rate_floor: None,
        },
        BestPractice {
            key: "credit_decision_factors",
            standard: "Credit decisions from system data and external ratings in one integrated view",
            risk_if_missing: "Decisions made on stale or partial information",
            success_rate_floor: None,
        },
        BestPractice {
            key: "credit_decision_to_sales",
            standard: "Automated dashboard alerts to sales on credit decisions",
            risk_if_missing: "Sales chases credit by phone; customers wait",
            success_rate_floor: None,
        },
        BestPractice {
            key: "credit_decision_to_customer",
            standard: "Automated status notification to the customer on release or hold",
            risk_if_missing: "Customers learn about holds only when deliveries slip",
            success_rate_floor: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{find_by_key, question_sequence};

    #[test]
    fn test_table_covers_every_schema_key_once() {
        let table = best_practice_table();
        assert_eq!(table.len(), 16);

        let sequence = question_sequence();
        for entry in &table {
            assert!(
                find_by_key(&sequence, entry.key).is_some(),
                "reference key {} not in schema",
                entry.key
            );
        }

        let mut keys: Vec<_> = table.iter().map(|e| e.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 16);
    }
}
