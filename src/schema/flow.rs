// Order-to-Cash question flow
//
// Attributes describe HOW the organization handles each aspect of the
// process, not a single order's data. Sequence position is the canonical
// traversal order; preconditions only ever look backwards.

use super::{Inference, Precondition, QuestionKind, QuestionSpec};
use crate::inference::{AUTO_APPROVAL, ERP_SYSTEM, MANUAL_CHANNEL, MANUAL_CREDIT};

/// The ordered interview flow: order intake, order systems, verification,
/// credit governance, decision communication.
pub fn question_sequence() -> Vec<QuestionSpec> {
    vec![
        // ------------------------------------------------------------------
        // Order Intake
        // ------------------------------------------------------------------
        QuestionSpec {
            id: "1",
            key: "order_origin_channels",
            kind: QuestionKind::Mandatory,
            topic: "Order Intake",
            prompt: Some("How do orders come into your organization?"),
            examples: &[
                "EDI 850 from large retailers",
                "B2B e-commerce portal",
                "Email with signed PDF entered by sales",
            ],
            precondition: None,
            inference: None,
        },
        QuestionSpec {
            id: "1.1",
            key: "has_manual_intake",
            kind: QuestionKind::Inferred,
            topic: "Order Intake",
            prompt: None,
            examples: &[],
            precondition: None,
            inference: Some(Inference {
                source: "order_origin_channels",
                rule: MANUAL_CHANNEL,
            }),
        },
        QuestionSpec {
            id: "1.2",
            key: "manual_intake_method",
            kind: QuestionKind::Mandatory,
            topic: "Order Intake",
            prompt: Some("For manual orders, how exactly are they received and entered?"),
            examples: &[
                "Email with signed PDF attachments",
                "Phone orders taken by sales",
                "Fax to the order desk",
            ],
            precondition: Some(Precondition::KeyEquals {
                key: "has_manual_intake",
                value: "Yes",
            }),
            inference: None,
        },
        QuestionSpec {
            id: "1.3",
            key: "order_receiver",
            kind: QuestionKind::Mandatory,
            topic: "Order Intake",
            prompt: Some("Who receives manual orders and keys them into the system?"),
            examples: &[
                "Sales team enters directly",
                "Dedicated order desk",
                "Customer service reps",
            ],
            precondition: Some(Precondition::KeyEquals {
                key: "has_manual_intake",
                value: "Yes",
            }),
            inference: None,
        },
        // ------------------------------------------------------------------
        // Order Systems
        // ------------------------------------------------------------------
        QuestionSpec {
            id: "2",
            key: "primary_order_system",
            kind: QuestionKind::Mandatory,
            topic: "Order Systems",
            prompt: Some("What system are orders entered into and managed in?"),
            examples: &["SAP ECC", "NetSuite", "Custom order database"],
            precondition: None,
            inference: None,
        },
        QuestionSpec {
            id: "2.1",
            key: "uses_erp",
            kind: QuestionKind::Inferred,
            topic: "Order Systems",
            prompt: None,
            examples: &[],
            precondition: None,
            inference: Some(Inference {
                source: "primary_order_system",
                rule: ERP_SYSTEM,
            }),
        },
        // ------------------------------------------------------------------
        // Order Verification
        // ------------------------------------------------------------------
        QuestionSpec {
            id: "3",
            key: "required_verification_fields",
            kind: QuestionKind::Mandatory,
            topic: "Order Verification",
            prompt: Some(
                "What data is verified before an order is accepted? Is there a required field checklist?",
            ),
            examples: &[
                "Customer ID, SKU, quantity, price",
                "Required field checklist in the ERP",
                "No formal verification",
            ],
            precondition: None,
            inference: None,
        },
        QuestionSpec {
            id: "3.1",
            key: "verification_success_rate",
            kind: QuestionKind::Mandatory,
            topic: "Order Verification",
            prompt: Some("Roughly what share of orders pass verification on the first try?"),
            examples: &[
                "95% pass first time",
                "80%, the rest need follow-up",
                "Not measured",
            ],
            precondition: None,
            inference: None,
        },
        // ------------------------------------------------------------------
        // Credit Governance
        // ------------------------------------------------------------------
        QuestionSpec {
            id: "4",
            key: "credit_approval_type",
            kind: QuestionKind::Mandatory,
            topic: "Credit Governance",
            prompt: Some(
                "How are credit checks handled when an order arrives - automatic, manual review, or both?",
            ),
            examples: &[
                "Automatic under a threshold",
                "Manual review by a credit analyst",
                "Both, depending on order size",
            ],
            precondition: None,
            inference: None,
        },
        QuestionSpec {
            id: "4.1",
            key: "has_auto_approval",
            kind: QuestionKind::Inferred,
            topic: "Credit Governance",
            prompt: None,
            examples: &[],
            precondition: None,
            inference: Some(Inference {
                source: "credit_approval_type",
                rule: AUTO_APPROVAL,
            }),
        },
        QuestionSpec {
            id: "4.1.1",
            key: "auto_approval_limit",
            kind: QuestionKind::Mandatory,
            topic: "Credit Governance",
            prompt: Some("Up to what amount are orders approved automatically?"),
            examples: &[
                "$50,000 threshold",
                "Depends on the customer's rating",
                "No fixed limit",
            ],
            precondition: Some(Precondition::KeyEquals {
                key: "has_auto_approval",
                value: "Yes",
            }),
            inference: None,
        },
        QuestionSpec {
            id: "4.2",
            key: "has_manual_credit",
            kind: QuestionKind::Inferred,
            topic: "Credit Governance",
            prompt: None,
            examples: &[],
            precondition: None,
            inference: Some(Inference {
                source: "credit_approval_type",
                rule: MANUAL_CREDIT,
            }),
        },
        QuestionSpec {
            id: "4.2.1",
            key: "manual_credit_approver",
            kind: QuestionKind::Mandatory,
            topic: "Credit Governance",
            prompt: Some("Who reviews orders that get flagged for credit, and where do they work from?"),
            examples: &[
                "Credit analyst with an ERP dashboard",
                "Finance manager approves by email",
                "Sales director decides case by case",
            ],
            precondition: Some(Precondition::KeyEquals {
                key: "has_manual_credit",
                value: "Yes",
            }),
            inference: None,
        },
        QuestionSpec {
            id: "4.2.2",
            key: "credit_decision_factors",
            kind: QuestionKind::Mandatory,
            topic: "Credit Governance",
            prompt: Some("What information feeds the credit decision?"),
            examples: &[
                "AR balance and payment history",
                "D&B rating checked manually",
                "Credit bureau report",
            ],
            precondition: Some(Precondition::KeyEquals {
                key: "has_manual_credit",
                value: "Yes",
            }),
            inference: None,
        },
        // ------------------------------------------------------------------
        // Decision Communication
        // ------------------------------------------------------------------
        QuestionSpec {
            id: "5",
            key: "credit_decision_to_sales",
            kind: QuestionKind::Mandatory,
            topic: "Decision Communication",
            prompt: Some("How does the sales team learn the outcome of a credit review?"),
            examples: &[
                "Dashboard alert in the ERP",
                "Email from the credit team",
                "Phone call when it's urgent",
            ],
            precondition: None,
            inference: None,
        },
        QuestionSpec {
            id: "5.1",
            key: "credit_decision_to_customer",
            kind: QuestionKind::Mandatory,
            topic: "Decision Communication",
            prompt: Some("How is the customer informed about their order status after the credit review?"),
            examples: &[
                "Automated order confirmation",
                "Sales rep calls them",
                "EDI status message",
            ],
            precondition: None,
            inference: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sixteen_attributes() {
        let sequence = question_sequence();
        assert_eq!(sequence.len(), 16);
        let mandatory = sequence
            .iter()
            .filter(|s| s.kind == QuestionKind::Mandatory)
            .count();
        assert_eq!(mandatory, 12);
    }

    #[test]
    fn test_every_mandatory_has_examples() {
        for spec in question_sequence() {
            if spec.kind == QuestionKind::Mandatory {
                assert!(
                    !spec.examples.is_empty(),
                    "{} should carry example answers",
                    spec.key
                );
            }
        }
    }
}
