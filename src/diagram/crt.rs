// Current-reality tree diagram
//
// Bottom-to-top: root causes at the bottom, undesirable effects on top.

use super::sanitize_label;
use crate::analysis::CrtAnalysis;

/// Render a current-reality tree as a Mermaid `graph BT`. Returns None when
/// the analysis has nothing to show.
pub fn generate_crt_diagram(analysis: &CrtAnalysis) -> Option<String> {
    if analysis.is_empty() {
        return None;
    }

    let mut diagram = String::from(
        "graph BT\n    %% Define styles\n    \
         classDef ude fill:#ffcccc,stroke:#ff0000,stroke-width:2px,color:black,font-weight:bold;\n    \
         classDef rootcause fill:#e1ecf4,stroke:#74a9cf,stroke-width:1px,color:black;\n    \
         classDef intermediate fill:#ffffff,stroke:#333333,stroke-width:1px,color:black;\n\n    \
         %% --- Undesirable Effects ---\n",
    );

    for ude in &analysis.udes {
        diagram.push_str(&format!(
            "    {id}[\"{id}: {label}\"]:::ude\n",
            id = ude.id,
            label = sanitize_label(&ude.label)
        ));
    }

    diagram.push_str("\n    %% --- Intermediate Effects ---\n");
    for effect in &analysis.intermediate_effects {
        diagram.push_str(&format!(
            "    {}(\"{}\"):::intermediate\n",
            effect.id,
            sanitize_label(&effect.label)
        ));
    }

    diagram.push_str("\n    %% --- Root Causes ---\n");
    for cause in &analysis.root_causes {
        diagram.push_str(&format!(
            "    {id}[\"{id}: {label}\"]:::rootcause\n",
            id = cause.id,
            label = sanitize_label(&cause.label)
        ));
    }

    diagram.push_str("\n    %% --- Causal Connections ---\n");
    for edge in &analysis.connections {
        if !edge.from.is_empty() && !edge.to.is_empty() {
            diagram.push_str(&format!("    {} --> {}\n", edge.from, edge.to));
        }
    }

    Some(diagram)
}
