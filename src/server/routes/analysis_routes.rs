// Gap report and diagram routes

use super::{internal, not_found, ApiError};
use crate::analysis::{self, GapResult};
use crate::diagram;
use crate::models::CollectedData;
use crate::server::state::ServerAppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapReportResponse {
    pub result: GapResult,
    pub summary: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramResponse {
    pub kind: String,
    pub mermaid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<String>,
}

/// Snapshot of a session's collected data, erroring when the session is
/// unknown
async fn collected_snapshot(
    state: &ServerAppState,
    id: &str,
) -> Result<CollectedData, ApiError> {
    let handle = state.session(id).await.ok_or_else(|| not_found("session"))?;
    let guard = handle.lock().await;
    Ok(guard
        .interview
        .as_ref()
        .map(|s| s.collected_data.clone())
        .unwrap_or_default())
}

/// GET /api/sessions/:id/gap-report
pub async fn gap_report(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
) -> Result<Json<GapReportResponse>, ApiError> {
    let data = collected_snapshot(&state, &id).await?;
    let result = analysis::analyze_gaps(&data, &analysis::best_practice_table());
    let summary = analysis::generate_gap_summary(&result);
    Ok(Json(GapReportResponse { result, summary }))
}

/// GET /api/sessions/:id/diagrams/:kind
///
/// kind: process | simple | gap | standard | swimlane | crt
pub async fn diagram(
    State(state): State<ServerAppState>,
    Path((id, kind)): Path<(String, String)>,
) -> Result<Json<DiagramResponse>, ApiError> {
    let data = collected_snapshot(&state, &id).await?;

    let no_data = || {
        (
            StatusCode::CONFLICT,
            "no process data captured yet".to_string(),
        )
    };

    let (mermaid, legend) = match kind.as_str() {
        "process" => (
            diagram::generate_process_diagram(&data).ok_or_else(no_data)?,
            None,
        ),
        "simple" => (
            diagram::simple_process_diagram(&data).ok_or_else(no_data)?,
            None,
        ),
        "gap" => {
            let gap = analysis::analyze_gaps(&data, &analysis::best_practice_table());
            (diagram::generate_gap_diagram(&data, &gap), None)
        }
        "standard" => (diagram::standard_diagram(true).to_string(), None),
        "swimlane" => {
            let gap = analysis::analyze_gaps(&data, &analysis::best_practice_table());
            (
                diagram::generate_swimlane_diagram(&data, &gap),
                Some(diagram::swimlane_legend().to_string()),
            )
        }
        "crt" => {
            // the constraint analysis consults the oracle; keep the blocking
            // call off the async runtime
            let oracle = state.oracle.clone();
            let snapshot = data.clone();
            let tree = tokio::task::spawn_blocking(move || {
                analysis::analyze_constraints(oracle.as_ref(), &snapshot)
            })
            .await
            .map_err(|e| internal(format!("analysis task failed: {}", e)))?
            .ok_or_else(no_data)?;

            (
                diagram::generate_crt_diagram(&tree).ok_or_else(no_data)?,
                Some(analysis::generate_crt_summary(&tree)),
            )
        }
        _ => return Err(not_found("diagram kind")),
    };

    Ok(Json(DiagramResponse {
        kind,
        mermaid,
        legend,
    }))
}
