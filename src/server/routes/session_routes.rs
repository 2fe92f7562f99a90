// Session lifecycle and message routes

use super::{internal, not_found, ApiError};
use crate::interview::{DiscoverySession, InterviewState, SessionMode, SESSION_GREETING};
use crate::models::{CollectedData, ConversationStyle, DiscoveryProgress, InterviewPhase};
use crate::schema;
use crate::server::state::ServerAppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub greeting: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub reply: String,
    pub mode: SessionMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<InterviewPhase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<DiscoveryProgress>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: String,
    pub mode: SessionMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<InterviewPhase>,
    pub collected_data: CollectedData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<DiscoveryProgress>,
    pub style: ConversationStyle,
}

fn progress_of(state: &InterviewState) -> DiscoveryProgress {
    schema::progress(&schema::question_sequence(), &state.collected_data)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/sessions
pub async fn create_session(
    State(state): State<ServerAppState>,
) -> Result<Json<CreateSessionResponse>, ApiError> {
    let session = DiscoverySession::new();
    let id = session.id.clone();
    state.insert_session(session).await;

    log::info!("created discovery session {}", id);
    Ok(Json(CreateSessionResponse {
        session_id: id,
        greeting: SESSION_GREETING.to_string(),
    }))
}

/// POST /api/sessions/:id/messages
///
/// One synchronous interview turn. The engine blocks on the completion
/// service, so the turn runs on the blocking pool while the session lock is
/// held, serializing turns per session.
pub async fn send_message(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let handle = state.session(&id).await.ok_or_else(|| not_found("session"))?;
    let mut guard = handle.lock().await;

    let orchestrator = state.orchestrator.clone();
    let mut session = guard.clone();
    let content = request.content;

    let (reply, session) = tokio::task::spawn_blocking(move || {
        let reply = orchestrator.handle_message(&mut session, &content);
        (reply, session)
    })
    .await
    .map_err(|e| internal(format!("turn task failed: {}", e)))?;

    *guard = session;

    let interview = guard.interview.as_ref();
    Ok(Json(SendMessageResponse {
        reply,
        mode: guard.mode,
        phase: interview.map(|s| s.phase),
        progress: interview.map(progress_of),
    }))
}

/// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<ServerAppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let handle = state.session(&id).await.ok_or_else(|| not_found("session"))?;
    let guard = handle.lock().await;

    let interview = guard.interview.as_ref();
    Ok(Json(SessionSnapshot {
        id: guard.id.clone(),
        mode: guard.mode,
        phase: interview.map(|s| s.phase),
        collected_data: interview
            .map(|s| s.collected_data.clone())
            .unwrap_or_default(),
        progress: interview.map(progress_of),
        style: interview.map(|s| s.style).unwrap_or_default(),
    }))
}
