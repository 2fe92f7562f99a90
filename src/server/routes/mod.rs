//! Route handlers for the discovery API

mod analysis_routes;
mod session_routes;

pub use analysis_routes::{diagram, gap_report};
pub use session_routes::{create_session, get_session, send_message};

use axum::http::StatusCode;

/// Standard error shape: status code plus a plain message
pub type ApiError = (StatusCode, String);

pub fn not_found(what: &str) -> ApiError {
    (StatusCode::NOT_FOUND, format!("{} not found", what))
}

pub fn internal(message: impl Into<String>) -> ApiError {
    (StatusCode::INTERNAL_SERVER_ERROR, message.into())
}
