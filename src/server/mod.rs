//! HTTP server for the discovery API
//!
//! Thin axum layer around the orchestrator: sessions live in shared state,
//! every route is request/response, and the interview turn itself runs on
//! the blocking pool.

pub mod routes;
pub mod state;

pub use state::ServerAppState;

use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Version information for the server
#[derive(serde::Serialize)]
struct VersionInfo {
    version: String,
}

/// Run the HTTP server until the process is stopped
pub async fn run_server(
    port: u16,
    bind: &str,
    state: ServerAppState,
    cors_origins: &[String],
) -> Result<(), String> {
    // CORS must be the outermost layer so preflight requests are answered
    // before anything else runs
    let cors = if cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
    } else {
        let allowed: Vec<HeaderValue> = cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(allowed)
            .allow_methods(Any)
            .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
    };

    let app = Router::new()
        .route("/api/sessions", post(routes::create_session))
        .route("/api/sessions/:id", get(routes::get_session))
        .route("/api/sessions/:id/messages", post(routes::send_message))
        .route("/api/sessions/:id/gap-report", get(routes::gap_report))
        .route("/api/sessions/:id/diagrams/:kind", get(routes::diagram))
        .route("/api/version", get(version_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    log::info!("O2C discovery server listening on http://{}", addr);
    println!("O2C Process Discovery server");
    println!("  URL:       http://{}:{}", bind, port);
    println!("  Endpoints: POST /api/sessions");
    println!("             POST /api/sessions/:id/messages");
    println!("             GET  /api/sessions/:id");
    println!("             GET  /api/sessions/:id/gap-report");
    println!("             GET  /api/sessions/:id/diagrams/:kind");
    println!("             GET  /health");

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("Server error: {}", e))
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn version_handler() -> Json<VersionInfo> {
    Json(VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
