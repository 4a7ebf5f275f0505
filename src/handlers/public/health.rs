//! Health check endpoint handler.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error};

use crate::state::AppState;

/// Reports whether storage answers, plus the deployment flags the client
/// needs (demo mode, version, environment).
///
/// # HTTP Request
///
/// `GET /health` and `GET /api/health`
///
/// # Response
///
/// - `200 OK` - storage is reachable
/// - `503 Service Unavailable` - storage ping failed
pub async fn health(State(state): State<AppState>) -> Response {
    debug!("Processing health check request");

    let ok = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            error!("Health check failed: {}", e);
            false
        }
    };

    let body = serde_json::json!({
        "ok": ok,
        "demo": state.config.server.demo_mode,
        "version": state.config.server.app_version,
        "environment": state.config.environment.as_str(),
    });
    let status = if ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(body)).into_response()
}
