// handlers/public/links.rs - GET /api/shareable-links/:token/verify

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;

use crate::error::ApiError;
use crate::services::VerifiedLink;
use crate::state::AppState;
use crate::validation::link::VerifyQuery;

/// Opens a shared case by token. The body is the bare `{case, link}` object
/// the shared-case page renders.
pub async fn verify(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<VerifiedLink>, ApiError> {
    let verified = state
        .links()
        .verify(&token, query.password.as_deref(), Utc::now())
        .await?;
    tracing::debug!("Shareable link {} opened ({} accesses)", verified.link.id, verified.link.access_count);
    Ok(Json(verified))
}
