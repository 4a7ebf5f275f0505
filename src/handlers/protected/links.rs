// handlers/protected/links.rs - /api/shareable-links (staff side)

use axum::{
    extract::{Path, State},
    Extension,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::database::models::LinkView;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::validation::link::CreateLinkRequest;
use crate::validation::ValidJson;

/// POST /api/shareable-links
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ValidJson(input): ValidJson<CreateLinkRequest>,
) -> ApiResult<LinkView> {
    auth.require_writer()?;
    let link = state
        .links()
        .create(auth.tenant_id(), auth.user_id(), input, Utc::now())
        .await?;
    Ok(ApiResponse::created(link))
}

/// GET /api/shareable-links/case/:caseId - newest first
pub async fn list_for_case(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(case_id): Path<String>,
) -> ApiResult<Vec<LinkView>> {
    auth.require_writer()?;
    let case_id = parse_id(&case_id)?;
    Ok(ApiResponse::success(state.links().list_for_case(auth.tenant_id(), case_id).await?))
}

/// PUT /api/shareable-links/:id/revoke
pub async fn revoke(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<LinkView> {
    auth.require_writer()?;
    let id = parse_id(&id)?;
    Ok(ApiResponse::success(state.links().revoke(auth.tenant_id(), id, Utc::now()).await?))
}

/// DELETE /api/shareable-links/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    auth.require_writer()?;
    let id = parse_id(&id)?;
    state.links().delete(auth.tenant_id(), id).await?;
    Ok(ApiResponse::success(json!({ "message": "Link deleted successfully" })))
}
