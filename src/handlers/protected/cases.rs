// handlers/protected/cases.rs - /api/cases

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Extension,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::database::models::CaseView;
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, PagedResponse};
use crate::services::error::ServiceError;
use crate::services::export_service::{cases_workbook, export_filename, XLSX_CONTENT_TYPE};
use crate::state::AppState;
use crate::validation::case::CaseRequest;
use crate::validation::query::{CaseListQuery, ExportQuery};
use crate::validation::ValidJson;

/// GET /api/cases?search=&field=&sort=&order=&page=&limit=
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<CaseListQuery>,
) -> Result<PagedResponse<CaseView>, ApiError> {
    let query = query
        .check(&state.config.pagination)
        .map_err(|errors| ApiError::validation_error("Invalid query parameters", Some(errors)))?;

    let page = state.cases(auth.tenant_id()).list(&query).await?;
    Ok(PagedResponse::new(page.data, query.page, page.total))
}

/// GET /api/cases/export?search=&field= - every matching case as xlsx
pub async fn export(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let search = query.search.unwrap_or_default();
    let cases = state
        .cases(auth.tenant_id())
        .matching(&search, query.field.as_deref())
        .await?;

    let bytes = cases_workbook(&cases).map_err(ServiceError::from)?;
    tracing::info!("Exported {} case(s) for company {}", cases.len(), auth.tenant_id());

    let disposition = format!("attachment; filename=\"{}\"", export_filename(Utc::now()));
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

/// GET /api/cases/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<CaseView> {
    let id = parse_id(&id)?;
    Ok(ApiResponse::success(state.cases(auth.tenant_id()).get(id).await?))
}

/// POST /api/cases
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ValidJson(fields): ValidJson<CaseRequest>,
) -> ApiResult<CaseView> {
    auth.require_writer()?;
    let case = state
        .cases(auth.tenant_id())
        .create(fields, auth.user_id(), Utc::now())
        .await?;
    Ok(ApiResponse::created(case))
}

/// PUT /api/cases/:id - merges the given fields into the case
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidJson(fields): ValidJson<CaseRequest>,
) -> ApiResult<CaseView> {
    auth.require_writer()?;
    let id = parse_id(&id)?;
    let case = state
        .cases(auth.tenant_id())
        .update(id, fields, auth.user_id(), Utc::now())
        .await?;
    Ok(ApiResponse::success(case))
}

/// DELETE /api/cases/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    auth.require_writer()?;
    let id = parse_id(&id)?;
    state.cases(auth.tenant_id()).delete(id).await?;
    Ok(ApiResponse::success(json!({ "message": "Case deleted successfully" })))
}
