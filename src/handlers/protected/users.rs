// handlers/protected/users.rs - /api/users
//
// Any signed-in user may read the company's users; only admins change them.

use axum::{
    extract::{Path, State},
    Extension,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::database::models::PublicUser;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::validation::user::{CreateUserRequest, UpdateUserRequest};
use crate::validation::ValidJson;

/// GET /api/users - newest first
pub async fn list(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<Vec<PublicUser>> {
    let users = state.users(auth.tenant_id()).list().await?;
    Ok(ApiResponse::success(users.iter().map(PublicUser::from).collect()))
}

/// GET /api/users/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<PublicUser> {
    let id = parse_id(&id)?;
    let user = state.users(auth.tenant_id()).get(id).await?;
    Ok(ApiResponse::success(user.public()))
}

/// POST /api/users
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ValidJson(input): ValidJson<CreateUserRequest>,
) -> ApiResult<PublicUser> {
    auth.require_admin()?;
    let user = state.users(auth.tenant_id()).create(input, Utc::now()).await?;
    Ok(ApiResponse::created(user.public()))
}

/// PUT /api/users/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidJson(changes): ValidJson<UpdateUserRequest>,
) -> ApiResult<PublicUser> {
    auth.require_admin()?;
    let id = parse_id(&id)?;
    let user = state.users(auth.tenant_id()).update(id, changes, Utc::now()).await?;
    Ok(ApiResponse::success(user.public()))
}

/// DELETE /api/users/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    auth.require_admin()?;
    let id = parse_id(&id)?;
    state.users(auth.tenant_id()).delete(id).await?;
    Ok(ApiResponse::success(json!({ "message": "User deleted successfully" })))
}
