// handlers/protected/auth.rs - GET /api/auth/me

use axum::Extension;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/auth/me - the signed-in user and their company
pub async fn me(Extension(auth): Extension<AuthUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "user": auth.user.public(),
        "company": auth.company.summary(),
    })))
}
