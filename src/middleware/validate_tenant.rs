use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use super::validate_user::ValidatedUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Middleware that checks the user's company is active, then hands handlers
/// the complete [`AuthUser`]. Runs after [`validate_user_middleware`](super::validate_user_middleware).
pub async fn validate_tenant_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ValidatedUser(user) = request
        .extensions_mut()
        .remove::<ValidatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let company = state.auth().active_company(user.tenant_id).await.inspect_err(|_| {
        tracing::warn!("Tenant validation failed: company {} is not active", user.tenant_id);
    })?;

    tracing::debug!("Tenant validation successful: {} ({})", company.name, company.id);
    request.extensions_mut().insert(AuthUser { user, company });
    Ok(next.run(request).await)
}
