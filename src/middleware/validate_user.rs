use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::Claims;
use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// User loaded from the claims and confirmed active.
#[derive(Clone, Debug)]
pub struct ValidatedUser(pub User);

/// Middleware that checks the user named by the JWT still exists in its
/// company and is active. Runs after [`jwt_auth_middleware`](super::jwt_auth_middleware).
pub async fn validate_user_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = request
        .extensions()
        .get::<Claims>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let user = state.auth().session_user(&claims).await.inspect_err(|_| {
        tracing::warn!("User validation failed for {} in company {}", claims.sub, claims.tenant);
    })?;

    tracing::debug!("User validation successful: {} ({})", user.email, user.role.as_str());
    request.extensions_mut().insert(ValidatedUser(user));
    Ok(next.run(request).await)
}
