use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{token_from_headers, validate_jwt, AuthError};
use crate::database::models::{Company, User, UserRole};
use crate::error::ApiError;
use crate::state::AppState;

/// Session context available to protected handlers.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user: User,
    pub company: Company,
}

impl AuthUser {
    pub fn tenant_id(&self) -> Uuid {
        self.company.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn role(&self) -> UserRole {
        self.user.role
    }

    /// Staff and admins may change company data; read-only users may not.
    pub fn require_writer(&self) -> Result<(), ApiError> {
        if self.role().can_write() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Insufficient permissions"))
        }
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role() == UserRole::Admin {
            Ok(())
        } else {
            Err(ApiError::forbidden("Insufficient permissions"))
        }
    }
}

/// JWT authentication middleware: reads the session cookie (or a Bearer
/// header), verifies it and injects the claims.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let security = &state.config.security;
    let token = token_from_headers(request.headers(), &security.cookie_name).ok_or(AuthError::MissingToken)?;

    let claims = validate_jwt(&token, &security.jwt_secret).inspect_err(|e| {
        tracing::debug!("Rejected session token: {}", e);
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
