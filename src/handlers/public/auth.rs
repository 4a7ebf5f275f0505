// handlers/public/auth.rs - POST /api/auth/{register,login,logout}

use axum::{extract::State, http::header, response::IntoResponse};
use chrono::Utc;
use serde_json::json;

use crate::auth::{clear_session_cookie, session_cookie};
use crate::database::models::{Company, User};
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;
use crate::validation::auth::{LoginRequest, RegisterRequest};
use crate::validation::ValidJson;

fn session_body(user: &User, company: &Company) -> serde_json::Value {
    json!({ "user": user.public(), "company": company.summary() })
}

/// POST /api/auth/register - create a company with its first admin and sign in
pub async fn register(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let auth = state.auth();
    let now = Utc::now();
    let (user, company) = auth.register(input, now).await?;
    let token = auth.issue_token(&user, now)?;

    let cookie = session_cookie(&state.config.security, &token);
    Ok(([(header::SET_COOKIE, cookie)], ApiResponse::created(session_body(&user, &company))))
}

/// POST /api/auth/login - check credentials and set the session cookie
pub async fn login(
    State(state): State<AppState>,
    ValidJson(credentials): ValidJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let auth = state.auth();
    let email = credentials.email.clone();
    let (user, company) = auth.login(credentials).await.inspect_err(|_| {
        tracing::info!("Failed login attempt for {}", email);
    })?;
    let token = auth.issue_token(&user, Utc::now())?;

    tracing::info!("User {} logged in to company {}", user.id, company.id);
    let cookie = session_cookie(&state.config.security, &token);
    Ok(([(header::SET_COOKIE, cookie)], ApiResponse::success(session_body(&user, &company))))
}

/// POST /api/auth/logout - clear the session cookie
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = clear_session_cookie(&state.config.security);
    (
        [(header::SET_COOKIE, cookie)],
        ApiResponse::success(json!({ "message": "Logged out successfully" })),
    )
}
