use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::state::AppState;

/// Path prefixes whose writes are refused in demo mode.
const GUARDED_PREFIXES: [&str; 5] = [
    "/api/cases",
    "/api/customers",
    "/api/users",
    "/api/shareable-links",
    "/api/auth/register",
];

fn is_read(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

pub fn is_guarded(method: &Method, path: &str) -> bool {
    !is_read(method) && GUARDED_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// Rejects data-changing requests while the deployment runs as a demo.
/// Login and logout stay open.
pub async fn demo_guard_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if state.config.server.demo_mode && is_guarded(request.method(), request.uri().path()) {
        tracing::debug!("Demo mode refused {} {}", request.method(), request.uri().path());
        return ApiError::forbidden("Demo mode: write disabled").into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_writes_to_data_routes_are_guarded() {
        assert!(is_guarded(&Method::POST, "/api/cases"));
        assert!(is_guarded(&Method::DELETE, "/api/customers/abc"));
        assert!(is_guarded(&Method::PATCH, "/api/shareable-links/abc/revoke"));
        assert!(is_guarded(&Method::POST, "/api/auth/register"));
        assert!(!is_guarded(&Method::POST, "/api/auth/login"));
        assert!(!is_guarded(&Method::POST, "/api/auth/logout"));
        assert!(!is_guarded(&Method::GET, "/api/cases"));
        assert!(!is_guarded(&Method::OPTIONS, "/api/cases"));
    }
}
