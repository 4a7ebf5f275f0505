//! Router assembly: routes, the cross-cutting middleware stack and CORS.

use axum::{
    extract::State,
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::config::SecurityConfig;
use crate::handlers::{self, protected, public};
use crate::middleware::{demo_guard_middleware, expose_error_details, panic_response};
use crate::state::AppState;

/// Builds the complete application.
///
/// Every route lives under `/api`; `/health` is also served at the root for
/// load balancers.
pub fn create_app(state: AppState) -> Router {
    info!(
        "Creating router ({} environment, demo mode {})",
        state.config.environment.as_str(),
        if state.config.server.demo_mode { "on" } else { "off" }
    );

    let api = Router::new()
        .merge(public::routes())
        .merge(protected::routes(state.clone()));

    // Outermost first: the demo guard sees the request last
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(&state.config.security))
        .layer(from_fn_with_state(state.clone(), expose_error_details))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(from_fn_with_state(state.clone(), demo_guard_middleware));

    Router::new()
        .route("/", get(root))
        .route("/health", get(public::health))
        .nest("/api", api)
        .fallback(handlers::route_not_found)
        .layer(middleware)
        .with_state(state)
}

/// Browsers send the session cookie cross-origin, so credentials are allowed.
/// With credentials a literal `*` origin is not permitted; `*` in the config
/// therefore mirrors the caller's origin instead.
fn build_cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins = if security.cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = security
            .cors_origins
            .iter()
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    let server = &state.config.server;
    Json(json!({
        "success": true,
        "data": {
            "name": server.app_name,
            "version": server.app_version,
            "description": "Multi-tenant legal case management API",
            "endpoints": {
                "health": "/health, /api/health (public)",
                "auth": "/api/auth/register, /api/auth/login, /api/auth/logout (public), /api/auth/me",
                "cases": "/api/cases[/:id], /api/cases/export",
                "customers": "/api/customers[/:id], /api/customers/search",
                "users": "/api/users[/:id]",
                "shareable_links": "/api/shareable-links, /api/shareable-links/:token/verify (public)"
            }
        }
    }))
}

/// Initializes the global tracing subscriber.
///
/// Honours `RUST_LOG`; otherwise logs `info` everywhere and `debug` for this crate.
pub fn init_logging(default_filter: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();
}
