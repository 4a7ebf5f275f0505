// handlers/protected/mod.rs - Protected handlers (session required)
//
// Every route here runs behind the auth chain:
// jwt_auth_middleware → validate_user_middleware → validate_tenant_middleware,
// which leaves an `AuthUser` in the request extensions. Role checks are made
// per handler.

pub mod auth;
pub mod cases;
pub mod customers;
pub mod links;
pub mod users;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};

use crate::middleware::{jwt_auth_middleware, validate_tenant_middleware, validate_user_middleware};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/cases", get(cases::list).post(cases::create))
        .route("/cases/export", get(cases::export))
        .route("/cases/:id", get(cases::get).put(cases::update).delete(cases::delete))
        .route("/customers", get(customers::list).post(customers::create))
        .route("/customers/search", get(customers::autocomplete))
        .route(
            "/customers/:id",
            get(customers::get).put(customers::update).delete(customers::delete),
        )
        .route("/users", get(users::list).post(users::create))
        .route("/users/:id", get(users::get).put(users::update).delete(users::delete))
        .route("/shareable-links", post(links::create))
        .route("/shareable-links/case/:id", get(links::list_for_case))
        .route("/shareable-links/:id/revoke", put(links::revoke))
        .route("/shareable-links/:id", axum::routing::delete(links::delete))
        // Layers run bottom-up: the JWT check first, the company check last
        .route_layer(from_fn_with_state(state.clone(), validate_tenant_middleware))
        .route_layer(from_fn_with_state(state.clone(), validate_user_middleware))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}
