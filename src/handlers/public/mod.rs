// handlers/public/mod.rs - Public handlers (no session required)
//
// Registration, login and logout, the health probe, and shareable link
// verification, where the link token is the only credential.

pub mod auth;
pub mod health;
pub mod links;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub use health::health;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/health", get(health::health))
        .route("/shareable-links/:id/verify", get(links::verify))
}
