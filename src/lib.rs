pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod search;
pub mod services;
pub mod sort;
pub mod state;
pub mod validation;

pub use config::AppConfig;
pub use error::ApiError;
pub use router::{create_app, init_logging};
pub use state::AppState;
