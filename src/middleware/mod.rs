pub mod auth;
pub mod demo;
pub mod errors;
pub mod response;
pub mod validate_tenant;
pub mod validate_user;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use demo::demo_guard_middleware;
pub use errors::{expose_error_details, panic_response};
pub use response::{ApiResponse, ApiResult, PagedResponse};
pub use validate_tenant::validate_tenant_middleware;
pub use validate_user::{validate_user_middleware, ValidatedUser};
