pub mod auth_service;
pub mod case_service;
pub mod customer_service;
pub mod error;
pub mod export_service;
pub mod link_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use case_service::{CasePage, CaseService};
pub use customer_service::{CustomerPage, CustomerService};
pub use error::{ServiceError, ServiceResult};
pub use link_service::{LinkService, VerifiedLink};
pub use user_service::UserService;
