use thiserror::Error;

use crate::auth::AuthError;
use crate::database::DatabaseError;
use crate::validation::FieldErrors;

/// Business-rule failures raised by the services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// The shareable link has a password and it was missing or wrong.
    #[error("Password required")]
    PasswordRequired,

    #[error("Cannot delete customer. They are referenced in {references} case(s).")]
    CustomerInUse { references: i64 },

    #[error("Spreadsheet generation failed: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::Forbidden(message.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
