// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::database::DatabaseError;
use crate::services::ServiceError;
use crate::validation::FieldErrors;

/// Internal detail of a 500, attached to the response for the development-only
/// error middleware. Never serialized by the error itself.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<FieldErrors>,
    },
    InvalidJson(String),
    CustomerInUse {
        message: String,
        references: i64,
    },

    // 401 Unauthorized
    Unauthorized(String),
    PasswordRequired,

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError {
        message: String,
        detail: Option<String>,
    },

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_)
            | ApiError::ValidationError { .. }
            | ApiError::InvalidJson(_)
            | ApiError::CustomerInUse { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) | ApiError::PasswordRequired => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::InvalidJson(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
            ApiError::ValidationError { message, .. }
            | ApiError::CustomerInUse { message, .. }
            | ApiError::InternalServerError { message, .. } => message,
            ApiError::PasswordRequired => "Password required",
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::CustomerInUse { .. } => "CUSTOMER_IN_USE",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::PasswordRequired => "PASSWORD_REQUIRED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError { .. } => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        });

        match self {
            ApiError::ValidationError {
                field_errors: Some(field_errors),
                ..
            } => {
                response["field_errors"] = json!(field_errors);
            }
            ApiError::PasswordRequired => {
                response["requiresPassword"] = json!(true);
            }
            ApiError::CustomerInUse { references, .. } => {
                response["references"] = json!(references);
            }
            _ => {}
        }

        response
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>, field_errors: Option<FieldErrors>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    /// A generic 500 that keeps `detail` for development responses.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        ApiError::InternalServerError {
            message: "Internal Server Error".to_string(),
            detail: Some(detail.to_string()),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::Conflict(constraint) => {
                tracing::debug!("Unique constraint violated: {}", constraint);
                ApiError::conflict("Record already exists")
            }
            other => {
                // Don't expose storage errors to clients
                tracing::error!("Storage error: {}", other);
                ApiError::internal(other)
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::TokenExpired => {
                ApiError::unauthorized(err.to_string())
            }
            AuthError::InvalidSecret | AuthError::TokenGeneration(_) | AuthError::Hash(_) => {
                tracing::error!("Authentication backend error: {}", err);
                ApiError::internal(err)
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::BadRequest(msg) => ApiError::bad_request(msg),
            ServiceError::Validation(field_errors) => ApiError::validation_error("Validation failed", Some(field_errors)),
            ServiceError::Unauthorized(msg) => ApiError::unauthorized(msg),
            ServiceError::Forbidden(msg) => ApiError::forbidden(msg),
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::Conflict(msg) => ApiError::conflict(msg),
            ServiceError::PasswordRequired => ApiError::PasswordRequired,
            ServiceError::CustomerInUse { references } => ApiError::CustomerInUse { message, references },
            ServiceError::Export(e) => {
                tracing::error!("Spreadsheet export failed: {}", e);
                ApiError::internal(e)
            }
            ServiceError::Auth(e) => e.into(),
            ServiceError::Database(e) => e.into(),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = Json(self.to_json());
        let mut response = (status, body).into_response();
        if let ApiError::InternalServerError { detail: Some(detail), .. } = self {
            response.extensions_mut().insert(ErrorDetail(detail));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_required_carries_flag() {
        let err: ApiError = ServiceError::PasswordRequired.into();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        let body = err.to_json();
        assert_eq!(body["requiresPassword"], true);
        assert_eq!(body["error"], true);
    }

    #[test]
    fn customer_in_use_reports_count() {
        let err: ApiError = ServiceError::CustomerInUse { references: 3 }.into();
        let body = err.to_json();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(body["references"], 3);
        assert_eq!(body["message"], "Cannot delete customer. They are referenced in 3 case(s).");
    }

    #[test]
    fn storage_failures_stay_generic() {
        let err: ApiError = DatabaseError::QueryError("relation \"cases\" does not exist".into()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_json()["message"], "Internal Server Error");

        let response = err.into_response();
        let detail = response.extensions().get::<ErrorDetail>().unwrap();
        assert!(detail.0.contains("does not exist"));
    }

    #[test]
    fn validation_lists_fields() {
        let errors = FieldErrors::from([("email".to_string(), "Invalid email format".to_string())]);
        let err: ApiError = ServiceError::Validation(errors).into();
        let body = err.to_json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field_errors"]["email"], "Invalid email format");
    }
}
