// handlers/mod.rs - Two-tier handler architecture
//
// Public (no session) → Protected (session cookie or Bearer token).
// Each tier builds its own router; `crate::router` mounts both under /api.

pub mod protected;
pub mod public;

use axum::{http::{StatusCode, Uri}, response::IntoResponse, Json};
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;

/// Parses an id taken from the path. Anything that is not a UUID is a 400.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::try_parse(raw.trim()).map_err(|_| ApiError::bad_request("Invalid ID format"))
}

/// Fallback for unmatched routes.
pub async fn route_not_found(uri: Uri) -> impl IntoResponse {
    let mut body = ApiError::not_found("Route not found").to_json();
    body["path"] = json!(uri.path());
    (StatusCode::NOT_FOUND, Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_ids_must_be_uuids() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
        let err = parse_id("507f1f77bcf86cd799439011").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Invalid ID format");
    }
}
