use std::any::Any;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::error::{ApiError, ErrorDetail};
use crate::state::AppState;

/// Largest error body the detail middleware will rewrite.
const MAX_ERROR_BODY: usize = 64 * 1024;

/// In development, copies the internal detail of a 500 into its JSON body
/// as `detail`. Other environments only ever see the generic message.
pub async fn expose_error_details(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if !state.config.is_development() {
        return response;
    }
    let Some(ErrorDetail(detail)) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_ERROR_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Could not read error body to attach detail: {}", e);
            return ApiError::internal(detail).into_response();
        }
    };

    let body = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(mut obj)) => {
            obj.insert("detail".to_string(), Value::String(detail));
            Body::from(Value::Object(obj).to_string())
        }
        _ => Body::from(bytes),
    };
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, body)
}

/// Turns a handler panic into the standard 500 body.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Handler panicked: {}", detail);
    ApiError::internal(detail).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn panics_become_generic_500s() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.extensions().get::<ErrorDetail>().map(|d| d.0.as_str()), Some("boom"));
    }
}
