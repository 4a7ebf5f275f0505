use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::validation::query::PageRequest;

/// Wrapper for API responses that automatically adds success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None,
        }
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let data_value = match to_value(&self.data) {
            Ok(value) => value,
            Err(response) => return response,
        };

        let envelope = json!({
            "success": true,
            "data": data_value
        });

        (status, Json(envelope)).into_response()
    }
}

/// One page of a list, with the paging figures beside `data`.
#[derive(Debug)]
pub struct PagedResponse<T: Serialize> {
    pub data: Vec<T>,
    pub page: PageRequest,
    pub total: u64,
}

impl<T: Serialize> PagedResponse<T> {
    pub fn new(data: Vec<T>, page: PageRequest, total: u64) -> Self {
        Self { data, page, total }
    }
}

impl<T: Serialize> IntoResponse for PagedResponse<T> {
    fn into_response(self) -> Response {
        let count = self.data.len();
        let data_value = match to_value(&self.data) {
            Ok(value) => value,
            Err(response) => return response,
        };

        let envelope = json!({
            "success": true,
            "data": data_value,
            "page": self.page.page,
            "limit": self.page.limit,
            "count": count,
            "total": self.total,
            "total_pages": self.page.total_pages(self.total),
        });

        (StatusCode::OK, Json(envelope)).into_response()
    }
}

fn to_value<T: Serialize>(data: &T) -> Result<Value, Response> {
    serde_json::to_value(data).map_err(|e| {
        tracing::error!("Failed to serialize response data: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "error": "Failed to serialize response data"
            })),
        )
            .into_response()
    })
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
