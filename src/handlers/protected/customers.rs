// handlers/protected/customers.rs - /api/customers

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::database::models::{Customer, CustomerSummary};
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, PagedResponse};
use crate::state::AppState;
use crate::validation::customer::{CreateCustomer, UpdateCustomer};
use crate::validation::query::{AutocompleteQuery, CustomerListQuery, PageRequest};
use crate::validation::ValidJson;

/// GET /api/customers?search=&page=&limit=
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<CustomerListQuery>,
) -> Result<PagedResponse<Customer>, ApiError> {
    let page = PageRequest::lenient(query.page.as_deref(), query.limit.as_deref(), &state.config.pagination);
    let search = query.search.unwrap_or_default();
    let result = state.customers(auth.tenant_id()).list(&search, page).await?;
    Ok(PagedResponse::new(result.data, page, result.total))
}

/// GET /api/customers/search?q= - autocomplete by name, email or phone
pub async fn autocomplete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<AutocompleteQuery>,
) -> ApiResult<Vec<CustomerSummary>> {
    let search = &state.config.search;
    let hits = state
        .customers(auth.tenant_id())
        .autocomplete(query.q.as_deref().unwrap_or_default(), search.autocomplete_min_chars, search.autocomplete_limit)
        .await?;
    Ok(ApiResponse::success(hits))
}

/// GET /api/customers/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Customer> {
    let id = parse_id(&id)?;
    Ok(ApiResponse::success(state.customers(auth.tenant_id()).get(id).await?))
}

/// POST /api/customers
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ValidJson(fields): ValidJson<CreateCustomer>,
) -> ApiResult<Customer> {
    auth.require_writer()?;
    let customer = state
        .customers(auth.tenant_id())
        .create(fields, auth.user_id(), Utc::now())
        .await?;
    Ok(ApiResponse::created(customer))
}

/// PUT /api/customers/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidJson(fields): ValidJson<UpdateCustomer>,
) -> ApiResult<Customer> {
    auth.require_writer()?;
    let id = parse_id(&id)?;
    let customer = state
        .customers(auth.tenant_id())
        .update(id, fields, auth.user_id(), Utc::now())
        .await?;
    Ok(ApiResponse::success(customer))
}

/// DELETE /api/customers/:id - refused while any case references the customer
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    auth.require_writer()?;
    let id = parse_id(&id)?;
    state.customers(auth.tenant_id()).delete(id).await?;
    Ok(ApiResponse::success(json!({ "message": "Customer deleted successfully" })))
}
