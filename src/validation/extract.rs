use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use super::Validate;
use crate::error::ApiError;

/// JSON body that has already passed [`Validate`].
///
/// Malformed or unexpected JSON is rejected with `INVALID_JSON`; a body that
/// parses but fails its checks is rejected with `VALIDATION_ERROR`.
///
/// ```rust,ignore
/// async fn create(ValidJson(customer): ValidJson<CreateCustomer>) { /* customer: CustomerFields */ }
/// ```
pub struct ValidJson<T: Validate>(pub T::Output);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
    T::Output: Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::invalid_json(rejection.body_text()))?;

        body.validate()
            .map(ValidJson)
            .map_err(|field_errors| ApiError::validation_error("Validation failed", Some(field_errors)))
    }
}
