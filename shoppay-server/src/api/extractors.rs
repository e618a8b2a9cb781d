//! Custom Axum extractors for payment requests.
//!
//! Provides:
//! - `PaymentJson<T>`: JSON body whose rejection becomes a plain 400
//!   with a short message instead of axum's default rejection text.
//! - `PaymentId`: the `{id}` path segment, parsed as a record id.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use shoppay_sdk::objects::ValidationError;

use super::payments::PaymentApiError;

/// JSON request body for the payment endpoints.
pub struct PaymentJson<T>(pub T);

impl<S, T> FromRequest<S> for PaymentJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = PaymentApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(PaymentJson(value)),
            Err(rejection) => Err(PaymentApiError::Validation(
                ValidationError::MalformedBody(rejection.body_text()),
            )),
        }
    }
}

/// Record id from the `{id}` path segment.
#[derive(Debug, Clone, Copy)]
pub struct PaymentId(pub i64);

impl<S> FromRequestParts<S> for PaymentId
where
    S: Send + Sync,
{
    type Rejection = PaymentApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let invalid = || PaymentApiError::Validation(ValidationError::InvalidId("payment"));
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| invalid())?;
        raw.parse().map(PaymentId).map_err(|_| invalid())
    }
}
