//! Payment API handlers.
//!
//! # Endpoints
//!
//! - `POST   /payments`          – charge a card and store the outcome
//! - `GET    /payments`          – list every payment record
//! - `GET    /payments/{id}`     – fetch one record
//! - `PUT    /payments/{id}`     – overwrite a record's editable fields
//! - `DELETE /payments/{id}`     – delete a record
//! - `GET    /search/payments`   – filter by `user`, `order` and `status`

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use shoppay_core::processors::PaymentError;
use shoppay_sdk::objects::ValidationError;

use crate::state::AppState;

mod create_payment;
mod delete_payment;
mod get_payment;
mod list_payments;
mod search_payments;
mod update_payment;

/// Build the Payment API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/payments",
            get(list_payments::list_payments).post(create_payment::create_payment),
        )
        .route(
            "/payments/{id}",
            get(get_payment::get_payment)
                .put(update_payment::update_payment)
                .delete(delete_payment::delete_payment),
        )
        .route("/search/payments", get(search_payments::search_payments))
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in Payment API handlers.
#[derive(Debug)]
pub enum PaymentApiError {
    /// Malformed body, path or query.
    Validation(ValidationError),
    /// The payment pipeline failed.
    Payment(PaymentError),
    /// A store command failed.
    Database(sqlx::Error),
    /// No record has the requested id.
    NotFound,
}

impl From<ValidationError> for PaymentApiError {
    fn from(err: ValidationError) -> Self {
        PaymentApiError::Validation(err)
    }
}

impl From<PaymentError> for PaymentApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Validation(e) => PaymentApiError::Validation(e),
            other => PaymentApiError::Payment(other),
        }
    }
}

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> Response {
        match self {
            PaymentApiError::Validation(e) => {
                (StatusCode::BAD_REQUEST, e.to_string()).into_response()
            }
            PaymentApiError::Payment(e) => {
                tracing::error!(error = %e, kind = e.kind(), "Payment API pipeline error");
                (StatusCode::INTERNAL_SERVER_ERROR, "failed to process payment").into_response()
            }
            PaymentApiError::Database(e) => {
                tracing::error!(error = %e, "Payment API database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            PaymentApiError::NotFound => {
                (StatusCode::NOT_FOUND, "payment not found").into_response()
            }
        }
    }
}
