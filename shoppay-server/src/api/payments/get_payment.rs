use axum::{Json, extract::State, response::IntoResponse};
use kanau::processor::Processor;
use shoppay_core::entities::GetPaymentById;
use shoppay_sdk::objects::PaymentRecordResponse;

use crate::api::extractors::PaymentId;
use crate::state::AppState;

use super::PaymentApiError;

/// `GET /payments/{id}` — fetch one payment record.
pub async fn get_payment(
    State(state): State<AppState>,
    PaymentId(id): PaymentId,
) -> Result<impl IntoResponse, PaymentApiError> {
    let record = state
        .processor()
        .process(GetPaymentById { id })
        .await
        .map_err(PaymentApiError::Database)?
        .ok_or(PaymentApiError::NotFound)?;

    Ok(Json(PaymentRecordResponse::from(record)))
}
