use axum::{Json, extract::State, response::IntoResponse};
use kanau::processor::Processor;
use shoppay_core::entities::UpdatePayment;
use shoppay_sdk::objects::{PaymentRecordResponse, UpdatePaymentRequest};

use crate::api::extractors::{PaymentId, PaymentJson};
use crate::state::AppState;

use super::PaymentApiError;

/// `PUT /payments/{id}` — overwrite a record's editable fields.
///
/// The record keeps its original `payment_date`.
pub async fn update_payment(
    State(state): State<AppState>,
    PaymentId(id): PaymentId,
    PaymentJson(body): PaymentJson<UpdatePaymentRequest>,
) -> Result<impl IntoResponse, PaymentApiError> {
    body.validate()?;

    let record = state
        .processor()
        .process(UpdatePayment {
            id,
            user_id: body.user_id,
            order_id: body.order_id,
            amount: body.amount,
            status: body.status,
        })
        .await
        .map_err(PaymentApiError::Database)?
        .ok_or(PaymentApiError::NotFound)?;

    tracing::info!(payment_id = id, status = %record.status, "Payment record updated");
    Ok(Json(PaymentRecordResponse::from(record)))
}
