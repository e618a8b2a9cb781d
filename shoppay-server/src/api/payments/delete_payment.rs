use axum::{Json, extract::State, response::IntoResponse};
use kanau::processor::Processor;
use shoppay_core::entities::DeletePayment;

use crate::api::extractors::PaymentId;
use crate::state::AppState;

use super::PaymentApiError;

/// `DELETE /payments/{id}` — delete a payment record.
///
/// Answers `"Deleted"` whether or not the record existed.
pub async fn delete_payment(
    State(state): State<AppState>,
    PaymentId(id): PaymentId,
) -> Result<impl IntoResponse, PaymentApiError> {
    let removed = state
        .processor()
        .process(DeletePayment { id })
        .await
        .map_err(PaymentApiError::Database)?;

    tracing::info!(payment_id = id, removed, "Payment record deleted");
    Ok(Json("Deleted"))
}
