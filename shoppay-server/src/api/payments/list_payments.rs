use axum::{Json, extract::State, response::IntoResponse};
use kanau::processor::Processor;
use shoppay_core::entities::ListPayments;
use shoppay_sdk::objects::PaymentRecordResponse;

use crate::state::AppState;

use super::PaymentApiError;

/// `GET /payments` — list every payment record.
pub async fn list_payments(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let records = state
        .processor()
        .process(ListPayments)
        .await
        .map_err(PaymentApiError::Database)?;

    let response: Vec<PaymentRecordResponse> = records.into_iter().map(Into::into).collect();
    Ok(Json(response))
}
