use axum::{Json, extract::State, response::IntoResponse};
use shoppay_sdk::objects::{PaymentRecordResponse, PaymentRequest};

use crate::api::extractors::PaymentJson;
use crate::state::AppState;

use super::PaymentApiError;

/// `POST /payments` — charge a card through the processor and store the outcome.
///
/// Returns the stored record, whatever status the processor reported.
/// Nothing is stored when the pipeline aborts before the processor answers.
pub async fn create_payment(
    State(state): State<AppState>,
    PaymentJson(request): PaymentJson<PaymentRequest>,
) -> Result<impl IntoResponse, PaymentApiError> {
    request.validate()?;

    let record = state.payment_pipeline().await.run(request).await?;

    Ok(Json(PaymentRecordResponse::from(record)))
}
