use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use kanau::processor::Processor;
use shoppay_core::entities::SearchPayments;
use shoppay_sdk::objects::{PaymentRecordResponse, SearchPaymentsQuery, ValidationError};

use crate::state::AppState;

use super::PaymentApiError;

/// `GET /search/payments?user=&order=&status=` — filter payment records.
///
/// Absent or empty filters match everything.
pub async fn search_payments(
    State(state): State<AppState>,
    query: Result<Query<SearchPaymentsQuery>, axum::extract::rejection::QueryRejection>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let Query(query) =
        query.map_err(|e| PaymentApiError::Validation(ValidationError::MalformedBody(e.body_text())))?;

    let search = SearchPayments::new(query.user_id()?, query.order_id()?, query.status());

    let records = state
        .processor()
        .process(search)
        .await
        .map_err(PaymentApiError::Database)?;

    let response: Vec<PaymentRecordResponse> = records.into_iter().map(Into::into).collect();
    Ok(Json(response))
}
