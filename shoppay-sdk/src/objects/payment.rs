//! Payment service request and response types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::KNOWN_STATUSES;
use crate::card::CardData;

/// Amounts must stay below this many major units (`NUMERIC(14, 2)`).
pub const AMOUNT_LIMIT: i64 = 1_000_000_000_000;

/// Errors raised while validating an inbound body or query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("field `{0}` is required")]
    MissingField(&'static str),
    #[error("field `amount` must be greater than zero")]
    NonPositiveAmount,
    #[error("field `amount` is too large")]
    AmountOutOfRange,
    #[error("field `amount` must have at most two decimal places")]
    AmountPrecision,
    #[error("unknown payment status {0:?}")]
    UnknownStatus(String),
    #[error("invalid {0} ID")]
    InvalidId(&'static str),
    #[error("invalid request body: {0}")]
    MalformedBody(String),
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Body of `POST /payments`.
///
/// Carries raw card data, so it is never persisted or logged verbatim.
#[derive(Clone, Default, Deserialize)]
pub struct PaymentRequest {
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub order_id: i64,
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub hpan: String,
    #[serde(default, rename = "expDate")]
    pub exp_date: String,
    #[serde(default)]
    pub cvc: String,
    #[serde(default, rename = "terminalId")]
    pub terminal_id: String,
    /// Cardholder name as printed on the card.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl PaymentRequest {
    /// Check that every required field is present and the amount is positive.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.amount.is_zero() {
            return Err(ValidationError::MissingField("amount"));
        }
        if self.amount.is_sign_negative() {
            return Err(ValidationError::NonPositiveAmount);
        }
        check_amount_bounds(self.amount)?;
        if self.order_id == 0 {
            return Err(ValidationError::MissingField("order_id"));
        }
        if self.user_id == 0 {
            return Err(ValidationError::MissingField("user_id"));
        }
        let required = [
            ("hpan", &self.hpan),
            ("expDate", &self.exp_date),
            ("cvc", &self.cvc),
            ("terminalId", &self.terminal_id),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(name));
            }
        }
        Ok(())
    }

    /// The sensitive subset handed to the cryptogram encoder.
    pub fn card_data(&self) -> CardData {
        CardData {
            hpan: self.hpan.clone(),
            exp_date: self.exp_date.clone(),
            cvc: self.cvc.clone(),
            terminal_id: self.terminal_id.clone(),
        }
    }
}

impl std::fmt::Debug for PaymentRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentRequest")
            .field("amount", &self.amount)
            .field("order_id", &self.order_id)
            .field("user_id", &self.user_id)
            .field("card", &self.card_data())
            .finish_non_exhaustive()
    }
}

/// Cents are the smallest unit, and the stored column holds 12 integer digits.
fn check_amount_bounds(amount: Decimal) -> Result<(), ValidationError> {
    if amount.normalize().scale() > 2 {
        return Err(ValidationError::AmountPrecision);
    }
    if amount >= Decimal::from(AMOUNT_LIMIT) {
        return Err(ValidationError::AmountOutOfRange);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A stored payment as returned by every payment endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecordResponse {
    pub id: i64,
    pub user_id: i64,
    pub order_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "time::serde::rfc3339")]
    pub payment_date: time::OffsetDateTime,
    pub status: String,
}

/// Body of `PUT /payments/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePaymentRequest {
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub order_id: i64,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub status: String,
}

impl UpdatePaymentRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.user_id == 0 {
            return Err(ValidationError::MissingField("user_id"));
        }
        if self.order_id == 0 {
            return Err(ValidationError::MissingField("order_id"));
        }
        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount);
        }
        check_amount_bounds(self.amount)?;
        if !KNOWN_STATUSES.contains(&self.status.as_str()) {
            return Err(ValidationError::UnknownStatus(self.status.clone()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Query string of `GET /search/payments`.
///
/// Every filter is optional. Empty strings and zero ids mean "no filter".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPaymentsQuery {
    pub user: Option<String>,
    pub order: Option<String>,
    pub status: Option<String>,
}

impl SearchPaymentsQuery {
    pub fn user_id(&self) -> Result<Option<i64>, ValidationError> {
        parse_id_filter(self.user.as_deref(), "user")
    }

    pub fn order_id(&self) -> Result<Option<i64>, ValidationError> {
        parse_id_filter(self.order.as_deref(), "order")
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref().filter(|s| !s.is_empty())
    }
}

fn parse_id_filter(
    raw: Option<&str>,
    name: &'static str,
) -> Result<Option<i64>, ValidationError> {
    match raw {
        None | Some("") => Ok(None),
        Some(value) => {
            let id: i64 = value.parse().map_err(|_| ValidationError::InvalidId(name))?;
            Ok((id != 0).then_some(id))
        }
    }
}
