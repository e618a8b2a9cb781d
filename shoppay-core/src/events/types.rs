use rust_decimal::Decimal;

/// The processor reported a charge but the payment record was not stored.
///
/// Carries enough of the processor's answer to find the transaction in
/// the processor's own logs. Card data never appears here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationRequired {
    pub order_id: i64,
    pub user_id: i64,
    pub amount: Decimal,
    /// Status the processor reported.
    pub status: String,
    /// Processor transaction id.
    pub provider_id: String,
    /// Processor reference (RRN).
    pub provider_reference: String,
    /// Invoice id sent to the processor.
    pub invoice_id: String,
    pub occurred_at: time::OffsetDateTime,
}
