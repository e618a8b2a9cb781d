//! JSON bodies exchanged with shop clients and with the payment processor.

pub mod epay;
pub mod payment;

pub use epay::{AccessToken, PaymentEnvelope, ProviderResponse, TokenResponse};
pub use payment::{
    AMOUNT_LIMIT, PaymentRecordResponse, PaymentRequest, SearchPaymentsQuery, UpdatePaymentRequest,
    ValidationError,
};

/// Literal status stored when the processor reports no status.
pub const STATUS_FAILURE: &str = "failure";
/// Status the processor reports for a settled charge.
pub const STATUS_SUCCESSFUL: &str = "successful";
/// Status the processor reports for a declined charge.
pub const STATUS_UNSUCCESSFUL: &str = "unsuccessful";

/// Statuses accepted when a record is edited through the update endpoint.
pub const KNOWN_STATUSES: [&str; 3] = [STATUS_SUCCESSFUL, STATUS_UNSUCCESSFUL, STATUS_FAILURE];
