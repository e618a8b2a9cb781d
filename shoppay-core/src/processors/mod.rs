//! Processors that carry a payment from request to record.
//!
//! - `PaymentPipeline`: runs key fetch, token exchange, cryptogram and
//!   submission, then stores the outcome; emits `ReconciliationRequired`
//! - `PublicKeyCache`: optional reuse of the processor's public key
//! - `ReconciliationJournal`: receives `ReconciliationRequired`, logs it

pub mod key_cache;
pub mod payment_pipeline;
pub mod reconciliation_journal;

pub use key_cache::PublicKeyCache;
pub use payment_pipeline::{PaymentError, PaymentPipeline, PipelineStage};
pub use reconciliation_journal::ReconciliationJournal;
