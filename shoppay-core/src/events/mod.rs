//! Events raised by the payment pipeline.
//!
//! The only event today is [`ReconciliationRequired`]: the processor
//! reported a charge but the record could not be stored. The
//! `ReconciliationJournal` processor consumes it.

pub mod channels;
pub mod types;

pub use channels::{
    DEFAULT_CHANNEL_BUFFER, ReconciliationReceiver, ReconciliationSender, reconciliation_channel,
};
pub use types::ReconciliationRequired;
