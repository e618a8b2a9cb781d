//! Event channel factories and handles.

use super::types::ReconciliationRequired;
use tokio::sync::mpsc;

/// Default buffer size for event channels.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for ReconciliationRequired events.
pub type ReconciliationSender = mpsc::Sender<ReconciliationRequired>;
/// Receiver handle for ReconciliationRequired events.
pub type ReconciliationReceiver = mpsc::Receiver<ReconciliationRequired>;

/// Create a new ReconciliationRequired channel.
///
/// Every pipeline gets a clone of the sender; the journal owns the receiver.
pub fn reconciliation_channel() -> (ReconciliationSender, ReconciliationReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
