//! ReconciliationJournal processor.
//!
//! Receives `ReconciliationRequired` events from the payment pipeline and
//! writes one structured `error!` record per event, so an operator can
//! match the processor's transaction against the missing payment record.
//!
//! On shutdown, events already queued are still written before the
//! journal stops.

use crate::events::{ReconciliationReceiver, ReconciliationRequired};
use tokio::sync::watch;
use tracing::{error, info};

pub struct ReconciliationJournal {
    rx: ReconciliationReceiver,
    shutdown_rx: watch::Receiver<bool>,
}

impl ReconciliationJournal {
    pub fn new(rx: ReconciliationReceiver, shutdown_rx: watch::Receiver<bool>) -> Self {
        Self { rx, shutdown_rx }
    }

    /// Run until shutdown or until every sender is gone.
    ///
    /// Returns the number of events written.
    pub async fn run(mut self) -> usize {
        info!("ReconciliationJournal started");
        let mut written = 0;

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("ReconciliationJournal received shutdown signal");
                        break;
                    }
                }

                Some(event) = self.rx.recv() => {
                    record(&event);
                    written += 1;
                }

                else => {
                    info!("ReconciliationRequired channel closed");
                    break;
                }
            }
        }

        self.rx.close();
        while let Ok(event) = self.rx.try_recv() {
            record(&event);
            written += 1;
        }

        info!(written, "ReconciliationJournal shutdown complete");
        written
    }
}

fn record(event: &ReconciliationRequired) {
    error!(
        order_id = event.order_id,
        user_id = event.user_id,
        amount = %event.amount,
        status = %event.status,
        provider_id = %event.provider_id,
        provider_reference = %event.provider_reference,
        invoice_id = %event.invoice_id,
        occurred_at = %event.occurred_at,
        "Payment charged by processor but not stored, manual reconciliation required"
    );
}
