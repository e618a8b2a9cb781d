//! Signal handling for graceful shutdown and config reload.

use crate::config::ConfigLoader;
use crate::state::AppState;
use shoppay_sdk::client::build_http_client;
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;

/// Creates a future that completes when a shutdown signal is received.
///
/// Listens for SIGTERM and SIGINT (Ctrl+C). If a handler cannot be
/// installed, falls back to Ctrl+C only.
pub async fn shutdown_signal() {
    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!(error = %e, "Failed to install signal handlers, waiting for Ctrl+C");
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            }
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT, initiating graceful shutdown");
        }
    }
}

/// Spawns a task that listens for SIGHUP and reloads the configuration.
///
/// Returns a Notify that can be used to signal when shutdown is complete.
pub fn spawn_config_reload_handler(state: AppState, config_loader: Arc<ConfigLoader>) -> Arc<Notify> {
    let shutdown_notify = Arc::new(Notify::new());
    let shutdown_notify_clone = shutdown_notify.clone();

    tokio::spawn(async move {
        let mut sighup = match signal(SignalKind::hangup()) {
            Ok(sighup) => sighup,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGHUP handler, config reload disabled");
                return;
            }
        };

        loop {
            tokio::select! {
                _ = sighup.recv() => {
                    tracing::info!("Received SIGHUP, reloading configuration");
                    match config_loader.reload() {
                        Ok(loaded_config) => apply_reload(&state, loaded_config).await,
                        Err(e) => {
                            tracing::error!("Failed to reload configuration: {}", e);
                        }
                    }
                }
                _ = shutdown_notify_clone.notified() => {
                    tracing::debug!("Config reload handler shutting down");
                    break;
                }
            }
        }
    });

    shutdown_notify
}

async fn apply_reload(state: &AppState, loaded_config: crate::config::LoadedConfig) {
    let timeout_changed =
        state.config.processor.read().await.request_timeout != loaded_config.processor.request_timeout;
    if timeout_changed {
        match build_http_client(loaded_config.processor.request_timeout) {
            Ok(client) => *state.http.write().await = client,
            Err(e) => {
                tracing::error!(error = %e, "Failed to rebuild HTTP client, keeping previous configuration");
                return;
            }
        }
    }

    // The listen address only takes effect on restart.
    *state.config.server.write().await = loaded_config.server;
    *state.config.processor.write().await = loaded_config.processor;
    *state.config.merchant.write().await = loaded_config.merchant;
    state.key_cache.clear().await;

    tracing::info!("Configuration reloaded successfully");
}

/// Signal the reconciliation journal to stop and wait for it.
///
/// Returns the number of events the journal wrote.
pub async fn stop_reconciliation_journal(
    shutdown_tx: &watch::Sender<bool>,
    journal: JoinHandle<usize>,
) -> usize {
    if shutdown_tx.send(true).is_err() {
        tracing::debug!("ReconciliationJournal already stopped");
    }
    match journal.await {
        Ok(0) => 0,
        Ok(written) => {
            tracing::warn!(written, "Payments awaiting manual reconciliation");
            written
        }
        Err(e) => {
            tracing::error!(error = %e, "ReconciliationJournal task failed");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shoppay_core::events::{ReconciliationRequired, reconciliation_channel};
    use shoppay_core::processors::ReconciliationJournal;

    #[tokio::test]
    async fn test_stop_drains_pending_reconciliations() {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (tx, rx) = reconciliation_channel();
        tx.send(ReconciliationRequired {
            order_id: 1,
            user_id: 1,
            amount: Decimal::new(10000, 2),
            status: "successful".to_string(),
            provider_id: "tx-1".to_string(),
            provider_reference: String::new(),
            invoice_id: "000000001".to_string(),
            occurred_at: time::OffsetDateTime::UNIX_EPOCH,
        })
        .await
        .unwrap();

        let journal = tokio::spawn(ReconciliationJournal::new(rx, shutdown_rx).run());

        assert_eq!(stop_reconciliation_journal(&shutdown_tx, journal).await, 1);
    }

    #[tokio::test]
    async fn test_stop_tolerates_finished_journal() {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (tx, rx) = reconciliation_channel();
        drop(tx);

        let journal = tokio::spawn(ReconciliationJournal::new(rx, shutdown_rx).run());
        while !journal.is_finished() {
            tokio::task::yield_now().await;
        }

        assert_eq!(stop_reconciliation_journal(&shutdown_tx, journal).await, 0);
    }
}
