//! Application state shared across all request handlers.

use crate::config::runtime::SharedConfig;
use shoppay_core::events::ReconciliationSender;
use shoppay_core::framework::DatabaseProcessor;
use shoppay_core::processors::{PaymentPipeline, PublicKeyCache};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Shared configuration with per-section locks (reloaded via SIGHUP).
    pub config: SharedConfig,
    /// Outbound client for the card processor, rebuilt when the timeout changes.
    pub http: Arc<RwLock<reqwest::Client>>,
    /// Processor public key, reused for `public_key_ttl`.
    pub key_cache: Arc<PublicKeyCache>,
    /// Unstored charges go to the reconciliation journal.
    pub reconciliation_tx: ReconciliationSender,
}

impl AppState {
    pub fn new(
        db: PgPool,
        config: SharedConfig,
        http: reqwest::Client,
        reconciliation_tx: ReconciliationSender,
    ) -> Self {
        Self {
            db,
            config,
            http: Arc::new(RwLock::new(http)),
            key_cache: Arc::new(PublicKeyCache::new()),
            reconciliation_tx,
        }
    }

    pub fn processor(&self) -> DatabaseProcessor {
        DatabaseProcessor::new(self.db.clone())
    }

    /// Build a pipeline over the current configuration.
    pub async fn payment_pipeline(&self) -> PaymentPipeline<DatabaseProcessor> {
        let (processor, merchant) = self.config.pipeline_snapshot().await;
        let http = self.http.read().await.clone();
        PaymentPipeline::new(
            http,
            processor,
            merchant,
            Arc::clone(&self.key_cache),
            self.processor(),
        )
        .with_reconciliation(self.reconciliation_tx.clone())
    }
}
