//! Configuration types for the payments service.
//!
//! These types represent the validated runtime configuration. The actual
//! config loading/parsing is handled by the server crate.

mod merchant;
mod processor;
mod server;

pub use merchant::MerchantConfig;
pub use processor::ProcessorConfig;
pub use server::ServerConfig;

use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared configuration state with separate locks for each section.
///
/// A pipeline run copies the processor and merchant sections once at start,
/// so a reload never changes endpoints halfway through a payment.
#[derive(Clone)]
pub struct SharedConfig {
    /// Server configuration (listen address).
    pub server: Arc<RwLock<ServerConfig>>,
    /// Processor endpoints and credentials.
    pub processor: Arc<RwLock<ProcessorConfig>>,
    /// Merchant defaults used to build the payment envelope.
    pub merchant: Arc<RwLock<MerchantConfig>>,
}

impl SharedConfig {
    pub fn new(server: ServerConfig, processor: ProcessorConfig, merchant: MerchantConfig) -> Self {
        Self {
            server: Arc::new(RwLock::new(server)),
            processor: Arc::new(RwLock::new(processor)),
            merchant: Arc::new(RwLock::new(merchant)),
        }
    }

    /// Clone the processor and merchant sections for one pipeline run.
    pub async fn pipeline_snapshot(&self) -> (ProcessorConfig, MerchantConfig) {
        let processor = self.processor.read().await.clone();
        let merchant = self.merchant.read().await.clone();
        (processor, merchant)
    }
}
