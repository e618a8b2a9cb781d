//! Runtime configuration re-exports.
//!
//! The actual config types are defined in `shoppay-core::config`.
//! This module re-exports them for convenience.

pub use shoppay_core::config::{MerchantConfig, ProcessorConfig, ServerConfig, SharedConfig};
