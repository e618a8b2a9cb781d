//! Configuration module for shoppay-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables.

pub mod file;
pub mod runtime;

use crate::config::file::{
    FileConfig, MerchantConfig as FileMerchantConfig, ProcessorConfig as FileProcessorConfig,
};
use crate::config::runtime::{MerchantConfig, ProcessorConfig, ServerConfig, SharedConfig};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Loaded configuration result containing all parts.
#[derive(Debug)]
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub processor: ProcessorConfig,
    pub merchant: MerchantConfig,
}

impl LoadedConfig {
    /// Convert into a SharedConfig with Arc<RwLock<T>> wrappers.
    pub fn into_shared(self) -> SharedConfig {
        SharedConfig::new(self.server, self.processor, self.merchant)
    }
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    /// 4. Build the loaded configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        validate(&file_config)?;

        Ok(build_loaded_config(file_config))
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    let processor = &config.processor;
    if processor.client_id.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "processor.client_id must not be empty".to_string(),
        ));
    }
    if processor.client_secret.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "processor.client_secret must not be empty".to_string(),
        ));
    }
    if processor.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "processor.request_timeout_secs must be greater than zero".to_string(),
        ));
    }
    if processor.currency.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "processor.currency must not be empty".to_string(),
        ));
    }
    if config.merchant.post_link.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "merchant.post_link must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn build_loaded_config(file_config: FileConfig) -> LoadedConfig {
    LoadedConfig {
        server: ServerConfig {
            listen: file_config.server.listen,
        },
        processor: convert_processor(file_config.processor),
        merchant: convert_merchant(file_config.merchant),
    }
}

fn convert_processor(p: FileProcessorConfig) -> ProcessorConfig {
    ProcessorConfig {
        token_url: p.token_url,
        public_key_url: p.public_key_url,
        payment_url: p.payment_url,
        client_id: p.client_id,
        client_secret: p.client_secret,
        scope: p.scope,
        currency: p.currency,
        request_timeout: Duration::from_secs(p.request_timeout_secs),
        public_key_ttl: Duration::from_secs(p.public_key_ttl_secs),
    }
}

fn convert_merchant(m: FileMerchantConfig) -> MerchantConfig {
    MerchantConfig {
        post_link: m.post_link,
        failure_post_link: m.failure_post_link.filter(|link| !link.trim().is_empty()),
        card_save: m.card_save,
        default_cardholder_name: m.default_cardholder_name,
        description_prefix: m.description_prefix,
    }
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_CONFIG: &str = r#"
[processor]
token_url = "http://localhost/token"
public_key_url = "http://localhost/public.rsa"
payment_url = "http://localhost/pay"
client_id = "id"
client_secret = "secret"
request_timeout_secs = 5

[merchant]
post_link = "http://localhost/callback"
failure_post_link = ""
"#;

    fn write_config(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "shoppay-config-{}-{}.toml",
            name,
            std::process::id()
        ));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_applies_listen_override() {
        let path = write_config("override", VALID_CONFIG);
        let listen: SocketAddr = "127.0.0.1:9000".parse().unwrap();

        let loaded = ConfigLoader::new(&path, Some(listen)).load().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.server.listen, listen);
        assert_eq!(loaded.processor.request_timeout, Duration::from_secs(5));
        assert_eq!(loaded.processor.public_key_ttl, Duration::ZERO);
        assert!(loaded.merchant.failure_post_link.is_none());
        assert_eq!(loaded.merchant.describe_order(7), "Order #7");
    }

    #[test]
    fn test_empty_credentials_are_rejected() {
        let path = write_config(
            "empty-secret",
            &VALID_CONFIG.replace(r#"client_secret = "secret""#, r#"client_secret = """#),
        );

        let err = ConfigLoader::new(&path, None).load().unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(err, ConfigError::ValidationError(msg) if msg.contains("client_secret")));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let path = write_config(
            "zero-timeout",
            &VALID_CONFIG.replace("request_timeout_secs = 5", "request_timeout_secs = 0"),
        );

        let err = ConfigLoader::new(&path, None).load().unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(err, ConfigError::ValidationError(msg) if msg.contains("timeout")));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ConfigLoader::new("/nonexistent/shoppay-config.toml", None)
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
