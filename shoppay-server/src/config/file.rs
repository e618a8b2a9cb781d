//! TOML file configuration structures.
//!
//! These structs directly map to the `shoppay-config.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub processor: ProcessorConfig,
    pub merchant: MerchantConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8084").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8084))
}

/// Card processor section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    pub token_url: Url,
    pub public_key_url: Url,
    pub payment_url: Url,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Bound on every outbound call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// How long a fetched public key is reused, in seconds. 0 disables caching.
    #[serde(default)]
    pub public_key_ttl_secs: u64,
}

fn default_currency() -> String {
    "KZT".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

/// Merchant section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantConfig {
    /// Callback the processor posts the outcome to.
    pub post_link: String,
    #[serde(default)]
    pub failure_post_link: Option<String>,
    #[serde(default)]
    pub card_save: bool,
    #[serde(default)]
    pub default_cardholder_name: String,
    #[serde(default = "default_description_prefix")]
    pub description_prefix: String,
}

fn default_description_prefix() -> String {
    "Order".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parsing() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[processor]
token_url = "https://testoauth.homebank.kz/epay2/oauth2/token"
public_key_url = "https://testepay.homebank.kz/api/public.rsa"
payment_url = "https://testepay.homebank.kz/api/payment/cryptopay"
client_id = "test"
client_secret = "yF587AV9Ms94qN2QShFzVR3vFnWkhjbAK3sG"
scope = "payment"
public_key_ttl_secs = 300

[merchant]
post_link = "https://shop.example/payments/callback"
failure_post_link = "https://shop.example/payments/failed"
default_cardholder_name = "CARDHOLDER"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(config.processor.currency, "KZT");
        assert_eq!(config.processor.request_timeout_secs, 15);
        assert_eq!(config.processor.public_key_ttl_secs, 300);
        assert_eq!(config.merchant.description_prefix, "Order");
        assert!(!config.merchant.card_save);
        assert_eq!(
            config.merchant.failure_post_link.as_deref(),
            Some("https://shop.example/payments/failed")
        );
    }

    #[test]
    fn test_missing_server_section_uses_default_listen() {
        let toml_str = r#"
[processor]
token_url = "http://localhost/token"
public_key_url = "http://localhost/public.rsa"
payment_url = "http://localhost/pay"
client_id = "id"
client_secret = "secret"

[merchant]
post_link = "http://localhost/callback"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:8084".parse().unwrap());
        assert_eq!(config.processor.public_key_ttl_secs, 0);
        assert!(config.merchant.failure_post_link.is_none());
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let toml_str = r#"
[processor]
token_url = "not a url"
public_key_url = "http://localhost/public.rsa"
payment_url = "http://localhost/pay"
client_id = "id"
client_secret = "secret"

[merchant]
post_link = "http://localhost/callback"
"#;
        assert!(toml::from_str::<FileConfig>(toml_str).is_err());
    }
}
