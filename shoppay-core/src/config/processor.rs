//! Card processor endpoints and OAuth2 client credentials.

use std::time::Duration;
use url::Url;

#[derive(Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// OAuth2 token endpoint.
    pub token_url: Url,
    /// Endpoint serving the processor's PEM public key.
    pub public_key_url: Url,
    /// Card payment endpoint.
    pub payment_url: Url,
    pub client_id: String,
    pub client_secret: String,
    /// Space separated OAuth2 scopes.
    pub scope: String,
    /// ISO 4217 currency code sent with every payment.
    pub currency: String,
    /// Bound applied to every outbound call.
    pub request_timeout: Duration,
    /// How long a fetched public key may be reused. Zero disables caching.
    pub public_key_ttl: Duration,
}

impl std::fmt::Debug for ProcessorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorConfig")
            .field("token_url", &self.token_url.as_str())
            .field("public_key_url", &self.public_key_url.as_str())
            .field("payment_url", &self.payment_url.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .field("currency", &self.currency)
            .field("request_timeout", &self.request_timeout)
            .field("public_key_ttl", &self.public_key_ttl)
            .finish()
    }
}
