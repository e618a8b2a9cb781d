use reqwest::Client;
use rsa::RsaPublicKey;
use url::Url;

use super::KeyRetrievalError;
use crate::card::parse_public_key_pem;

/// Reads the processor's current RSA public key.
#[derive(Debug, Clone)]
pub struct PublicKeyFetcher {
    http: Client,
    url: Url,
}

impl PublicKeyFetcher {
    pub fn new(http: Client, url: Url) -> Self {
        Self { http, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// `GET <public-key-endpoint>` and parse the PEM body.
    pub async fn fetch(&self) -> Result<RsaPublicKey, KeyRetrievalError> {
        let response = self.http.get(self.url.clone()).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        tracing::debug!(%status, len = body.len(), "Fetched processor public key document");
        Ok(parse_public_key_pem(&body)?)
    }
}
