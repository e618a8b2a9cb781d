use reqwest::Client;
use reqwest::multipart::Form;
use url::Url;

use super::TokenError;
use crate::objects::epay::{AccessToken, TokenResponse};

/// Client-credentials grant for one invoice.
///
/// The processor binds the issued token to the invoice, amount, currency
/// and terminal sent here.
#[derive(Clone)]
pub struct TokenRequest {
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub invoice_id: String,
    /// Amount in minor currency units.
    pub amount: i64,
    pub currency: String,
    pub terminal_id: String,
}

impl TokenRequest {
    fn into_form(self) -> Form {
        Form::new()
            .text("grant_type", "client_credentials")
            .text("scope", self.scope)
            .text("client_id", self.client_id)
            .text("client_secret", self.client_secret)
            .text("invoiceId", self.invoice_id)
            .text("amount", self.amount.to_string())
            .text("currency", self.currency)
            .text("terminalId", self.terminal_id)
    }
}

impl std::fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRequest")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .field("invoice_id", &self.invoice_id)
            .field("amount", &self.amount)
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

/// Exchanges client credentials for a bearer token at the processor's
/// OAuth2 endpoint.
#[derive(Debug, Clone)]
pub struct TokenExchanger {
    http: Client,
    url: Url,
}

impl TokenExchanger {
    pub fn new(http: Client, url: Url) -> Self {
        Self { http, url }
    }

    /// `POST <token-endpoint>` with a multipart form body.
    ///
    /// Any non-2xx status is an authorization failure.
    pub async fn exchange(&self, request: TokenRequest) -> Result<AccessToken, TokenError> {
        let response = self
            .http
            .post(self.url.clone())
            .multipart(request.into_form())
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(TokenError::Rejected {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let envelope: TokenResponse = serde_json::from_slice(&body).map_err(TokenError::Decode)?;
        tracing::debug!(
            scope = %envelope.scope,
            expires_in = ?envelope.expires_in,
            "Obtained processor access token"
        );
        Ok(envelope.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn grant() -> TokenRequest {
        TokenRequest {
            client_id: "test".to_string(),
            client_secret: "secret".to_string(),
            scope: "payment".to_string(),
            invoice_id: "000000001".to_string(),
            amount: 10000,
            currency: "KZT".to_string(),
            terminal_id: "67e34d63-102f-4bd1-898e-370781d0074d".to_string(),
        }
    }

    fn token_url(server: &mockito::Server) -> Url {
        Url::parse(&format!("{}/epay2/oauth2/token", server.url())).unwrap()
    }

    #[tokio::test]
    async fn test_exchange_sends_grant_and_returns_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/epay2/oauth2/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="grant_type"\s+client_credentials"#.to_string()),
                Matcher::Regex(r#"name="invoiceId"\s+000000001"#.to_string()),
                Matcher::Regex(r#"name="amount"\s+10000"#.to_string()),
                Matcher::Regex(r#"name="terminalId"\s+67e34d63"#.to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"access_token":"tok-123","expires_in":"7200","scope":"payment","token_type":"Bearer"}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let token = TokenExchanger::new(Client::new(), token_url(&server))
            .exchange(grant())
            .await
            .unwrap();

        assert_eq!(token.secret(), "tok-123");
        assert_eq!(token.expires_in, Some(7200));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_exchange_unauthorized_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/epay2/oauth2/token")
            .with_status(401)
            .with_body(r#"{"error":"invalid_client"}"#)
            .create_async()
            .await;

        let err = TokenExchanger::new(Client::new(), token_url(&server))
            .exchange(grant())
            .await
            .unwrap_err();

        assert!(
            matches!(err, TokenError::Rejected { status, .. } if status == reqwest::StatusCode::UNAUTHORIZED)
        );
    }

    #[tokio::test]
    async fn test_exchange_malformed_envelope_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/epay2/oauth2/token")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = TokenExchanger::new(Client::new(), token_url(&server))
            .exchange(grant())
            .await
            .unwrap_err();

        assert!(matches!(err, TokenError::Decode(_)));
    }
}
