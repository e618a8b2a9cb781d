use reqwest::Client;
use url::Url;

use super::SubmitError;
use crate::objects::epay::{AccessToken, PaymentEnvelope, ProviderResponse};

/// Submits card payments to the processor.
#[derive(Debug, Clone)]
pub struct PaymentSubmitter {
    http: Client,
    url: Url,
}

impl PaymentSubmitter {
    pub fn new(http: Client, url: Url) -> Self {
        Self { http, url }
    }

    /// `POST <payment-endpoint>` with the envelope as JSON.
    ///
    /// The transport status is not an outcome by itself: the processor
    /// reports declines inside the body, so any decodable body is returned.
    pub async fn submit(
        &self,
        token: &AccessToken,
        envelope: &PaymentEnvelope,
    ) -> Result<ProviderResponse, SubmitError> {
        let response = self
            .http
            .post(self.url.clone())
            .header(reqwest::header::AUTHORIZATION, token.bearer())
            .json(envelope)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            tracing::warn!(%status, "Processor answered payment call with non-success status");
        }

        serde_json::from_slice(&body).map_err(|source| SubmitError::Decode { status, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardData, Cryptogram};
    use mockito::Matcher;
    use rsa::rand_core::OsRng;
    use rsa::{RsaPrivateKey, RsaPublicKey};

    fn envelope() -> PaymentEnvelope {
        let private = RsaPrivateKey::new(&mut OsRng, 2048).unwrap();
        let card = CardData {
            hpan: "4003032704547597".to_string(),
            exp_date: "1022".to_string(),
            cvc: "636".to_string(),
            terminal_id: "67e34d63-102f-4bd1-898e-370781d0074d".to_string(),
        };
        PaymentEnvelope {
            amount: 10000,
            currency: "KZT".to_string(),
            name: "JON JONSON".to_string(),
            cryptogram: Cryptogram::encode(&card, &RsaPublicKey::from(&private)).unwrap(),
            invoice_id: "000000001".to_string(),
            invoice_id_alt: None,
            description: "Order #1".to_string(),
            account_id: Some("1".to_string()),
            email: None,
            phone: None,
            post_link: "https://shop.example/payments/callback".to_string(),
            failure_post_link: None,
            card_save: false,
            data: None,
        }
    }

    fn payment_url(server: &mockito::Server) -> Url {
        Url::parse(&format!("{}/api/payment/cryptopay", server.url())).unwrap()
    }

    #[tokio::test]
    async fn test_submit_sends_bearer_and_envelope() {
        let envelope = envelope();
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/payment/cryptopay")
            .match_header("authorization", "Bearer tok-123")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "amount": 10000,
                "currency": "KZT",
                "invoiceId": "000000001",
                "cryptogram": envelope.cryptogram.as_str(),
                "cardSave": false,
                "accountId": "1",
            })))
            .with_status(200)
            .with_body(r#"{"id":"tx-1","amount":10000,"currency":"KZT","status":"successful","code":0,"reference":"ref-9"}"#)
            .expect(1)
            .create_async()
            .await;

        let response = PaymentSubmitter::new(Client::new(), payment_url(&server))
            .submit(&AccessToken::new("tok-123"), &envelope)
            .await
            .unwrap();

        assert_eq!(response.status, "successful");
        assert_eq!(response.reference, "ref-9");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_returns_business_failure_despite_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/payment/cryptopay")
            .with_status(400)
            .with_body(r#"{"code":2691,"status":""}"#)
            .create_async()
            .await;

        let response = PaymentSubmitter::new(Client::new(), payment_url(&server))
            .submit(&AccessToken::new("tok"), &envelope())
            .await
            .unwrap();

        assert_eq!(response.code, 2691);
        assert!(response.status.is_empty());
    }

    #[tokio::test]
    async fn test_submit_undecodable_body_is_fatal() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/payment/cryptopay")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let err = PaymentSubmitter::new(Client::new(), payment_url(&server))
            .submit(&AccessToken::new("tok"), &envelope())
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::Decode { .. }));
    }
}
