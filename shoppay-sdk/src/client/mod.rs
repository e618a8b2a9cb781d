//! HTTP clients for the card processor.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the shared types do not pull in `reqwest`.
//!
//! Three calls make up one card payment:
//!
//! - [`PublicKeyFetcher`]: `GET` the processor's PEM public key.
//! - [`TokenExchanger`]: OAuth2 client-credentials grant (multipart form).
//! - [`PaymentSubmitter`]: `POST` the cryptogram envelope with the bearer token.
//!
//! None of them retry. The caller decides what a failure means.

mod payment;
mod public_key;
mod token;

pub use payment::PaymentSubmitter;
pub use public_key::PublicKeyFetcher;
pub use token::{TokenExchanger, TokenRequest};

use reqwest::StatusCode;
use std::time::Duration;

use crate::card::PublicKeyError;

/// Errors produced while fetching the processor's public key.
#[derive(Debug, thiserror::Error)]
pub enum KeyRetrievalError {
    #[error("public key request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Parse(#[from] PublicKeyError),
}

/// Errors produced by the OAuth2 token exchange.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token request rejected: status {status}, body: {body}")]
    Rejected { status: StatusCode, body: String },
    #[error("failed to decode token response: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Errors produced by the payment call.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("payment request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to decode payment response (status {status}): {source}")]
    Decode {
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },
}

/// Build the shared HTTP client used for every processor call.
///
/// Every outbound request is bounded by `timeout`.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("shoppay/", env!("CARGO_PKG_VERSION")))
        .build()
}
