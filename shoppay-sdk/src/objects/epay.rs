//! Wire envelopes of the card processor's REST API.

use serde::{Deserialize, Deserializer, Serialize};

use crate::card::Cryptogram;

/// OAuth2 token envelope returned by the token endpoint.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds. The processor sends it either as a string or a number.
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub expires_in: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub scope: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub token_type: String,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("token_type", &self.token_type)
            .finish()
    }
}

fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(u64),
        Text(String),
    }

    match Option::<Seconds>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Seconds::Number(n)) => Ok(Some(n)),
        Some(Seconds::Text(s)) if s.is_empty() => Ok(None),
        Some(Seconds::Text(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Read an explicit `null` as the type's default, like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Bearer credential authorizing a single payment call.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    token: String,
    pub scope: String,
    pub expires_in: Option<u64>,
    pub token_type: String,
}

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            scope: String::new(),
            expires_in: None,
            token_type: String::new(),
        }
    }

    /// The raw bearer token. Never log the returned value.
    pub fn secret(&self) -> &str {
        &self.token
    }

    /// `Authorization` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl From<TokenResponse> for AccessToken {
    fn from(value: TokenResponse) -> Self {
        Self {
            token: value.access_token,
            scope: value.scope,
            expires_in: value.expires_in,
            token_type: value.token_type,
        }
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("scope", &self.scope)
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

/// JSON body of the card payment call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEnvelope {
    /// Amount in minor currency units.
    pub amount: i64,
    pub currency: String,
    pub name: String,
    pub cryptogram: Cryptogram,
    pub invoice_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id_alt: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub post_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_post_link: Option<String>,
    pub card_save: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// The processor's answer to a payment call.
///
/// Business-level failures arrive with HTTP 200 and are encoded in
/// `status`/`code`, so every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProviderResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub amount: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub currency: String,
    #[serde(rename = "invoiceID", deserialize_with = "null_as_default")]
    pub invoice_id: String,
    #[serde(rename = "accountID", deserialize_with = "null_as_default")]
    pub account_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub reference: String,
    #[serde(rename = "intReference", deserialize_with = "null_as_default")]
    pub int_reference: String,
    #[serde(rename = "secure3D")]
    pub secure_3d: Option<serde_json::Value>,
    #[serde(rename = "cardID", deserialize_with = "null_as_default")]
    pub card_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub fee: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub code: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
}

impl ProviderResponse {
    /// Whether the processor reported a charge that may have moved money.
    pub fn reports_charge(&self) -> bool {
        let status = self.status.trim();
        !status.is_empty()
            && !status.eq_ignore_ascii_case(super::STATUS_FAILURE)
            && !status.eq_ignore_ascii_case(super::STATUS_UNSUCCESSFUL)
    }
}
