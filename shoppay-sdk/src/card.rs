//! Card data and the RSA cryptogram submitted to the processor.
//!
//! The processor never receives raw card fields. Instead the four card
//! fields are serialized to a JSON object and encrypted with the
//! processor's RSA public key (PKCS#1 v1.5). The ciphertext is sent as
//! standard base64:
//!
//! ```text
//! base64(RSA-PKCS1v15({"hpan":..,"expDate":..,"cvc":..,"terminalId":..}))
//! ```
//!
//! PKCS#1 v1.5 padding is randomized, so two cryptograms built from the same
//! card are never equal.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use rsa::pkcs8::{DecodePublicKey, Document};
use rsa::rand_core::OsRng;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};
use serde::Serialize;

/// PEM label the processor publishes its key under.
pub const PUBLIC_KEY_PEM_LABEL: &str = "PUBLIC KEY";

/// Errors produced while building a cryptogram.
#[derive(Debug, thiserror::Error)]
pub enum CryptogramError {
    #[error("failed to serialize card data: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to encrypt card data: {0}")]
    Encrypt(#[from] rsa::Error),
}

/// Errors produced while parsing the processor's public key document.
#[derive(Debug, thiserror::Error)]
pub enum PublicKeyError {
    #[error("failed to decode PEM block containing public key: {0}")]
    InvalidPem(String),
    #[error("unexpected PEM block type {0:?}")]
    UnexpectedLabel(String),
    #[error("not RSA public key: {0}")]
    NotRsa(String),
}

/// Sensitive card fields, alive only for the duration of one request.
///
/// Field order is the canonical order of the encrypted JSON object.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct CardData {
    pub hpan: String,
    #[serde(rename = "expDate")]
    pub exp_date: String,
    pub cvc: String,
    #[serde(rename = "terminalId")]
    pub terminal_id: String,
}

impl CardData {
    /// Last four digits of the PAN, or the empty string for short input.
    pub fn pan_suffix(&self) -> &str {
        let len = self.hpan.len();
        if len < 4 || !self.hpan.is_char_boundary(len - 4) {
            return "";
        }
        &self.hpan[len - 4..]
    }

    /// Serialize to the canonical four-field JSON object.
    pub fn to_canonical_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

impl std::fmt::Debug for CardData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardData")
            .field("hpan", &format_args!("****{}", self.pan_suffix()))
            .field("exp_date", &"<redacted>")
            .field("cvc", &"<redacted>")
            .field("terminal_id", &self.terminal_id)
            .finish()
    }
}

/// Base64 ciphertext of [`CardData`] under the processor's public key.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cryptogram(String);

impl Cryptogram {
    /// Encrypt `card` under `key` and base64-encode the ciphertext.
    pub fn encode(card: &CardData, key: &RsaPublicKey) -> Result<Self, CryptogramError> {
        let plaintext = card.to_canonical_json()?;
        let ciphertext = key.encrypt(&mut OsRng, Pkcs1v15Encrypt, &plaintext)?;
        Ok(Self(BASE64_STANDARD.encode(ciphertext)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw ciphertext bytes.
    pub fn ciphertext(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64_STANDARD.decode(&self.0)
    }
}

impl std::fmt::Debug for Cryptogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cryptogram(<{} bytes redacted>)", self.0.len())
    }
}

/// Parse a PEM document of type `PUBLIC KEY` holding a PKIX RSA key.
pub fn parse_public_key_pem(pem: &[u8]) -> Result<RsaPublicKey, PublicKeyError> {
    let text = std::str::from_utf8(pem).map_err(|e| PublicKeyError::InvalidPem(e.to_string()))?;
    let (label, document) =
        Document::from_pem(text.trim()).map_err(|e| PublicKeyError::InvalidPem(e.to_string()))?;
    if label != PUBLIC_KEY_PEM_LABEL {
        return Err(PublicKeyError::UnexpectedLabel(label.to_string()));
    }
    RsaPublicKey::from_public_key_der(document.as_bytes())
        .map_err(|e| PublicKeyError::NotRsa(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::RsaPrivateKey;
    use rsa::pkcs1::EncodeRsaPublicKey;
    use rsa::pkcs8::{EncodePublicKey, LineEnding};

    fn sample_card() -> CardData {
        CardData {
            hpan: "4003032704547597".to_string(),
            exp_date: "1022".to_string(),
            cvc: "636".to_string(),
            terminal_id: "67e34d63-102f-4bd1-898e-370781d0074d".to_string(),
        }
    }

    fn keypair() -> (RsaPrivateKey, RsaPublicKey) {
        let private = RsaPrivateKey::new(&mut OsRng, 2048).unwrap();
        let public = RsaPublicKey::from(&private);
        (private, public)
    }

    #[test]
    fn test_canonical_json_has_four_fields_in_order() {
        let json = String::from_utf8(sample_card().to_canonical_json().unwrap()).unwrap();
        assert_eq!(
            json,
            r#"{"hpan":"4003032704547597","expDate":"1022","cvc":"636","terminalId":"67e34d63-102f-4bd1-898e-370781d0074d"}"#
        );
    }

    #[test]
    fn test_cryptogram_decrypts_to_card_json() {
        let (private, public) = keypair();
        let card = sample_card();

        let first = Cryptogram::encode(&card, &public).unwrap();
        let second = Cryptogram::encode(&card, &public).unwrap();
        assert_ne!(first, second);

        let expected = card.to_canonical_json().unwrap();
        for cryptogram in [first, second] {
            let plaintext = private
                .decrypt(Pkcs1v15Encrypt, &cryptogram.ciphertext().unwrap())
                .unwrap();
            assert_eq!(plaintext, expected);
        }
    }

    #[test]
    fn test_cryptogram_rejects_oversized_card() {
        let (_, public) = keypair();
        let mut card = sample_card();
        card.hpan = "4".repeat(300);

        let err = Cryptogram::encode(&card, &public).unwrap_err();
        assert!(matches!(err, CryptogramError::Encrypt(_)));
    }

    #[test]
    fn test_debug_output_hides_card_fields() {
        let (_, public) = keypair();
        let card = sample_card();
        let cryptogram = Cryptogram::encode(&card, &public).unwrap();

        let rendered = format!("{card:?} {cryptogram:?}");
        assert!(rendered.contains("****7597"));
        assert!(!rendered.contains("4003032704547597"));
        assert!(!rendered.contains("636"));
        assert!(!rendered.contains(cryptogram.as_str()));
    }

    #[test]
    fn test_parse_public_key_pem() {
        let (_, public) = keypair();
        let pem = public.to_public_key_pem(LineEnding::LF).unwrap();

        let parsed = parse_public_key_pem(pem.as_bytes()).unwrap();
        assert_eq!(parsed, public);
    }

    #[test]
    fn test_parse_public_key_rejects_non_pem() {
        let err = parse_public_key_pem(b"<html>service unavailable</html>").unwrap_err();
        assert!(matches!(err, PublicKeyError::InvalidPem(_)));
    }

    #[test]
    fn test_parse_public_key_rejects_other_block_type() {
        let (_, public) = keypair();
        let pem = public.to_pkcs1_pem(LineEnding::LF).unwrap();

        let err = parse_public_key_pem(pem.as_bytes()).unwrap_err();
        assert!(matches!(err, PublicKeyError::UnexpectedLabel(label) if label == "RSA PUBLIC KEY"));
    }
}
