//! PaymentPipeline processor.
//!
//! Turns one card payment request into a stored payment record:
//!
//! 1. Fetch the processor's public key and exchange client credentials for
//!    a bearer token (concurrently, neither depends on the other).
//! 2. Encrypt the card data into a cryptogram under the public key.
//! 3. Submit the cryptogram envelope with the bearer token.
//! 4. Store a record with the processor's status, or `failure` when the
//!    processor reported none.
//!
//! Every step runs once. Any failure before step 4 aborts the run and
//! nothing is stored. A store failure after the processor reported a charge
//! is surfaced as [`PaymentError::ReconciliationRequired`] and announced on
//! the reconciliation channel.

use crate::config::{MerchantConfig, ProcessorConfig};
use crate::entities::{PaymentInsert, PaymentRecord};
use crate::events::{ReconciliationRequired, ReconciliationSender};
use crate::processors::key_cache::PublicKeyCache;
use kanau::processor::Processor;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use shoppay_sdk::card::{Cryptogram, CryptogramError};
use shoppay_sdk::client::{
    KeyRetrievalError, PaymentSubmitter, PublicKeyFetcher, SubmitError, TokenError,
    TokenExchanger, TokenRequest,
};
use shoppay_sdk::objects::{
    PaymentEnvelope, PaymentRequest, ProviderResponse, STATUS_FAILURE, ValidationError,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// Progress of one pipeline run. Linear, no retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Start,
    KeyFetched,
    TokenAcquired,
    CryptogramReady,
    ProviderResponded,
    Persisted,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineStage::Start => "start",
            PipelineStage::KeyFetched => "key_fetched",
            PipelineStage::TokenAcquired => "token_acquired",
            PipelineStage::CryptogramReady => "cryptogram_ready",
            PipelineStage::ProviderResponded => "provider_responded",
            PipelineStage::Persisted => "persisted",
        };
        f.write_str(name)
    }
}

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The inbound request is malformed.
    #[error("invalid payment request: {0}")]
    Validation(#[from] ValidationError),

    #[error("failed to retrieve processor public key: {0}")]
    KeyRetrieval(#[from] KeyRetrievalError),

    /// The token endpoint refused the credentials or could not be reached.
    #[error("processor authorization failed: {0}")]
    Auth(#[source] TokenError),

    #[error("failed to build card cryptogram: {0}")]
    Crypto(#[from] CryptogramError),

    #[error("payment submission failed: {0}")]
    Submission(#[source] reqwest::Error),

    /// A processor response body could not be decoded.
    #[error("failed to decode processor response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The processor declined or reported nothing, and the record was not stored.
    #[error("failed to store payment record: {0}")]
    Persistence(#[source] sqlx::Error),

    /// The processor reported a charge but the record was not stored.
    #[error("payment {provider_id:?} for order {order_id} charged but not stored: {source}")]
    ReconciliationRequired {
        order_id: i64,
        provider_id: String,
        #[source]
        source: sqlx::Error,
    },
}

impl PaymentError {
    /// Short machine-readable name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PaymentError::Validation(_) => "validation",
            PaymentError::KeyRetrieval(_) => "key_retrieval",
            PaymentError::Auth(_) => "auth",
            PaymentError::Crypto(_) => "crypto",
            PaymentError::Submission(_) => "submission",
            PaymentError::Decode(_) => "decode",
            PaymentError::Persistence(_) => "persistence",
            PaymentError::ReconciliationRequired { .. } => "reconciliation_required",
        }
    }
}

impl From<TokenError> for PaymentError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Decode(e) => PaymentError::Decode(e),
            other => PaymentError::Auth(other),
        }
    }
}

impl From<SubmitError> for PaymentError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Http(e) => PaymentError::Submission(e),
            SubmitError::Decode { status, source } => {
                warn!(%status, "Undecodable payment response");
                PaymentError::Decode(source)
            }
        }
    }
}

/// Invoice id sent to the processor for an order: the order id, zero padded.
pub fn invoice_id(order_id: i64) -> String {
    format!("{order_id:09}")
}

/// Convert a major-unit amount to minor units, rounding half to even.
///
/// An amount that rounds to zero minor units is rejected.
pub fn minor_units(amount: Decimal) -> Result<i64, ValidationError> {
    let minor = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|minor| minor.round())
        .and_then(|minor| minor.to_i64())
        .ok_or(ValidationError::AmountOutOfRange)?;
    if minor <= 0 {
        return Err(ValidationError::NonPositiveAmount);
    }
    Ok(minor)
}

/// Status stored for a processor answer.
///
/// The processor's status is authoritative when present; an empty status
/// is stored as `failure`.
pub fn settled_status(response: &ProviderResponse) -> String {
    if response.status.is_empty() {
        STATUS_FAILURE.to_string()
    } else {
        response.status.clone()
    }
}

/// Orchestrates one card payment from request to stored record.
///
/// `S` is the payment store. Production uses
/// [`DatabaseProcessor`](crate::framework::DatabaseProcessor).
pub struct PaymentPipeline<S> {
    processor: ProcessorConfig,
    merchant: MerchantConfig,
    keys: PublicKeyFetcher,
    tokens: TokenExchanger,
    submitter: PaymentSubmitter,
    key_cache: Arc<PublicKeyCache>,
    store: S,
    reconciliation_tx: Option<ReconciliationSender>,
}

impl<S> PaymentPipeline<S>
where
    S: Processor<PaymentInsert, Output = PaymentRecord, Error = sqlx::Error>,
{
    /// Create a pipeline over a config snapshot.
    ///
    /// `http` must already carry the per-call timeout.
    pub fn new(
        http: reqwest::Client,
        processor: ProcessorConfig,
        merchant: MerchantConfig,
        key_cache: Arc<PublicKeyCache>,
        store: S,
    ) -> Self {
        Self {
            keys: PublicKeyFetcher::new(http.clone(), processor.public_key_url.clone()),
            tokens: TokenExchanger::new(http.clone(), processor.token_url.clone()),
            submitter: PaymentSubmitter::new(http, processor.payment_url.clone()),
            processor,
            merchant,
            key_cache,
            store,
            reconciliation_tx: None,
        }
    }

    /// Announce unstored charges on `tx`.
    pub fn with_reconciliation(mut self, tx: ReconciliationSender) -> Self {
        self.reconciliation_tx = Some(tx);
        self
    }

    /// Run the whole pipeline for `request`.
    pub async fn run(&self, request: PaymentRequest) -> Result<PaymentRecord, PaymentError> {
        request.validate()?;

        let span = info_span!(
            "payment",
            request_id = %uuid::Uuid::new_v4(),
            order_id = request.order_id,
            user_id = request.user_id,
        );

        async {
            let result = self.execute(&request).await;
            match &result {
                Ok(record) => info!(
                    payment_id = record.id,
                    status = %record.status,
                    "Payment processed"
                ),
                Err(e @ PaymentError::ReconciliationRequired { .. }) => {
                    error!(error = %e, kind = e.kind(), "Payment requires reconciliation")
                }
                Err(e) => warn!(error = %e, kind = e.kind(), "Payment failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, request: &PaymentRequest) -> Result<PaymentRecord, PaymentError> {
        let amount = minor_units(request.amount)?;
        let invoice_id = invoice_id(request.order_id);
        debug!(stage = %PipelineStage::Start, amount, %invoice_id);

        let token_request = TokenRequest {
            client_id: self.processor.client_id.clone(),
            client_secret: self.processor.client_secret.clone(),
            scope: self.processor.scope.clone(),
            invoice_id: invoice_id.clone(),
            amount,
            currency: self.processor.currency.clone(),
            terminal_id: request.terminal_id.clone(),
        };

        let (public_key, token) = tokio::try_join!(
            async {
                self.key_cache
                    .get(&self.keys, self.processor.public_key_ttl)
                    .await
                    .map_err(PaymentError::from)
            },
            async {
                self.tokens
                    .exchange(token_request)
                    .await
                    .map_err(PaymentError::from)
            },
        )?;
        debug!(stage = %PipelineStage::KeyFetched);
        debug!(stage = %PipelineStage::TokenAcquired);

        let cryptogram = Cryptogram::encode(&request.card_data(), &public_key)?;
        debug!(stage = %PipelineStage::CryptogramReady);

        let envelope = self.envelope(request, cryptogram, amount, invoice_id.clone());
        let response = self.submitter.submit(&token, &envelope).await?;
        debug!(
            stage = %PipelineStage::ProviderResponded,
            provider_id = %response.id,
            provider_status = %response.status,
            provider_code = response.code,
        );

        let insert = PaymentInsert {
            user_id: request.user_id,
            order_id: request.order_id,
            amount: request.amount,
            payment_date: time::OffsetDateTime::now_utc(),
            status: settled_status(&response),
        };

        match self.store.process(insert).await {
            Ok(record) => {
                debug!(stage = %PipelineStage::Persisted, payment_id = record.id);
                Ok(record)
            }
            Err(source) if response.reports_charge() => {
                self.announce_unstored_charge(request, &response, invoice_id)
                    .await;
                Err(PaymentError::ReconciliationRequired {
                    order_id: request.order_id,
                    provider_id: response.id,
                    source,
                })
            }
            Err(source) => Err(PaymentError::Persistence(source)),
        }
    }

    fn envelope(
        &self,
        request: &PaymentRequest,
        cryptogram: Cryptogram,
        amount: i64,
        invoice_id: String,
    ) -> PaymentEnvelope {
        let name = request
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.merchant.default_cardholder_name.clone());

        PaymentEnvelope {
            amount,
            currency: self.processor.currency.clone(),
            name,
            cryptogram,
            invoice_id,
            invoice_id_alt: None,
            description: self.merchant.describe_order(request.order_id),
            account_id: Some(request.user_id.to_string()),
            email: request.email.clone(),
            phone: request.phone.clone(),
            post_link: self.merchant.post_link.clone(),
            failure_post_link: self.merchant.failure_post_link.clone(),
            card_save: self.merchant.card_save,
            data: None,
        }
    }

    async fn announce_unstored_charge(
        &self,
        request: &PaymentRequest,
        response: &ProviderResponse,
        invoice_id: String,
    ) {
        let Some(tx) = &self.reconciliation_tx else {
            return;
        };
        let event = ReconciliationRequired {
            order_id: request.order_id,
            user_id: request.user_id,
            amount: request.amount,
            status: response.status.clone(),
            provider_id: response.id.clone(),
            provider_reference: response.reference.clone(),
            invoice_id,
            occurred_at: time::OffsetDateTime::now_utc(),
        };
        if let Err(e) = tx.send(event).await {
            error!(error = %e, "Failed to emit ReconciliationRequired event");
        }
    }
}
