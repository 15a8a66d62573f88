//! Payment gateway client.
//!
//! Abstraction over hosted-checkout providers in the `PhonePe` style: an
//! initiate call returns a redirect URL for the buyer, and settlement
//! arrives later through a signed server-to-server callback. The provider
//! response is parsed once at this boundary into a strict result type;
//! nothing downstream touches raw gateway JSON.

use std::fmt::{self, Write as _};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::GatewayConfig;
use crate::error::BookingError;
use crate::types::{Attendee, Money, PaymentMode, PaymentStatus, RegistrationId, TransactionId};

/// Gateway call result
pub type GatewayResult<T> = Result<T, GatewayFailure>;

const PAY_PATH: &str = "/pg/v1/pay";

// ============================================================================
// Wire vocabulary
// ============================================================================

/// Terminal direction reported by the gateway for one payment attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeFlow {
    /// Money moved
    Success,
    /// Attempt failed
    Failure,
    /// Still in flight
    Pending,
}

impl OutcomeFlow {
    /// Payment status this flow maps to
    #[must_use]
    pub const fn to_status(self) -> PaymentStatus {
        match self {
            Self::Success => PaymentStatus::Paid,
            Self::Failure => PaymentStatus::Failed,
            Self::Pending => PaymentStatus::Pending,
        }
    }

    /// Maps a provider status code ("`PAYMENT_SUCCESS`", "`PAYMENT_PENDING`",
    /// error codes) onto the flow vocabulary. Unrecognized codes count as
    /// failures.
    #[must_use]
    pub fn from_gateway_code(code: &str) -> Self {
        let upper = code.to_uppercase();
        if upper.contains("SUCCESS") {
            Self::Success
        } else if upper.contains("PENDING") {
            Self::Pending
        } else {
            Self::Failure
        }
    }
}

/// Normalized settlement outcome, decoded from a provider callback or an
/// explicit status check.
///
/// Either `transaction_id` or `gateway_reference` resolves the Payment row;
/// neither alone is required.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallbackOutcome {
    /// Our transaction reference, when the provider echoed it
    pub transaction_id: Option<TransactionId>,
    /// The provider's own transaction reference
    pub gateway_reference: Option<String>,
    /// Registration the payment belongs to, when the callback names one
    pub registration_id: Option<RegistrationId>,
    /// Settlement direction
    pub flow: OutcomeFlow,
    /// Provider status code text
    pub status_text: Option<String>,
    /// Provider message text
    pub message: Option<String>,
    /// Instrument the buyer used
    pub mode: Option<PaymentMode>,
}

// ============================================================================
// Initiation
// ============================================================================

/// Input for one payment initiation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InitiateRequest {
    /// Freshly generated merchant transaction reference
    pub transaction_id: TransactionId,
    /// Registration being paid for
    pub registration_id: RegistrationId,
    /// Amount to collect
    pub amount: Money,
    /// Buyer contact details forwarded to the provider
    pub attendee: Attendee,
}

/// A successfully initiated payment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InitiatedPayment {
    /// Merchant transaction reference
    pub transaction_id: TransactionId,
    /// Hosted checkout URL for the buyer
    pub payment_url: String,
    /// Raw provider payload, kept for the audit trail
    pub raw: serde_json::Value,
}

/// Diagnostic category of an initiate failure.
///
/// Categories only refine logging and audit rows; every category produces
/// the same caller-visible outcome (payment marked failed).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayFailureKind {
    /// Provider answered with HTTP 5xx
    ServerError,
    /// Provider answered with HTTP 4xx
    ClientError,
    /// Provider flagged the request as rejected
    BusinessRejection,
    /// Message points at a checksum or credential problem
    ChecksumIssue,
    /// Message points at a salt-key problem, or no key is configured
    KeyIssue,
    /// Message points at an amount problem
    AmountIssue,
    /// Message points at a reused transaction reference
    DuplicateTransaction,
    /// Provider accepted the request but returned no payment token
    MissingToken,
    /// The request never completed
    Transport,
}

/// A failed gateway interaction, with its diagnostic classification
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GatewayFailure {
    /// Diagnostic category
    pub kind: GatewayFailureKind,
    /// Human-readable reason, provider text when available
    pub message: String,
    /// HTTP status of the response, when one arrived
    pub http_status: Option<u16>,
    /// Raw provider payload, when one arrived
    pub raw: Option<serde_json::Value>,
}

impl GatewayFailure {
    fn local(kind: GatewayFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            http_status: None,
            raw: None,
        }
    }

    /// Whether the failure happened before anything reached the provider
    #[must_use]
    pub const fn is_local(&self) -> bool {
        self.http_status.is_none() && self.raw.is_none()
    }
}

impl fmt::Display for GatewayFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for GatewayFailure {}

impl From<GatewayFailure> for BookingError {
    fn from(failure: GatewayFailure) -> Self {
        Self::Gateway(failure.message)
    }
}

/// Classifies an initiate failure from HTTP status, the provider's success
/// flag, and message text.
///
/// Message patterns are checked first, then the HTTP class, then the
/// business flag; anything else is a transport failure.
#[must_use]
pub fn classify(
    http_status: Option<u16>,
    success_flag: Option<bool>,
    message: Option<&str>,
) -> GatewayFailureKind {
    if let Some(text) = message {
        let lowered = text.to_lowercase();
        if lowered.contains("duplicate") {
            return GatewayFailureKind::DuplicateTransaction;
        }
        if lowered.contains("hash") || lowered.contains("checksum") || lowered.contains("x-verify")
        {
            return GatewayFailureKind::ChecksumIssue;
        }
        if lowered.contains("key") || lowered.contains("salt") {
            return GatewayFailureKind::KeyIssue;
        }
        if lowered.contains("amount") {
            return GatewayFailureKind::AmountIssue;
        }
    }
    match http_status {
        Some(status) if status >= 500 => GatewayFailureKind::ServerError,
        Some(status) if status >= 400 => GatewayFailureKind::ClientError,
        _ => match success_flag {
            Some(false) => GatewayFailureKind::BusinessRejection,
            _ => GatewayFailureKind::Transport,
        },
    }
}

// ============================================================================
// Gateway trait
// ============================================================================

/// Payment gateway trait
///
/// Abstraction over hosted-checkout payment providers.
pub trait PaymentGateway: Send + Sync {
    /// Initiates a payment and returns the buyer's checkout URL
    ///
    /// # Errors
    ///
    /// Returns a classified `GatewayFailure` when initiation fails
    fn initiate(
        &self,
        request: InitiateRequest,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<InitiatedPayment>> + Send>>;

    /// Polls the provider for the current outcome of a transaction
    ///
    /// # Errors
    ///
    /// Returns a classified `GatewayFailure` when the poll fails
    fn check_status(
        &self,
        transaction_id: &TransactionId,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<CallbackOutcome>> + Send>>;
}

// ============================================================================
// HTTP implementation
// ============================================================================

/// Signs a payload in the provider's `X-VERIFY` scheme:
/// `sha256(payload + salt_key)` in hex, then `###` and the salt index.
fn sign(payload: &str, salt_key: &str, salt_index: u32) -> String {
    let digest = Sha256::digest(format!("{payload}{salt_key}").as_bytes());
    let mut checksum = String::with_capacity(70);
    for byte in digest {
        let _ = write!(checksum, "{byte:02x}");
    }
    let _ = write!(checksum, "###{salt_index}");
    checksum
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitiateResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<InitiateData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitiateData {
    #[serde(default)]
    instrument_response: Option<InstrumentResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstrumentResponse {
    #[serde(default)]
    redirect_info: Option<RedirectInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RedirectInfo {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<StatusData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusData {
    #[serde(default)]
    transaction_id: Option<String>,
    #[serde(default)]
    payment_instrument: Option<PaymentInstrument>,
}

#[derive(Debug, Default, Deserialize)]
struct PaymentInstrument {
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

/// HTTP gateway client for the live provider
#[derive(Clone, Debug)]
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl HttpPaymentGateway {
    /// Creates an HTTP gateway client from configuration
    ///
    /// # Errors
    ///
    /// Returns `Gateway` if the underlying HTTP client cannot be built
    pub fn new(config: GatewayConfig) -> Result<Self, BookingError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| BookingError::Gateway(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { client, config })
    }

    /// Creates an Arc-wrapped instance for sharing
    ///
    /// # Errors
    ///
    /// Returns `Gateway` if the underlying HTTP client cannot be built
    pub fn shared(config: GatewayConfig) -> Result<Arc<dyn PaymentGateway>, BookingError> {
        Ok(Arc::new(Self::new(config)?))
    }
}

impl PaymentGateway for HttpPaymentGateway {
    fn initiate(
        &self,
        request: InitiateRequest,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<InitiatedPayment>> + Send>> {
        let client = self.client.clone();
        let config = self.config.clone();

        Box::pin(async move {
            let Some(salt_key) = config.salt_key.clone() else {
                return Err(GatewayFailure::local(
                    GatewayFailureKind::KeyIssue,
                    "gateway salt key is not configured",
                ));
            };

            let payload = serde_json::json!({
                "merchantId": config.merchant_id,
                "merchantTransactionId": request.transaction_id.as_str(),
                "merchantUserId": request.registration_id.to_string(),
                "amount": request.amount.paise(),
                "redirectUrl": config.redirect_url,
                "redirectMode": "POST",
                "callbackUrl": config.callback_url,
                "mobileNumber": request.attendee.phone,
                "paymentInstrument": { "type": "PAY_PAGE" }
            });
            let encoded = STANDARD.encode(payload.to_string());
            let checksum = sign(&format!("{encoded}{PAY_PATH}"), &salt_key, config.salt_index);

            tracing::debug!(
                transaction_id = %request.transaction_id,
                amount = request.amount.paise(),
                "Initiating gateway payment"
            );

            let response = client
                .post(format!("{}{PAY_PATH}", config.base_url))
                .header("X-VERIFY", checksum)
                .json(&serde_json::json!({ "request": encoded }))
                .send()
                .await;

            let response = match response {
                Ok(response) => response,
                Err(err) => {
                    return Err(GatewayFailure::local(
                        GatewayFailureKind::Transport,
                        format!("gateway request failed: {err}"),
                    ));
                }
            };

            let http_status = response.status().as_u16();
            let raw: serde_json::Value = match response.json().await {
                Ok(value) => value,
                Err(err) => {
                    return Err(GatewayFailure {
                        kind: classify(Some(http_status), None, None),
                        message: format!("gateway returned an unreadable body: {err}"),
                        http_status: Some(http_status),
                        raw: None,
                    });
                }
            };

            let parsed: InitiateResponse =
                serde_json::from_value(raw.clone()).unwrap_or_default();

            if !(200..300).contains(&http_status) || !parsed.success {
                let message = parsed
                    .message
                    .clone()
                    .or_else(|| parsed.code.clone())
                    .unwrap_or_else(|| format!("gateway rejected the initiation (HTTP {http_status})"));
                return Err(GatewayFailure {
                    kind: classify(Some(http_status), Some(parsed.success), Some(&message)),
                    message,
                    http_status: Some(http_status),
                    raw: Some(raw),
                });
            }

            let payment_url = parsed
                .data
                .and_then(|data| data.instrument_response)
                .and_then(|instrument| instrument.redirect_info)
                .and_then(|redirect| redirect.url)
                .filter(|url| !url.is_empty());

            match payment_url {
                Some(payment_url) => {
                    tracing::info!(
                        transaction_id = %request.transaction_id,
                        "Gateway payment initiated"
                    );
                    Ok(InitiatedPayment {
                        transaction_id: request.transaction_id,
                        payment_url,
                        raw,
                    })
                }
                None => Err(GatewayFailure {
                    kind: GatewayFailureKind::MissingToken,
                    message: "gateway response carried no payment token".to_string(),
                    http_status: Some(http_status),
                    raw: Some(raw),
                }),
            }
        })
    }

    fn check_status(
        &self,
        transaction_id: &TransactionId,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<CallbackOutcome>> + Send>> {
        let client = self.client.clone();
        let config = self.config.clone();
        let transaction_id = transaction_id.clone();

        Box::pin(async move {
            let Some(salt_key) = config.salt_key.clone() else {
                return Err(GatewayFailure::local(
                    GatewayFailureKind::KeyIssue,
                    "gateway salt key is not configured",
                ));
            };

            let path = format!(
                "/pg/v1/status/{}/{}",
                config.merchant_id,
                transaction_id.as_str()
            );
            let checksum = sign(&path, &salt_key, config.salt_index);

            let response = client
                .get(format!("{}{path}", config.base_url))
                .header("X-VERIFY", checksum)
                .header("X-MERCHANT-ID", config.merchant_id.clone())
                .send()
                .await;

            let response = match response {
                Ok(response) => response,
                Err(err) => {
                    return Err(GatewayFailure::local(
                        GatewayFailureKind::Transport,
                        format!("gateway status check failed: {err}"),
                    ));
                }
            };

            let http_status = response.status().as_u16();
            if !(200..300).contains(&http_status) {
                return Err(GatewayFailure {
                    kind: classify(Some(http_status), None, None),
                    message: format!("gateway status check rejected (HTTP {http_status})"),
                    http_status: Some(http_status),
                    raw: None,
                });
            }

            let raw: serde_json::Value = match response.json().await {
                Ok(value) => value,
                Err(err) => {
                    return Err(GatewayFailure {
                        kind: GatewayFailureKind::Transport,
                        message: format!("gateway returned an unreadable body: {err}"),
                        http_status: Some(http_status),
                        raw: None,
                    });
                }
            };

            let parsed: StatusResponse = serde_json::from_value(raw).unwrap_or_default();
            let flow = parsed
                .code
                .as_deref()
                .map_or(OutcomeFlow::Pending, OutcomeFlow::from_gateway_code);
            let (gateway_reference, mode) = parsed.data.map_or((None, None), |data| {
                let mode = data
                    .payment_instrument
                    .and_then(|instrument| instrument.kind)
                    .map(|kind| PaymentMode::parse(&kind));
                (data.transaction_id, mode)
            });

            Ok(CallbackOutcome {
                transaction_id: Some(transaction_id),
                gateway_reference,
                registration_id: None,
                flow,
                status_text: parsed.code,
                message: parsed.message,
                mode,
            })
        })
    }
}

// ============================================================================
// Mock implementation
// ============================================================================

/// Mock payment gateway for development and testing.
///
/// Initiations succeed with a synthetic checkout URL; status checks report
/// success. `rejecting` builds a variant whose initiations always fail with
/// a business rejection, for exercising failure paths.
#[derive(Clone, Debug)]
pub struct MockPaymentGateway {
    rejection: Option<String>,
}

impl MockPaymentGateway {
    /// Creates a mock gateway that settles every initiation
    #[must_use]
    pub const fn new() -> Self {
        Self { rejection: None }
    }

    /// Creates a mock gateway that rejects every initiation
    #[must_use]
    pub fn rejecting(message: impl Into<String>) -> Self {
        Self {
            rejection: Some(message.into()),
        }
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared() -> Arc<dyn PaymentGateway> {
        Arc::new(Self::new())
    }
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentGateway for MockPaymentGateway {
    fn initiate(
        &self,
        request: InitiateRequest,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<InitiatedPayment>> + Send>> {
        let rejection = self.rejection.clone();
        Box::pin(async move {
            if let Some(message) = rejection {
                return Err(GatewayFailure {
                    kind: classify(Some(200), Some(false), Some(&message)),
                    message,
                    http_status: Some(200),
                    raw: Some(serde_json::json!({ "success": false })),
                });
            }

            tracing::info!(
                transaction_id = %request.transaction_id,
                amount = request.amount.paise(),
                "Mock payment initiated"
            );

            Ok(InitiatedPayment {
                payment_url: format!("https://mock.pay/checkout/{}", request.transaction_id),
                raw: serde_json::json!({ "success": true, "code": "PAYMENT_INITIATED" }),
                transaction_id: request.transaction_id,
            })
        })
    }

    fn check_status(
        &self,
        transaction_id: &TransactionId,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<CallbackOutcome>> + Send>> {
        let transaction_id = transaction_id.clone();
        Box::pin(async move {
            Ok(CallbackOutcome {
                gateway_reference: Some(format!("mock_ref_{}", transaction_id.as_str())),
                transaction_id: Some(transaction_id),
                registration_id: None,
                flow: OutcomeFlow::Success,
                status_text: Some("PAYMENT_SUCCESS".to_string()),
                message: None,
                mode: Some(PaymentMode::Upi),
            })
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn classification_precedence() {
        assert_eq!(
            classify(Some(400), Some(false), Some("Duplicate transactionId")),
            GatewayFailureKind::DuplicateTransaction
        );
        assert_eq!(
            classify(Some(401), None, Some("X-VERIFY hash mismatch")),
            GatewayFailureKind::ChecksumIssue
        );
        assert_eq!(
            classify(Some(400), None, Some("Invalid salt key index")),
            GatewayFailureKind::KeyIssue
        );
        assert_eq!(
            classify(Some(200), Some(false), Some("Amount below minimum")),
            GatewayFailureKind::AmountIssue
        );
        assert_eq!(classify(Some(503), None, None), GatewayFailureKind::ServerError);
        assert_eq!(classify(Some(404), None, None), GatewayFailureKind::ClientError);
        assert_eq!(
            classify(Some(200), Some(false), Some("declined by risk engine")),
            GatewayFailureKind::BusinessRejection
        );
        assert_eq!(classify(None, None, None), GatewayFailureKind::Transport);
    }

    #[test]
    fn flow_maps_to_payment_status() {
        assert_eq!(OutcomeFlow::Success.to_status(), PaymentStatus::Paid);
        assert_eq!(OutcomeFlow::Failure.to_status(), PaymentStatus::Failed);
        assert_eq!(OutcomeFlow::Pending.to_status(), PaymentStatus::Pending);
    }

    #[test]
    fn gateway_codes_map_to_flows() {
        assert_eq!(
            OutcomeFlow::from_gateway_code("PAYMENT_SUCCESS"),
            OutcomeFlow::Success
        );
        assert_eq!(
            OutcomeFlow::from_gateway_code("PAYMENT_PENDING"),
            OutcomeFlow::Pending
        );
        assert_eq!(
            OutcomeFlow::from_gateway_code("PAYMENT_ERROR"),
            OutcomeFlow::Failure
        );
        assert_eq!(
            OutcomeFlow::from_gateway_code("TIMED_OUT"),
            OutcomeFlow::Failure
        );
    }

    #[test]
    fn signature_is_hex_with_salt_index_suffix() {
        let checksum = sign("payload/pg/v1/pay", "salt", 2);
        let (digest, index) = checksum.split_once("###").unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(index, "2");

        // Deterministic, and sensitive to the salt
        assert_eq!(checksum, sign("payload/pg/v1/pay", "salt", 2));
        assert_ne!(checksum, sign("payload/pg/v1/pay", "other-salt", 2));
    }

    #[tokio::test]
    async fn mock_initiate_succeeds_with_checkout_url() {
        let gateway = MockPaymentGateway::new();
        let transaction_id = TransactionId::generate();

        let initiated = gateway
            .initiate(InitiateRequest {
                transaction_id: transaction_id.clone(),
                registration_id: RegistrationId::new(),
                amount: Money::from_rupees(1000),
                attendee: Attendee {
                    first_name: "Asha".to_string(),
                    email: "asha@example.com".to_string(),
                    phone: "9876543210".to_string(),
                },
            })
            .await
            .unwrap();

        assert_eq!(initiated.transaction_id, transaction_id);
        assert!(initiated.payment_url.contains(transaction_id.as_str()));
    }

    #[tokio::test]
    async fn mock_rejection_surfaces_business_failure() {
        let gateway = MockPaymentGateway::rejecting("declined by risk engine");

        let error = gateway
            .initiate(InitiateRequest {
                transaction_id: TransactionId::generate(),
                registration_id: RegistrationId::new(),
                amount: Money::from_rupees(1000),
                attendee: Attendee {
                    first_name: "Asha".to_string(),
                    email: "asha@example.com".to_string(),
                    phone: "9876543210".to_string(),
                },
            })
            .await
            .unwrap_err();

        assert_eq!(error.kind, GatewayFailureKind::BusinessRejection);
        assert!(!error.is_local());
    }

    #[tokio::test]
    async fn missing_salt_key_fails_before_any_call() {
        let config = GatewayConfig {
            mode: crate::config::GatewayMode::Live,
            base_url: "https://gateway.invalid".to_string(),
            merchant_id: "M1".to_string(),
            salt_key: None,
            salt_index: 1,
            callback_url: "https://example.com/callback".to_string(),
            redirect_url: "https://example.com/done".to_string(),
            timeout_secs: 1,
        };
        let gateway = HttpPaymentGateway::new(config).unwrap();

        let error = gateway
            .initiate(InitiateRequest {
                transaction_id: TransactionId::generate(),
                registration_id: RegistrationId::new(),
                amount: Money::from_rupees(100),
                attendee: Attendee {
                    first_name: "Asha".to_string(),
                    email: "asha@example.com".to_string(),
                    phone: "9876543210".to_string(),
                },
            })
            .await
            .unwrap_err();

        assert_eq!(error.kind, GatewayFailureKind::KeyIssue);
        assert!(error.is_local());
    }

    #[test]
    fn status_response_parses_strictly_once() {
        let raw = serde_json::json!({
            "success": true,
            "code": "PAYMENT_SUCCESS",
            "message": "Your payment is successful.",
            "data": {
                "transactionId": "T2406261",
                "paymentInstrument": { "type": "UPI" }
            }
        });

        let parsed: StatusResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.code.as_deref(), Some("PAYMENT_SUCCESS"));
        let data = parsed.data.unwrap();
        assert_eq!(data.transaction_id.as_deref(), Some("T2406261"));
        assert_eq!(
            data.payment_instrument.unwrap().kind.as_deref(),
            Some("UPI")
        );
    }
}
