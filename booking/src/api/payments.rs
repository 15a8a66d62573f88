//! Payment API endpoints.
//!
//! - POST /api/payments/initiate - Open a payment and get the checkout URL
//! - POST /api/payments/callback - Provider-originated settlement callback
//! - POST /api/payments/verify - Poll the provider and reconcile
//!
//! Initiate responses use an `ok` envelope so gateway rejections can carry
//! the provider's own payload next to our transaction reference. The
//! callback route always acknowledges with 200; anything else would make
//! the provider retry forever.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::gateway::{CallbackOutcome, OutcomeFlow};
use crate::server::state::AppState;
use crate::services::InitiateError;
use crate::types::{Money, Payment, PaymentMode, PaymentStatus, RegistrationId, TransactionId};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to initiate a payment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePaymentRequest {
    /// Registration to collect payment for
    pub registration_id: Uuid,
}

/// Initiate result envelope, success or gateway rejection.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePaymentResponse {
    /// Whether a checkout URL was obtained
    pub ok: bool,
    /// Merchant transaction reference for the attempt
    pub transaction_id: Option<String>,
    /// Hosted checkout URL, on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    /// Failure description, on rejection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Raw provider payload, when one arrived
    pub gateway: Option<serde_json::Value>,
}

/// Provider callback body, decoded leniently.
///
/// Every field is optional: a payload this handler cannot fully read is
/// still audited and acknowledged. A malformed registration id decodes to
/// no registration reference rather than an error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCallbackRequest {
    /// Our transaction reference, as echoed by the provider
    #[serde(default)]
    pub merchant_transaction_id: Option<String>,
    /// The provider's own transaction reference
    #[serde(default)]
    pub provider_reference_id: Option<String>,
    /// Registration the payment belongs to
    #[serde(default)]
    pub registration_id: Option<String>,
    /// Provider status code ("`PAYMENT_SUCCESS`", "`PAYMENT_PENDING`", ...)
    #[serde(default)]
    pub code: Option<String>,
    /// Provider message text
    #[serde(default)]
    pub message: Option<String>,
    /// Instrument code ("upi", "net_banking", ...)
    #[serde(default)]
    pub payment_mode: Option<String>,
}

impl PaymentCallbackRequest {
    /// Normalizes the wire body into a settlement outcome.
    #[must_use]
    pub fn into_outcome(self) -> CallbackOutcome {
        CallbackOutcome {
            transaction_id: self.merchant_transaction_id.map(TransactionId::new),
            gateway_reference: self.provider_reference_id,
            registration_id: self.registration_id.as_deref().and_then(|raw| {
                match Uuid::parse_str(raw) {
                    Ok(id) => Some(RegistrationId::from_uuid(id)),
                    Err(_) => {
                        tracing::warn!(
                            reference = raw,
                            "Callback registration reference is not a UUID"
                        );
                        None
                    }
                }
            }),
            flow: self
                .code
                .as_deref()
                .map_or(OutcomeFlow::Pending, OutcomeFlow::from_gateway_code),
            status_text: self.code,
            message: self.message,
            mode: self.payment_mode.as_deref().map(PaymentMode::parse),
        }
    }
}

/// Callback acknowledgement.
#[derive(Debug, Serialize)]
pub struct CallbackAck {
    /// Always "ok"
    pub status: &'static str,
}

/// Request to verify a transaction against the provider.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    /// Merchant transaction reference to poll
    pub transaction_id: String,
}

/// Payment details response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    /// Merchant transaction reference
    pub transaction_id: String,
    /// Registration being paid for
    pub registration_id: Uuid,
    /// Amount in paise
    pub amount: Money,
    /// Settlement progress
    pub status: PaymentStatus,
    /// Instrument used, once reported
    pub mode: Option<PaymentMode>,
    /// The provider's own reference, once reported
    pub gateway_reference: Option<String>,
    /// Last gateway message
    pub gateway_message: Option<String>,
    /// Terminal settlement timestamp
    pub completed_at: Option<DateTime<Utc>>,
    /// Row creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<Payment> for PaymentView {
    fn from(payment: Payment) -> Self {
        Self {
            transaction_id: payment.transaction_id.to_string(),
            registration_id: payment.registration_id.as_uuid(),
            amount: payment.amount,
            status: payment.status,
            mode: payment.mode,
            gateway_reference: payment.gateway_reference,
            gateway_message: payment.gateway_message,
            completed_at: payment.completed_at,
            created_at: payment.created_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Initiate a payment for a registration.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/payments/initiate \
///   -H "Content-Type: application/json" \
///   -d '{ "registrationId": "660e8400-e29b-41d4-a716-446655440001" }'
/// ```
///
/// Success response:
/// ```json
/// { "ok": true, "transactionId": "txn_...", "paymentUrl": "https://...", "gateway": { } }
/// ```
///
/// A gateway rejection answers with the same envelope, `ok: false`, and
/// HTTP 502 (or 500 when the failure happened before any provider call);
/// a failed payment row exists under `transactionId` either way.
///
/// # Errors
///
/// Returns 404 for an unknown registration and 409 when it is not open
/// for payment.
pub async fn initiate_payment(
    State(state): State<AppState>,
    Json(request): Json<InitiatePaymentRequest>,
) -> Result<(StatusCode, Json<InitiatePaymentResponse>), ApiError> {
    let registration_id = RegistrationId::from_uuid(request.registration_id);

    match state.payments.initiate(registration_id).await {
        Ok(initiated) => Ok((
            StatusCode::OK,
            Json(InitiatePaymentResponse {
                ok: true,
                transaction_id: Some(initiated.transaction_id.to_string()),
                payment_url: Some(initiated.payment_url),
                error: None,
                gateway: Some(initiated.raw),
            }),
        )),
        Err(InitiateError::Gateway {
            transaction_id,
            failure,
        }) => {
            let status = if failure.is_local() {
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                StatusCode::BAD_GATEWAY
            };
            Ok((
                status,
                Json(InitiatePaymentResponse {
                    ok: false,
                    transaction_id: Some(transaction_id.to_string()),
                    payment_url: None,
                    error: Some(failure.to_string()),
                    gateway: failure.raw,
                }),
            ))
        }
        Err(InitiateError::Booking(error)) => Err(error.into()),
    }
}

/// Receive a provider settlement callback.
///
/// The raw body is audited verbatim and the outcome reconciled against
/// local rows. Always answers 200: reconcile problems are logged, never
/// surfaced, so the provider does not retry a callback we already have
/// on record.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/payments/callback \
///   -H "Content-Type: application/json" \
///   -d '{
///     "merchantTransactionId": "txn_8c2a...",
///     "providerReferenceId": "T2406261",
///     "registrationId": "660e8400-e29b-41d4-a716-446655440001",
///     "code": "PAYMENT_SUCCESS",
///     "paymentMode": "upi"
///   }'
/// ```
pub async fn payment_callback(
    State(state): State<AppState>,
    Json(raw): Json<serde_json::Value>,
) -> (StatusCode, Json<CallbackAck>) {
    let decoded: PaymentCallbackRequest =
        serde_json::from_value(raw.clone()).unwrap_or_default();
    let outcome = decoded.into_outcome();

    if let Err(error) = state.payments.apply_callback(outcome, raw).await {
        tracing::error!(error = %error, "Callback reconciliation failed");
    }

    (StatusCode::OK, Json(CallbackAck { status: "ok" }))
}

/// Verify a transaction with the provider.
///
/// Polls the gateway for the transaction's current outcome, reconciles it
/// exactly like a callback, and returns the settled payment row.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/payments/verify \
///   -H "Content-Type: application/json" \
///   -d '{ "transactionId": "txn_8c2a..." }'
/// ```
///
/// # Errors
///
/// Returns 502 when the provider poll fails and 404 when the transaction
/// is unknown locally.
pub async fn verify_payment(
    State(state): State<AppState>,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<Json<PaymentView>, ApiError> {
    let payment = state
        .payments
        .check_status(TransactionId::new(request.transaction_id))
        .await?;
    Ok(Json(PaymentView::from(payment)))
}
