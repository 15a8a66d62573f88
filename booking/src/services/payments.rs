//! Payment service - gateway orchestration and settlement reconciliation.
//!
//! Owns the write ordering the settlement aggregate cannot enforce on its
//! own: the pending payment row is durable before the gateway hears about
//! the attempt, every gateway interaction lands in the audit log verbatim,
//! and reconciliation persists the payment row before the registration
//! that references it.

use std::sync::Arc;
use std::time::Instant;

use boxoffice_core::environment::Clock;
use boxoffice_core::reducer::Reducer;
use thiserror::Error;

use crate::aggregates::settlement::{SettlementAction, SettlementEnvironment, SettlementReducer};
use crate::dispatch::EffectDispatcher;
use crate::error::{BookingError, Result};
use crate::gateway::{CallbackOutcome, GatewayFailure, InitiateRequest, InitiatedPayment, PaymentGateway};
use crate::providers::{PaymentLogStore, PaymentStore, RegistrationStore};
use crate::types::{
    AuditAction, Payment, PaymentLogEntry, PaymentStatus, RegistrationId, SettlementState,
    TransactionId,
};

/// Failure surface of payment initiation.
///
/// Gateway failures are split out from local ones so the API layer can
/// distinguish "the provider said no" (and hand back the provider's own
/// payload) from "we never got that far".
#[derive(Debug, Error)]
pub enum InitiateError {
    /// Local validation, lookup, or persistence failure
    #[error(transparent)]
    Booking(#[from] BookingError),

    /// The gateway rejected the initiate call or never received it.
    /// A failed payment row exists under `transaction_id` either way.
    #[error("{failure}")]
    Gateway {
        /// The attempt that failed
        transaction_id: TransactionId,
        /// Classified failure
        failure: GatewayFailure,
    },
}

/// Payment settlement service
pub struct PaymentService {
    gateway: Arc<dyn PaymentGateway>,
    payments: Arc<dyn PaymentStore>,
    registrations: Arc<dyn RegistrationStore>,
    audit: Arc<dyn PaymentLogStore>,
    dispatcher: Arc<EffectDispatcher>,
    reducer: SettlementReducer,
    env: SettlementEnvironment,
}

impl PaymentService {
    /// Creates a new payment service
    #[must_use]
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        payments: Arc<dyn PaymentStore>,
        registrations: Arc<dyn RegistrationStore>,
        audit: Arc<dyn PaymentLogStore>,
        dispatcher: Arc<EffectDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            gateway,
            payments,
            registrations,
            audit,
            dispatcher,
            reducer: SettlementReducer::new(),
            env: SettlementEnvironment::new(clock),
        }
    }

    /// Opens a payment attempt and initiates it with the gateway.
    ///
    /// 1. Load the registration and open a pending payment row
    /// 2. Persist the row, then audit the outbound request
    /// 3. Call the gateway
    /// 4. On failure, audit the response, mark the row failed, and surface
    ///    the classified failure with its transaction id
    ///
    /// # Errors
    ///
    /// Returns `Booking` for unknown or unpayable registrations and storage
    /// failures, `Gateway` when initiation itself fails.
    pub async fn initiate(
        &self,
        registration_id: RegistrationId,
    ) -> std::result::Result<InitiatedPayment, InitiateError> {
        let registration = self
            .registrations
            .find(registration_id)
            .await?
            .ok_or_else(|| {
                BookingError::not_found("registration", registration_id.as_uuid().to_string())
            })?;

        let transaction_id = TransactionId::generate();
        let amount = registration.final_amount;
        let attendee = registration.attendee.clone();

        let mut state = SettlementState::new();
        state.registrations.insert(registration.id, registration);

        let _effects = self.reducer.reduce(
            &mut state,
            SettlementAction::OpenPayment {
                transaction_id: transaction_id.clone(),
                registration_id,
                amount,
            },
            &self.env,
        );
        if let Some(error) = state.last_error.take() {
            return Err(error.into());
        }

        // The pending row must be durable before the gateway can call back
        let payment = state.payment(&transaction_id).cloned().ok_or_else(|| {
            BookingError::Persistence("payment missing after open".to_string())
        })?;
        self.payments.save(payment).await?;
        crate::metrics::record_payment_opened();

        let request = InitiateRequest {
            transaction_id: transaction_id.clone(),
            registration_id,
            amount,
            attendee,
        };
        let payload = serde_json::to_value(&request)
            .map_err(|error| BookingError::Persistence(error.to_string()))?;
        self.audit
            .append(PaymentLogEntry::new(
                Some(transaction_id.clone()),
                AuditAction::InitiateRequest,
                None,
                None,
                payload,
                self.env.clock.now(),
            ))
            .await?;

        let started = Instant::now();
        match self.gateway.initiate(request).await {
            Ok(initiated) => {
                crate::metrics::record_gateway_request(
                    "initiate",
                    "ok",
                    started.elapsed().as_secs_f64(),
                );
                self.audit
                    .append(PaymentLogEntry::new(
                        Some(transaction_id.clone()),
                        AuditAction::InitiateResponse,
                        None,
                        None,
                        initiated.raw.clone(),
                        self.env.clock.now(),
                    ))
                    .await?;
                tracing::info!(
                    transaction_id = %transaction_id,
                    registration_id = %registration_id.as_uuid(),
                    amount = %amount,
                    "Payment initiated"
                );
                Ok(initiated)
            }
            Err(failure) => {
                crate::metrics::record_gateway_request(
                    "initiate",
                    "error",
                    started.elapsed().as_secs_f64(),
                );
                let payload = failure.raw.clone().unwrap_or_else(|| {
                    serde_json::json!({ "message": failure.to_string() })
                });
                self.audit
                    .append(PaymentLogEntry::new(
                        Some(transaction_id.clone()),
                        AuditAction::InitiateResponse,
                        failure.http_status,
                        None,
                        payload,
                        self.env.clock.now(),
                    ))
                    .await?;
                self.mark_initiate_failed(&transaction_id, &failure).await?;
                tracing::warn!(
                    transaction_id = %transaction_id,
                    error = %failure,
                    "Payment initiation failed"
                );
                Err(InitiateError::Gateway {
                    transaction_id,
                    failure,
                })
            }
        }
    }

    async fn mark_initiate_failed(
        &self,
        transaction_id: &TransactionId,
        failure: &GatewayFailure,
    ) -> Result<()> {
        let mut state = SettlementState::new();
        if let Some(payment) = self.payments.find(transaction_id).await? {
            state.payments.insert(payment.transaction_id.clone(), payment);
        }

        let _effects = self.reducer.reduce(
            &mut state,
            SettlementAction::MarkInitiateFailed {
                transaction_id: transaction_id.clone(),
                reason: failure.to_string(),
            },
            &self.env,
        );
        if let Some(error) = state.last_error.take() {
            return Err(error);
        }

        let failed = state.payment(transaction_id).cloned().ok_or_else(|| {
            BookingError::Persistence("payment missing after initiate failure".to_string())
        })?;
        self.payments.save(failed).await?;
        crate::metrics::record_payment_failed();
        Ok(())
    }

    /// Applies one provider callback.
    ///
    /// The verbatim payload is audited before any interpretation, so even a
    /// callback that resolves nothing leaves a trace.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` for storage failures. An unresolvable
    /// transaction is not an error.
    pub async fn apply_callback(
        &self,
        outcome: CallbackOutcome,
        raw: serde_json::Value,
    ) -> Result<()> {
        self.audit
            .append(PaymentLogEntry::new(
                outcome.transaction_id.clone(),
                AuditAction::Callback,
                None,
                outcome.status_text.clone(),
                raw,
                self.env.clock.now(),
            ))
            .await?;

        self.reconcile(outcome).await?;
        Ok(())
    }

    /// Polls the gateway for a transaction and reconciles the answer.
    ///
    /// # Errors
    ///
    /// Returns `Gateway` when the poll fails, `NotFound` when the
    /// transaction is unknown locally, and `Persistence` for storage
    /// failures.
    pub async fn check_status(&self, transaction_id: TransactionId) -> Result<Payment> {
        let started = Instant::now();
        let mut outcome = match self.gateway.check_status(&transaction_id).await {
            Ok(outcome) => {
                crate::metrics::record_gateway_request(
                    "status",
                    "ok",
                    started.elapsed().as_secs_f64(),
                );
                outcome
            }
            Err(failure) => {
                crate::metrics::record_gateway_request(
                    "status",
                    "error",
                    started.elapsed().as_secs_f64(),
                );
                return Err(failure.into());
            }
        };
        // Status polls are keyed by our reference; some providers leave it
        // out of the response body
        if outcome.transaction_id.is_none() {
            outcome.transaction_id = Some(transaction_id.clone());
        }

        let payload = serde_json::to_value(&outcome)
            .map_err(|error| BookingError::Persistence(error.to_string()))?;
        self.audit
            .append(PaymentLogEntry::new(
                Some(transaction_id.clone()),
                AuditAction::StatusCheck,
                None,
                outcome.status_text.clone(),
                payload,
                self.env.clock.now(),
            ))
            .await?;

        let settled = self.reconcile(outcome).await?;
        settled
            .ok_or_else(|| BookingError::not_found("payment", transaction_id.to_string()))
    }

    /// Applies one gateway-reported outcome to local rows.
    ///
    /// Either identifier route resolves the payment. Unknown transactions
    /// are logged and skipped so stale or duplicate callbacks never throw.
    /// The registration half applies independently when the callback names
    /// a registration.
    async fn reconcile(&self, outcome: CallbackOutcome) -> Result<Option<Payment>> {
        let callback_registration_id = outcome.registration_id;

        let found = match &outcome.transaction_id {
            Some(transaction_id) => self.payments.find(transaction_id).await?,
            None => None,
        };
        let found = match (found, &outcome.gateway_reference) {
            (None, Some(reference)) => self.payments.find_by_gateway_reference(reference).await?,
            (found, _) => found,
        };

        let mut state = SettlementState::new();
        let mut resolved_transaction = None;
        let mut prior_status = None;
        let mut payment_registration = None;
        if let Some(payment) = found {
            resolved_transaction = Some(payment.transaction_id.clone());
            prior_status = Some(payment.status);
            payment_registration = Some(payment.registration_id);
            if let Some(registration) = self.registrations.find(payment.registration_id).await? {
                state.registrations.insert(registration.id, registration);
            }
            state.payments.insert(payment.transaction_id.clone(), payment);
        } else {
            crate::metrics::record_unknown_callback();
            tracing::warn!(
                transaction_id = ?outcome.transaction_id,
                gateway_reference = ?outcome.gateway_reference,
                "Callback references an unknown transaction, skipping payment update"
            );
        }

        if let Some(registration_id) = callback_registration_id {
            if state.registration(&registration_id).is_none() {
                if let Some(registration) = self.registrations.find(registration_id).await? {
                    state.registrations.insert(registration.id, registration);
                }
            }
        }

        let effects = self.reducer.reduce(
            &mut state,
            SettlementAction::ApplyOutcome { outcome },
            &self.env,
        );
        if let Some(error) = state.last_error.take() {
            return Err(error);
        }

        // Payment row first, then the registration that references it
        let mut settled = None;
        if let Some(transaction_id) = &resolved_transaction {
            if let Some(payment) = state.payment(transaction_id).cloned() {
                if prior_status != Some(payment.status) {
                    match payment.status {
                        PaymentStatus::Paid => {
                            crate::metrics::record_payment_paid(payment.amount.paise());
                        }
                        PaymentStatus::Failed => crate::metrics::record_payment_failed(),
                        PaymentStatus::Pending => {}
                    }
                }
                self.payments.save(payment.clone()).await?;
                tracing::info!(
                    transaction_id = %payment.transaction_id,
                    status = payment.status.as_str(),
                    "Payment reconciled"
                );
                settled = Some(payment);
            }
        }

        if let Some(registration_id) = callback_registration_id.or(payment_registration) {
            if let Some(registration) = state.registration(&registration_id).cloned() {
                self.registrations.save(registration).await?;
            }
        }

        self.dispatcher.dispatch(effects).await;

        Ok(settled)
    }
}
