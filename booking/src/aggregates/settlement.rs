//! Settlement aggregate for the booking engine.
//!
//! Tracks payment attempts against the gateway and reconciles their
//! outcomes. Outcomes arrive more than once and out of order (provider
//! callbacks, status-check polls, manual replays), so every transition here
//! is idempotent: re-applying a terminal outcome re-asserts the same status
//! and keeps the original completion instant, and unknown transactions are
//! skipped rather than failed.

use crate::effects::{Notification, SideEffect};
use crate::error::BookingError;
use crate::gateway::{CallbackOutcome, OutcomeFlow};
use crate::types::{
    Money, Payment, PaymentMode, PaymentStatus, RegistrationId, SettlementState, TransactionId,
};
use boxoffice_core::environment::Clock;
use boxoffice_core::{SmallVec, reducer::Reducer, smallvec};
use boxoffice_macros::Action;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// Actions (Commands + Events)
// ============================================================================

/// Actions for the Settlement aggregate
#[derive(Action, Clone, Debug, Serialize, Deserialize)]
pub enum SettlementAction {
    // Commands
    /// Open a payment attempt for a registration
    ///
    /// Writes the pending Payment row and links it to the registration. The
    /// service issues this before calling the gateway, so a crash mid-flight
    /// leaves an inspectable pending row.
    #[command]
    OpenPayment {
        /// Freshly generated merchant transaction reference
        transaction_id: TransactionId,
        /// Registration being paid for
        registration_id: RegistrationId,
        /// Amount to collect
        amount: Money,
    },

    /// Mark a payment attempt failed before settlement
    ///
    /// Used when gateway initiation fails. Only the Payment row turns
    /// failed; the registration stays payable for a fresh attempt.
    #[command]
    MarkInitiateFailed {
        /// The failed attempt
        transaction_id: TransactionId,
        /// Classified failure description
        reason: String,
    },

    /// Apply a gateway-reported outcome
    ///
    /// Input for both provider callbacks and explicit status-check polls.
    #[command]
    ApplyOutcome {
        /// Decoded outcome
        outcome: CallbackOutcome,
    },

    // Events
    /// A payment attempt was opened
    #[event]
    PaymentOpened {
        /// Merchant transaction reference
        transaction_id: TransactionId,
        /// Registration being paid for
        registration_id: RegistrationId,
        /// Amount to collect
        amount: Money,
        /// When opened
        opened_at: DateTime<Utc>,
    },

    /// A payment attempt failed at initiation
    #[event]
    InitiateFailed {
        /// The failed attempt
        transaction_id: TransactionId,
        /// Classified failure description
        reason: String,
        /// When failed
        failed_at: DateTime<Utc>,
    },

    /// A payment row settled to a gateway-reported status
    #[event]
    PaymentSettled {
        /// Merchant transaction reference
        transaction_id: TransactionId,
        /// Settled status
        status: PaymentStatus,
        /// Instrument used, when reported
        mode: Option<PaymentMode>,
        /// The provider's own reference, when reported
        gateway_reference: Option<String>,
        /// Gateway message text, when reported
        message: Option<String>,
        /// Terminal settlement instant, `None` while pending
        completed_at: Option<DateTime<Utc>>,
    },

    /// A registration's payment status settled
    #[event]
    RegistrationSettled {
        /// Settled registration
        registration_id: RegistrationId,
        /// Settled status
        status: PaymentStatus,
        /// Transaction the settlement came from, when known
        transaction_id: Option<TransactionId>,
    },

    /// Validation failed
    #[event]
    ValidationFailed {
        /// What went wrong
        error: BookingError,
    },
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for the Settlement aggregate
#[derive(Clone)]
pub struct SettlementEnvironment {
    /// Clock for timestamps
    pub clock: Arc<dyn Clock>,
}

impl SettlementEnvironment {
    /// Creates a new `SettlementEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the Settlement aggregate
#[derive(Clone, Debug)]
pub struct SettlementReducer;

impl SettlementReducer {
    /// Creates a new `SettlementReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Applies an event to state
    fn apply_event(state: &mut SettlementState, action: &SettlementAction) {
        match action {
            SettlementAction::PaymentOpened {
                transaction_id,
                registration_id,
                amount,
                opened_at,
            } => {
                state.payments.insert(
                    transaction_id.clone(),
                    Payment {
                        transaction_id: transaction_id.clone(),
                        registration_id: *registration_id,
                        amount: *amount,
                        status: PaymentStatus::Pending,
                        mode: None,
                        gateway_reference: None,
                        gateway_message: None,
                        completed_at: None,
                        created_at: *opened_at,
                    },
                );
                if let Some(registration) = state.registrations.get_mut(registration_id) {
                    registration.transaction_id = Some(transaction_id.clone());
                }
                state.last_error = None;
            }

            SettlementAction::InitiateFailed {
                transaction_id,
                reason,
                failed_at,
            } => {
                if let Some(payment) = state.payments.get_mut(transaction_id) {
                    payment.status = PaymentStatus::Failed;
                    payment.gateway_message = Some(reason.clone());
                    payment.completed_at = Some(*failed_at);
                }
                state.last_error = None;
            }

            SettlementAction::PaymentSettled {
                transaction_id,
                status,
                mode,
                gateway_reference,
                message,
                completed_at,
            } => {
                if let Some(payment) = state.payments.get_mut(transaction_id) {
                    payment.status = *status;
                    if mode.is_some() {
                        payment.mode = *mode;
                    }
                    if let Some(reference) = gateway_reference {
                        payment.gateway_reference = Some(reference.clone());
                    }
                    if let Some(message) = message {
                        payment.gateway_message = Some(message.clone());
                    }
                    payment.completed_at = *completed_at;
                }
                state.last_error = None;
            }

            SettlementAction::RegistrationSettled {
                registration_id,
                status,
                transaction_id,
            } => {
                if let Some(registration) = state.registrations.get_mut(registration_id) {
                    registration.payment_status = *status;
                    if let Some(transaction_id) = transaction_id {
                        registration.transaction_id = Some(transaction_id.clone());
                    }
                }
                state.last_error = None;
            }

            SettlementAction::ValidationFailed { error } => {
                state.last_error = Some(error.clone());
            }

            // Commands don't modify state
            SettlementAction::OpenPayment { .. }
            | SettlementAction::MarkInitiateFailed { .. }
            | SettlementAction::ApplyOutcome { .. } => {}
        }
    }
}

impl Default for SettlementReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for SettlementReducer {
    type State = SettlementState;
    type Action = SettlementAction;
    type Environment = SettlementEnvironment;
    type Effect = SideEffect;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[SideEffect; 4]> {
        match action {
            // ========== Open Payment ==========
            SettlementAction::OpenPayment {
                transaction_id,
                registration_id,
                amount,
            } => {
                let Some(registration) = state.registration(&registration_id) else {
                    Self::apply_event(
                        state,
                        &SettlementAction::ValidationFailed {
                            error: BookingError::not_found(
                                "registration",
                                registration_id.as_uuid().to_string(),
                            ),
                        },
                    );
                    return SmallVec::new();
                };

                if !registration.is_payable() {
                    Self::apply_event(
                        state,
                        &SettlementAction::ValidationFailed {
                            error: BookingError::conflict("Registration is not open for payment"),
                        },
                    );
                    return SmallVec::new();
                }

                let opened = SettlementAction::PaymentOpened {
                    transaction_id,
                    registration_id,
                    amount,
                    opened_at: env.clock.now(),
                };
                Self::apply_event(state, &opened);
                SmallVec::new()
            }

            // ========== Mark Initiate Failed ==========
            SettlementAction::MarkInitiateFailed {
                transaction_id,
                reason,
            } => {
                if state.payment(&transaction_id).is_none() {
                    Self::apply_event(
                        state,
                        &SettlementAction::ValidationFailed {
                            error: BookingError::not_found("payment", transaction_id.to_string()),
                        },
                    );
                    return SmallVec::new();
                }

                let failed = SettlementAction::InitiateFailed {
                    transaction_id,
                    reason,
                    failed_at: env.clock.now(),
                };
                Self::apply_event(state, &failed);
                SmallVec::new()
            }

            // ========== Apply Gateway Outcome ==========
            SettlementAction::ApplyOutcome { outcome } => {
                let new_status = outcome.flow.to_status();

                // Payment half. Unknown transactions are skipped, not
                // failed: stale and duplicate callbacks must never throw.
                let resolved = state
                    .find_payment(
                        outcome.transaction_id.as_ref(),
                        outcome.gateway_reference.as_deref(),
                    )
                    .map(|payment| {
                        (
                            payment.transaction_id.clone(),
                            payment.registration_id,
                            payment.status,
                            payment.completed_at,
                        )
                    });

                let mut settled_transaction_id = outcome.transaction_id.clone();
                let mut registration_id = outcome.registration_id;

                if let Some((transaction_id, payment_registration_id, current, completed)) =
                    resolved
                {
                    settled_transaction_id = Some(transaction_id.clone());
                    if registration_id.is_none() {
                        registration_id = Some(payment_registration_id);
                    }

                    // A terminal payment never downgrades to pending
                    if !(current.is_terminal() && !new_status.is_terminal()) {
                        let completed_at = if new_status.is_terminal() {
                            if current == new_status {
                                // Idempotent replay keeps the original instant
                                completed.or_else(|| Some(env.clock.now()))
                            } else {
                                Some(env.clock.now())
                            }
                        } else {
                            None
                        };
                        let settled = SettlementAction::PaymentSettled {
                            transaction_id,
                            status: new_status,
                            mode: outcome.mode,
                            gateway_reference: outcome.gateway_reference.clone(),
                            message: outcome.message.clone(),
                            completed_at,
                        };
                        Self::apply_event(state, &settled);
                    }
                }

                // Registration half, independent of payment resolution
                if let Some(registration_id) = registration_id {
                    let keep = state.registration(&registration_id).is_some_and(
                        |registration| {
                            !(registration.payment_status.is_terminal()
                                && !new_status.is_terminal())
                        },
                    );
                    if keep {
                        let settled = SettlementAction::RegistrationSettled {
                            registration_id,
                            status: new_status,
                            transaction_id: settled_transaction_id,
                        };
                        Self::apply_event(state, &settled);
                    }
                }

                // Effects read the rows after both halves applied
                match outcome.flow {
                    OutcomeFlow::Success => registration_id
                        .and_then(|id| state.registration(&id))
                        .filter(|registration| {
                            registration.ticket_url.is_none() && !registration.deleted
                        })
                        .map_or_else(SmallVec::new, |registration| {
                            smallvec![SideEffect::IssueTicket {
                                registration_id: registration.id,
                            }]
                        }),
                    OutcomeFlow::Failure => registration_id
                        .and_then(|id| state.registration(&id))
                        .map_or_else(SmallVec::new, |registration| {
                            smallvec![SideEffect::Notify(Notification::PaymentFailed {
                                registration_id: registration.id,
                                recipient: registration.attendee.email.clone(),
                                attendee_name: registration.attendee.first_name.clone(),
                                reference: registration.reference.clone(),
                                reason: outcome
                                    .message
                                    .clone()
                                    .unwrap_or_else(|| "Payment was not completed".to_string()),
                            })]
                        }),
                    OutcomeFlow::Pending => SmallVec::new(),
                }
            }

            // ========== Events (replayed) ==========
            event => {
                Self::apply_event(state, &event);
                SmallVec::new()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Attendee, EventId, Registration, UserId};
    use boxoffice_testing::{ReducerTest, assertions, test_clock};
    use std::collections::BTreeMap;

    fn create_test_env() -> SettlementEnvironment {
        SettlementEnvironment::new(Arc::new(test_clock()))
    }

    fn payable_registration(registration_id: RegistrationId) -> Registration {
        Registration {
            id: registration_id,
            event_id: EventId::new(),
            user_id: UserId::new(),
            attendee: Attendee {
                first_name: "Asha".to_string(),
                email: "asha@example.com".to_string(),
                phone: "9876543210".to_string(),
            },
            coupon_id: None,
            offer_id: None,
            tickets_bought: BTreeMap::new(),
            total_amount: Money::from_rupees(1000),
            final_amount: Money::from_rupees(1000),
            payment_status: PaymentStatus::Pending,
            is_waitlisted: false,
            is_verified: None,
            transaction_id: None,
            form_response: BTreeMap::new(),
            ticket_url: None,
            reference: "winter-gala-3k9f2".to_string(),
            deleted: false,
            created_at: chrono::Utc::now(),
        }
    }

    fn state_with_open_payment(
        registration_id: RegistrationId,
        transaction_id: &TransactionId,
    ) -> SettlementState {
        let mut state = SettlementState::new();
        state
            .registrations
            .insert(registration_id, payable_registration(registration_id));
        SettlementReducer::new().reduce(
            &mut state,
            SettlementAction::OpenPayment {
                transaction_id: transaction_id.clone(),
                registration_id,
                amount: Money::from_rupees(1000),
            },
            &create_test_env(),
        );
        state
    }

    fn success_outcome(transaction_id: &TransactionId) -> CallbackOutcome {
        CallbackOutcome {
            transaction_id: Some(transaction_id.clone()),
            gateway_reference: Some("GW123".to_string()),
            registration_id: None,
            flow: OutcomeFlow::Success,
            status_text: Some("PAYMENT_SUCCESS".to_string()),
            message: Some("Your payment is successful.".to_string()),
            mode: Some(PaymentMode::Upi),
        }
    }

    #[test]
    fn open_payment_writes_pending_row_and_links_registration() {
        let registration_id = RegistrationId::new();
        let transaction_id = TransactionId::generate();

        let mut state = SettlementState::new();
        state
            .registrations
            .insert(registration_id, payable_registration(registration_id));

        let moved_id = transaction_id.clone();
        ReducerTest::new(SettlementReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(SettlementAction::OpenPayment {
                transaction_id: transaction_id.clone(),
                registration_id,
                amount: Money::from_rupees(1000),
            })
            .then_state(move |state| {
                let payment = state.payment(&moved_id).unwrap();
                assert_eq!(payment.status, PaymentStatus::Pending);
                assert_eq!(payment.amount, Money::from_rupees(1000));
                assert!(payment.completed_at.is_none());
                assert_eq!(
                    state.registration(&registration_id).unwrap().transaction_id,
                    Some(moved_id.clone())
                );
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn open_payment_rejects_waitlisted_and_paid_registrations() {
        let registration_id = RegistrationId::new();
        let mut waitlisted = payable_registration(registration_id);
        waitlisted.is_waitlisted = true;

        let mut state = SettlementState::new();
        state.registrations.insert(registration_id, waitlisted);

        ReducerTest::new(SettlementReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(SettlementAction::OpenPayment {
                transaction_id: TransactionId::generate(),
                registration_id,
                amount: Money::from_rupees(1000),
            })
            .then_state(|state| {
                assert!(state.payments.is_empty());
                assert_eq!(
                    state.last_error.as_ref().unwrap().to_string(),
                    "Registration is not open for payment"
                );
            })
            .run();

        let mut paid = payable_registration(registration_id);
        paid.payment_status = PaymentStatus::Paid;
        let mut state = SettlementState::new();
        state.registrations.insert(registration_id, paid);

        ReducerTest::new(SettlementReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(SettlementAction::OpenPayment {
                transaction_id: TransactionId::generate(),
                registration_id,
                amount: Money::from_rupees(1000),
            })
            .then_state(|state| {
                assert!(state.payments.is_empty());
                assert!(state.last_error.is_some());
            })
            .run();
    }

    #[test]
    fn failed_registration_can_reopen_payment() {
        let registration_id = RegistrationId::new();
        let mut failed = payable_registration(registration_id);
        failed.payment_status = PaymentStatus::Failed;

        let mut state = SettlementState::new();
        state.registrations.insert(registration_id, failed);
        let transaction_id = TransactionId::generate();
        let moved_id = transaction_id.clone();

        ReducerTest::new(SettlementReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(SettlementAction::OpenPayment {
                transaction_id,
                registration_id,
                amount: Money::from_rupees(1000),
            })
            .then_state(move |state| {
                assert_eq!(
                    state.payment(&moved_id).unwrap().status,
                    PaymentStatus::Pending
                );
            })
            .run();
    }

    #[test]
    fn initiate_failure_fails_the_payment_but_not_the_registration() {
        let registration_id = RegistrationId::new();
        let transaction_id = TransactionId::generate();
        let state = state_with_open_payment(registration_id, &transaction_id);
        let moved_id = transaction_id.clone();

        ReducerTest::new(SettlementReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(SettlementAction::MarkInitiateFailed {
                transaction_id,
                reason: "gateway rejected the initiation (HTTP 502)".to_string(),
            })
            .then_state(move |state| {
                let payment = state.payment(&moved_id).unwrap();
                assert_eq!(payment.status, PaymentStatus::Failed);
                assert!(payment.completed_at.is_some());
                // The registration stays payable for a fresh attempt
                assert!(state.registration(&registration_id).unwrap().is_payable());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn success_outcome_settles_both_rows_and_issues_ticket() {
        let registration_id = RegistrationId::new();
        let transaction_id = TransactionId::generate();
        let state = state_with_open_payment(registration_id, &transaction_id);
        let moved_id = transaction_id.clone();

        ReducerTest::new(SettlementReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(SettlementAction::ApplyOutcome {
                outcome: success_outcome(&transaction_id),
            })
            .then_state(move |state| {
                let payment = state.payment(&moved_id).unwrap();
                assert_eq!(payment.status, PaymentStatus::Paid);
                assert_eq!(payment.mode, Some(PaymentMode::Upi));
                assert_eq!(payment.gateway_reference.as_deref(), Some("GW123"));
                assert!(payment.completed_at.is_some());

                let registration = state.registration(&registration_id).unwrap();
                assert_eq!(registration.payment_status, PaymentStatus::Paid);
            })
            .then_effects(move |effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_effect_matching(
                    effects,
                    |effect| {
                        matches!(
                            effect,
                            SideEffect::IssueTicket { registration_id: id } if *id == registration_id
                        )
                    },
                    "issue ticket for the settled registration",
                );
            })
            .run();
    }

    #[test]
    fn replayed_terminal_outcome_keeps_the_original_completion_instant() {
        let registration_id = RegistrationId::new();
        let transaction_id = TransactionId::generate();
        let mut state = state_with_open_payment(registration_id, &transaction_id);

        let reducer = SettlementReducer::new();
        let env = create_test_env();
        reducer.reduce(
            &mut state,
            SettlementAction::ApplyOutcome {
                outcome: success_outcome(&transaction_id),
            },
            &env,
        );
        let first_completed_at = state.payment(&transaction_id).unwrap().completed_at;
        assert!(first_completed_at.is_some());

        // Replay through an environment whose clock reads later
        let later = SettlementEnvironment::new(Arc::new(
            boxoffice_core::environment::FixedClock::new(
                chrono::Utc::now() + chrono::Duration::hours(1),
            ),
        ));
        let effects = reducer.reduce(
            &mut state,
            SettlementAction::ApplyOutcome {
                outcome: success_outcome(&transaction_id),
            },
            &later,
        );

        let payment = state.payment(&transaction_id).unwrap();
        assert_eq!(payment.status, PaymentStatus::Paid);
        assert_eq!(payment.completed_at, first_completed_at);
        // Issuance can fire again: the dispatcher overwrites in place, and
        // the gate closes once a ticket URL lands on the registration
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn issuance_is_gated_on_missing_ticket_url() {
        let registration_id = RegistrationId::new();
        let transaction_id = TransactionId::generate();
        let mut state = state_with_open_payment(registration_id, &transaction_id);
        if let Some(registration) = state.registrations.get_mut(&registration_id) {
            registration.ticket_url = Some("https://cdn.example.com/tickets/r.pdf".to_string());
        }

        ReducerTest::new(SettlementReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(SettlementAction::ApplyOutcome {
                outcome: success_outcome(&transaction_id),
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn unknown_transaction_is_skipped_without_error() {
        let state = SettlementState::new();
        let transaction_id = TransactionId::new("txn_unknown");

        ReducerTest::new(SettlementReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(SettlementAction::ApplyOutcome {
                outcome: success_outcome(&transaction_id),
            })
            .then_state(|state| {
                assert!(state.payments.is_empty());
                assert!(state.last_error.is_none());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn payment_resolves_by_gateway_reference_alone() {
        let registration_id = RegistrationId::new();
        let transaction_id = TransactionId::generate();
        let mut state = state_with_open_payment(registration_id, &transaction_id);

        // First outcome records the provider reference
        SettlementReducer::new().reduce(
            &mut state,
            SettlementAction::ApplyOutcome {
                outcome: CallbackOutcome {
                    flow: OutcomeFlow::Pending,
                    ..success_outcome(&transaction_id)
                },
            },
            &create_test_env(),
        );

        // Second outcome carries only the provider reference
        let moved_id = transaction_id.clone();
        ReducerTest::new(SettlementReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(SettlementAction::ApplyOutcome {
                outcome: CallbackOutcome {
                    transaction_id: None,
                    gateway_reference: Some("GW123".to_string()),
                    registration_id: None,
                    flow: OutcomeFlow::Success,
                    status_text: Some("PAYMENT_SUCCESS".to_string()),
                    message: None,
                    mode: Some(PaymentMode::Upi),
                },
            })
            .then_state(move |state| {
                assert_eq!(
                    state.payment(&moved_id).unwrap().status,
                    PaymentStatus::Paid
                );
            })
            .run();
    }

    #[test]
    fn failure_outcome_notifies_the_attendee() {
        let registration_id = RegistrationId::new();
        let transaction_id = TransactionId::generate();
        let state = state_with_open_payment(registration_id, &transaction_id);
        let moved_id = transaction_id.clone();

        ReducerTest::new(SettlementReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(SettlementAction::ApplyOutcome {
                outcome: CallbackOutcome {
                    transaction_id: Some(transaction_id.clone()),
                    gateway_reference: None,
                    registration_id: None,
                    flow: OutcomeFlow::Failure,
                    status_text: Some("PAYMENT_ERROR".to_string()),
                    message: Some("Payment declined by bank".to_string()),
                    mode: None,
                },
            })
            .then_state(move |state| {
                assert_eq!(
                    state.payment(&moved_id).unwrap().status,
                    PaymentStatus::Failed
                );
                assert_eq!(
                    state.registration(&registration_id).unwrap().payment_status,
                    PaymentStatus::Failed
                );
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_effect_matching(
                    effects,
                    |effect| {
                        matches!(
                            effect,
                            SideEffect::Notify(Notification::PaymentFailed { reason, .. })
                                if reason == "Payment declined by bank"
                        )
                    },
                    "payment failed notification with the gateway message",
                );
            })
            .run();
    }

    #[test]
    fn pending_outcome_never_downgrades_a_terminal_payment() {
        let registration_id = RegistrationId::new();
        let transaction_id = TransactionId::generate();
        let mut state = state_with_open_payment(registration_id, &transaction_id);

        SettlementReducer::new().reduce(
            &mut state,
            SettlementAction::ApplyOutcome {
                outcome: success_outcome(&transaction_id),
            },
            &create_test_env(),
        );

        let moved_id = transaction_id.clone();
        ReducerTest::new(SettlementReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(SettlementAction::ApplyOutcome {
                outcome: CallbackOutcome {
                    flow: OutcomeFlow::Pending,
                    status_text: Some("PAYMENT_PENDING".to_string()),
                    ..success_outcome(&transaction_id)
                },
            })
            .then_state(move |state| {
                assert_eq!(state.payment(&moved_id).unwrap().status, PaymentStatus::Paid);
                assert_eq!(
                    state.registration(&registration_id).unwrap().payment_status,
                    PaymentStatus::Paid
                );
            })
            .run();
    }

    #[test]
    fn registration_half_applies_even_when_the_payment_is_unknown() {
        let registration_id = RegistrationId::new();
        let mut state = SettlementState::new();
        state
            .registrations
            .insert(registration_id, payable_registration(registration_id));

        let transaction_id = TransactionId::new("txn_elsewhere");
        let moved_id = transaction_id.clone();
        ReducerTest::new(SettlementReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(SettlementAction::ApplyOutcome {
                outcome: CallbackOutcome {
                    transaction_id: Some(transaction_id),
                    gateway_reference: None,
                    registration_id: Some(registration_id),
                    flow: OutcomeFlow::Success,
                    status_text: Some("PAYMENT_SUCCESS".to_string()),
                    message: None,
                    mode: None,
                },
            })
            .then_state(move |state| {
                assert!(state.payments.is_empty());
                let registration = state.registration(&registration_id).unwrap();
                assert_eq!(registration.payment_status, PaymentStatus::Paid);
                assert_eq!(registration.transaction_id, Some(moved_id.clone()));
            })
            .run();
    }
}
