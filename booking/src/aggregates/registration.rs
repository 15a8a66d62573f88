//! Registration aggregate for the booking engine.
//!
//! Handles booking creation against an event snapshot, waitlist entry and
//! conversion, and direct cancellation. The reducer is pure: the service
//! layer loads the event and computes pricing up front, and everything the
//! transition needs arrives inside the command.

use crate::effects::{Notification, SideEffect};
use crate::error::BookingError;
use crate::intake::BookingIntent;
use crate::pricing::PricingBreakdown;
use crate::types::{
    Attendee, BookingMode, CouponId, Event, EventStatus, FormResponse, Money, OfferId,
    PaymentStatus, Registration, RegistrationId, RegistrationState, TicketId, UserId,
};
use boxoffice_core::environment::Clock;
use boxoffice_core::{SmallVec, reducer::Reducer, smallvec};
use boxoffice_macros::Action;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

// ============================================================================
// Actions (Commands + Events)
// ============================================================================

/// Actions for the Registration aggregate
#[derive(Action, Clone, Debug, Serialize, Deserialize)]
pub enum RegistrationAction {
    // Commands
    /// Create a booking for an event
    ///
    /// Resolves the booking mode from the event status, then either writes a
    /// fresh row, joins the waitlist, or converts a prior waitlist row when
    /// `existing_registration_id` names one.
    #[command]
    CreateBooking {
        /// Identity for the new row, unused on conversion
        registration_id: RegistrationId,
        /// Snapshot of the event being booked
        event: Event,
        /// Booking user
        user_id: UserId,
        /// Validated attendee details, quantities, and form answers
        intent: BookingIntent,
        /// Applied coupon, if any
        coupon_id: Option<CouponId>,
        /// Bundle offer the buyer selected, if any
        offer_id: Option<OfferId>,
        /// Pricing computed for the requested quantities
        pricing: PricingBreakdown,
        /// Human-readable reference for the new row, unused on conversion
        reference: String,
        /// Prior waitlist registration to convert, if any
        existing_registration_id: Option<RegistrationId>,
    },

    /// Cancel a booking that has not been paid
    #[command]
    CancelBooking {
        /// Registration to cancel
        registration_id: RegistrationId,
    },

    // Events
    /// A payment-mode booking was created
    #[event]
    BookingCreated {
        /// The row as written
        registration: Registration,
    },

    /// A waitlist entry was created
    #[event]
    WaitlistJoined {
        /// The row as written, `is_waitlisted` set
        registration: Registration,
    },

    /// A waitlist entry was converted to a payable booking
    #[event]
    WaitlistConverted {
        /// The converted row
        registration_id: RegistrationId,
        /// Replacement attendee details
        attendee: Attendee,
        /// Replacement quantities
        tickets_bought: BTreeMap<TicketId, u32>,
        /// Replacement form answers
        form_response: FormResponse,
        /// Replacement coupon reference
        coupon_id: Option<CouponId>,
        /// Replacement offer reference
        offer_id: Option<OfferId>,
        /// Pre-discount subtotal
        total_amount: Money,
        /// Amount to charge
        final_amount: Money,
        /// When converted
        converted_at: DateTime<Utc>,
    },

    /// A booking was cancelled
    #[event]
    BookingCancelled {
        /// Cancelled registration
        registration_id: RegistrationId,
        /// When cancelled
        cancelled_at: DateTime<Utc>,
    },

    /// Validation failed
    #[event]
    ValidationFailed {
        /// What went wrong
        error: BookingError,
    },
}

/// Resolves the booking mode for an event status.
///
/// Shared by the reducer and the service shell so closed-event rejections
/// carry one canonical message per status.
///
/// # Errors
///
/// Returns a status-specific `StateConflict` for events not open to booking.
pub fn booking_mode(status: EventStatus) -> Result<BookingMode, BookingError> {
    match status {
        EventStatus::Published => Ok(BookingMode::Payment),
        EventStatus::Waitlist => Ok(BookingMode::Waitlist),
        EventStatus::Draft => Err(BookingError::conflict("Event is not published yet")),
        EventStatus::Cancelled => Err(BookingError::conflict("Event has been cancelled")),
        EventStatus::Completed => Err(BookingError::conflict("Event has already completed")),
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for the Registration aggregate
#[derive(Clone)]
pub struct RegistrationEnvironment {
    /// Clock for timestamps
    pub clock: Arc<dyn Clock>,
}

impl RegistrationEnvironment {
    /// Creates a new `RegistrationEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the Registration aggregate
#[derive(Clone, Debug)]
pub struct RegistrationReducer;

impl RegistrationReducer {
    /// Creates a new `RegistrationReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Applies an event to state
    fn apply_event(state: &mut RegistrationState, action: &RegistrationAction) {
        match action {
            RegistrationAction::BookingCreated { registration }
            | RegistrationAction::WaitlistJoined { registration } => {
                state
                    .registrations
                    .insert(registration.id, registration.clone());
                state.last_error = None;
            }

            RegistrationAction::WaitlistConverted {
                registration_id,
                attendee,
                tickets_bought,
                form_response,
                coupon_id,
                offer_id,
                total_amount,
                final_amount,
                converted_at: _,
            } => {
                if let Some(registration) = state.registrations.get_mut(registration_id) {
                    registration.attendee = attendee.clone();
                    registration.tickets_bought = tickets_bought.clone();
                    registration.form_response = form_response.clone();
                    registration.coupon_id = *coupon_id;
                    registration.offer_id = *offer_id;
                    registration.total_amount = *total_amount;
                    registration.final_amount = *final_amount;
                    registration.is_waitlisted = false;
                    registration.payment_status = PaymentStatus::Pending;
                    registration.transaction_id = None;
                }
                state.last_error = None;
            }

            RegistrationAction::BookingCancelled {
                registration_id, ..
            } => {
                if let Some(registration) = state.registrations.get_mut(registration_id) {
                    registration.deleted = true;
                }
                state.last_error = None;
            }

            RegistrationAction::ValidationFailed { error } => {
                state.last_error = Some(error.clone());
            }

            // Commands don't modify state
            RegistrationAction::CreateBooking { .. }
            | RegistrationAction::CancelBooking { .. } => {}
        }
    }
}

impl Default for RegistrationReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for RegistrationReducer {
    type State = RegistrationState;
    type Action = RegistrationAction;
    type Environment = RegistrationEnvironment;
    type Effect = SideEffect;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[SideEffect; 4]> {
        match action {
            // ========== Create Booking ==========
            RegistrationAction::CreateBooking {
                registration_id,
                event,
                user_id,
                intent,
                coupon_id,
                offer_id,
                pricing,
                reference,
                existing_registration_id,
            } => {
                // Mode resolution comes first: closed events reject before
                // any row is touched.
                let mode = match booking_mode(event.status) {
                    Ok(mode) => mode,
                    Err(error) => {
                        Self::apply_event(
                            state,
                            &RegistrationAction::ValidationFailed { error },
                        );
                        return SmallVec::new();
                    }
                };

                // Waitlist conversion path: reuse the prior row in place
                if let Some(prior_id) = existing_registration_id {
                    let eligible = matches!(mode, BookingMode::Payment)
                        && state.get(&prior_id).is_some_and(|prior| {
                            prior.user_id == user_id
                                && prior.event_id == event.id
                                && !prior.deleted
                                && prior.is_waitlisted
                        });
                    if !eligible {
                        Self::apply_event(
                            state,
                            &RegistrationAction::ValidationFailed {
                                error: BookingError::conflict(
                                    "Existing registration is not eligible for waitlist conversion",
                                ),
                            },
                        );
                        return SmallVec::new();
                    }

                    let converted = RegistrationAction::WaitlistConverted {
                        registration_id: prior_id,
                        attendee: intent.attendee,
                        tickets_bought: intent.tickets_bought,
                        form_response: intent.form_response,
                        coupon_id,
                        offer_id,
                        total_amount: pricing.subtotal,
                        final_amount: pricing.final_amount,
                        converted_at: env.clock.now(),
                    };
                    Self::apply_event(state, &converted);
                    return SmallVec::new();
                }

                let is_waitlisted = matches!(mode, BookingMode::Waitlist);
                let registration = Registration {
                    id: registration_id,
                    event_id: event.id,
                    user_id,
                    attendee: intent.attendee,
                    coupon_id,
                    offer_id,
                    tickets_bought: intent.tickets_bought,
                    total_amount: pricing.subtotal,
                    final_amount: pricing.final_amount,
                    payment_status: PaymentStatus::Pending,
                    is_waitlisted,
                    is_verified: event.requires_verification.then_some(false),
                    transaction_id: None,
                    form_response: intent.form_response,
                    ticket_url: None,
                    reference,
                    deleted: false,
                    created_at: env.clock.now(),
                };

                if is_waitlisted {
                    let notification = Notification::WaitlistConfirmation {
                        registration_id,
                        recipient: registration.attendee.email.clone(),
                        attendee_name: registration.attendee.first_name.clone(),
                        reference: registration.reference.clone(),
                    };
                    let joined = RegistrationAction::WaitlistJoined { registration };
                    Self::apply_event(state, &joined);
                    smallvec![SideEffect::Notify(notification)]
                } else {
                    let created = RegistrationAction::BookingCreated { registration };
                    Self::apply_event(state, &created);
                    SmallVec::new()
                }
            }

            // ========== Cancel Booking ==========
            RegistrationAction::CancelBooking { registration_id } => {
                let Some(registration) = state.get(&registration_id) else {
                    Self::apply_event(
                        state,
                        &RegistrationAction::ValidationFailed {
                            error: BookingError::not_found(
                                "registration",
                                registration_id.as_uuid().to_string(),
                            ),
                        },
                    );
                    return SmallVec::new();
                };

                if !registration.can_cancel() {
                    Self::apply_event(
                        state,
                        &RegistrationAction::ValidationFailed {
                            error: BookingError::conflict(
                                "Registration is not eligible for cancellation",
                            ),
                        },
                    );
                    return SmallVec::new();
                }

                let cancelled = RegistrationAction::BookingCancelled {
                    registration_id,
                    cancelled_at: env.clock.now(),
                };
                Self::apply_event(state, &cancelled);
                SmallVec::new()
            }

            // ========== Events (replayed) ==========
            event => {
                Self::apply_event(state, &event);
                SmallVec::new()
            }
        }
    }
}
