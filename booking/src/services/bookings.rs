//! Booking service - intake, pricing, and the registration lifecycle.
//!
//! Coordinates one booking-create or cancel unit of work:
//! 1. Load the event and its catalog (tickets, offers, form fields)
//! 2. Validate intake and price the selection
//! 3. Run the lifecycle reducer
//! 4. Persist the row and advance sold counters
//! 5. Dispatch the reducer's effects

use std::sync::Arc;

use boxoffice_core::environment::Clock;
use boxoffice_core::reducer::Reducer;

use crate::aggregates::registration::{
    RegistrationAction, RegistrationEnvironment, RegistrationReducer, booking_mode,
};
use crate::dispatch::EffectDispatcher;
use crate::error::{BookingError, Result};
use crate::intake::{self, BookingDraft};
use crate::pricing::{self, PricingBreakdown};
use crate::providers::{CatalogStore, RegistrationStore};
use crate::types::{
    BookingMode, CouponId, EventId, OfferId, Registration, RegistrationId, RegistrationState,
    UserId, generate_reference,
};

/// Input for one booking creation
#[derive(Clone, Debug)]
pub struct BookingRequest {
    /// Event being booked
    pub event_id: EventId,
    /// Booking user
    pub user_id: UserId,
    /// Raw attendee, selection, and form input
    pub draft: BookingDraft,
    /// Coupon to apply, if any
    pub coupon_id: Option<CouponId>,
    /// Bundle offer the buyer selected, if any
    pub offer_id: Option<OfferId>,
    /// Prior waitlist registration to convert, if any
    pub existing_registration_id: Option<RegistrationId>,
}

/// Outcome of a successful booking creation
#[derive(Clone, Debug)]
pub struct BookingReceipt {
    /// Resolved booking mode
    pub mode: BookingMode,
    /// The row as persisted
    pub registration: Registration,
    /// Itemized pricing, zero for waitlist entries
    pub pricing: PricingBreakdown,
}

/// Booking lifecycle service
pub struct BookingService {
    catalog: Arc<dyn CatalogStore>,
    registrations: Arc<dyn RegistrationStore>,
    dispatcher: Arc<EffectDispatcher>,
    reducer: RegistrationReducer,
    env: RegistrationEnvironment,
}

impl BookingService {
    /// Creates a new booking service
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        registrations: Arc<dyn RegistrationStore>,
        dispatcher: Arc<EffectDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            registrations,
            dispatcher,
            reducer: RegistrationReducer::new(),
            env: RegistrationEnvironment::new(clock),
        }
    }

    /// Creates a booking, a waitlist entry, or a waitlist conversion.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown event, a status-specific
    /// `StateConflict` for events not open to booking, `Validation` /
    /// `RequiredFieldMissing` for intake problems, `CouponInvalid` for an
    /// inapplicable coupon, and `Persistence` for storage failures.
    pub async fn create_booking(&self, request: BookingRequest) -> Result<BookingReceipt> {
        match self.create(request).await {
            Ok(receipt) => {
                crate::metrics::record_booking_created(receipt.mode.as_str());
                Ok(receipt)
            }
            Err(error) => {
                if error.is_caller_error() {
                    crate::metrics::record_booking_rejected(error.code());
                }
                Err(error)
            }
        }
    }

    async fn create(&self, request: BookingRequest) -> Result<BookingReceipt> {
        let event = self.catalog.event(request.event_id).await?.ok_or_else(|| {
            BookingError::not_found("event", request.event_id.as_uuid().to_string())
        })?;

        let mode = booking_mode(event.status)?;

        // Independent catalog reads for one event
        let (tickets, offers, fields) = tokio::join!(
            self.catalog.tickets(event.id),
            self.catalog.offers(event.id),
            self.catalog.form_fields(event.id),
        );
        let (tickets, offers, fields) = (tickets?, offers?, fields?);

        let intent = intake::validate(request.draft, mode, &fields)?;

        let now = self.env.clock.now();
        let pricing = match mode {
            BookingMode::Payment => {
                let coupon = match request.coupon_id {
                    Some(coupon_id) => Some(
                        self.catalog
                            .coupon(coupon_id)
                            .await?
                            .filter(|coupon| coupon.event_id == event.id)
                            .ok_or_else(|| BookingError::CouponInvalid {
                                reason: "not found for this event".to_string(),
                            })?,
                    ),
                    None => None,
                };
                let pool = pricing::expand_units(&intent.tickets_bought, &tickets, now)?;
                pricing::price_booking(&pool, &offers, coupon.as_ref(), event.id, now)?
            }
            BookingMode::Waitlist => PricingBreakdown::zero(),
        };

        let registration_id = RegistrationId::new();
        let reference = generate_reference(&event.name);

        // On conversion the reducer needs the prior row in view
        let mut state = RegistrationState::new();
        if let Some(prior_id) = request.existing_registration_id {
            if let Some(prior) = self.registrations.find(prior_id).await? {
                state.registrations.insert(prior.id, prior);
            }
        }

        let effects = self.reducer.reduce(
            &mut state,
            RegistrationAction::CreateBooking {
                registration_id,
                event,
                user_id: request.user_id,
                intent,
                coupon_id: request.coupon_id,
                offer_id: request.offer_id,
                pricing: pricing.clone(),
                reference,
                existing_registration_id: request.existing_registration_id,
            },
            &self.env,
        );
        if let Some(error) = state.last_error.take() {
            return Err(error);
        }

        let saved_id = request.existing_registration_id.unwrap_or(registration_id);
        let registration = state.get(&saved_id).cloned().ok_or_else(|| {
            BookingError::Persistence("registration missing after lifecycle transition".to_string())
        })?;

        self.registrations.save(registration.clone()).await?;

        if matches!(mode, BookingMode::Payment) {
            self.catalog
                .increment_sold(registration.tickets_bought.clone())
                .await?;
        }

        tracing::info!(
            registration_id = %registration.id.as_uuid(),
            mode = mode.as_str(),
            reference = %registration.reference,
            "Booking created"
        );

        self.dispatcher.dispatch(effects).await;

        Ok(BookingReceipt {
            mode,
            registration,
            pricing,
        })
    }

    /// Loads one registration.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the row does not exist and `Persistence` for
    /// storage failures.
    pub async fn find_booking(&self, registration_id: RegistrationId) -> Result<Registration> {
        self.registrations
            .find(registration_id)
            .await?
            .ok_or_else(|| {
                BookingError::not_found("registration", registration_id.as_uuid().to_string())
            })
    }

    /// Cancels an unpaid booking (soft delete).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown registration, `StateConflict` when
    /// the row is paid or already deleted, and `Persistence` for storage
    /// failures.
    pub async fn cancel_booking(&self, registration_id: RegistrationId) -> Result<Registration> {
        let registration = self.find_booking(registration_id).await?;

        let mut state = RegistrationState::new();
        state.registrations.insert(registration.id, registration);

        let effects = self.reducer.reduce(
            &mut state,
            RegistrationAction::CancelBooking { registration_id },
            &self.env,
        );
        if let Some(error) = state.last_error.take() {
            return Err(error);
        }

        let cancelled = state.get(&registration_id).cloned().ok_or_else(|| {
            BookingError::Persistence("registration missing after cancellation".to_string())
        })?;
        self.registrations.save(cancelled.clone()).await?;

        tracing::info!(registration_id = %registration_id.as_uuid(), "Booking cancelled");

        self.dispatcher.dispatch(effects).await;

        Ok(cancelled)
    }
}
