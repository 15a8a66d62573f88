//! Booking API endpoints.
//!
//! - POST /api/bookings - Create a booking, waitlist entry, or conversion
//! - GET /api/bookings/:id - Get one booking
//! - DELETE /api/bookings/:id - Cancel an unpaid booking
//!
//! The wire format is camelCase. Identifier fields arrive as strings and
//! are decoded here; a malformed UUID is a validation error, never a
//! deserialization panic.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::intake::BookingDraft;
use crate::pricing::PricingBreakdown;
use crate::server::state::AppState;
use crate::services::BookingRequest;
use crate::types::{
    BookingMode, CouponId, EventId, FormResponse, Money, OfferId, PaymentStatus, Registration,
    RegistrationId, TicketId, UserId,
};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to create a booking.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    /// Event to book
    pub event_id: Uuid,
    /// Attendee name
    pub first_name: String,
    /// Contact email
    pub email: String,
    /// Contact phone, exactly 10 digits
    pub phone: String,
    /// Client-computed total, advisory only; the server reprices
    #[serde(default)]
    pub amount: Option<f64>,
    /// Requested quantities keyed by ticket id
    #[serde(default)]
    pub tickets_bought: BTreeMap<String, u32>,
    /// Prior waitlist registration to convert, if any
    #[serde(default)]
    pub registration_id: Option<Uuid>,
    /// Coupon to apply, if any
    #[serde(default)]
    pub coupon_id: Option<Uuid>,
    /// Bundle offer the buyer selected, if any
    #[serde(default)]
    pub bundle_id: Option<Uuid>,
    /// Custom form answers
    #[serde(default)]
    pub form_response: FormResponse,
    /// Booking user; guest checkouts get a fresh id
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

/// Response after creating a booking.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    /// Resolved booking mode
    pub booking_mode: BookingMode,
    /// The persisted booking
    pub booking: BookingView,
    /// Itemized pricing
    pub pricing: PricingView,
}

/// Pricing summary, amounts in paise.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingView {
    /// Pre-discount subtotal
    pub subtotal: Money,
    /// Combined bundle and coupon discount
    pub discount_amount: Money,
    /// Amount the buyer pays
    pub final_amount: Money,
}

impl From<&PricingBreakdown> for PricingView {
    fn from(pricing: &PricingBreakdown) -> Self {
        Self {
            subtotal: pricing.subtotal,
            discount_amount: pricing.total_discount(),
            final_amount: pricing.final_amount,
        }
    }
}

/// Booking details response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    /// Booking ID
    pub id: Uuid,
    /// Event ID
    pub event_id: Uuid,
    /// Booking user ID
    pub user_id: Uuid,
    /// Attendee name
    pub first_name: String,
    /// Contact email
    pub email: String,
    /// Contact phone
    pub phone: String,
    /// Applied coupon, if any
    pub coupon_id: Option<Uuid>,
    /// Selected bundle offer, if any
    pub bundle_id: Option<Uuid>,
    /// Booked quantities keyed by ticket id
    pub tickets_bought: BTreeMap<String, u32>,
    /// Pre-discount subtotal in paise
    pub total_amount: Money,
    /// Amount charged in paise
    pub final_amount: Money,
    /// Payment progress
    pub payment_status: PaymentStatus,
    /// Waitlist flag
    pub is_waitlisted: bool,
    /// Verification state, `null` when the event does not require it
    pub is_verified: Option<bool>,
    /// Active payment attempt, if any
    pub transaction_id: Option<String>,
    /// Submitted form answers
    pub form_response: FormResponse,
    /// Issued ticket URL, once available
    pub ticket_url: Option<String>,
    /// Human-readable unique reference
    pub reference: String,
    /// Soft-delete marker
    pub deleted: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<Registration> for BookingView {
    fn from(registration: Registration) -> Self {
        Self {
            id: registration.id.as_uuid(),
            event_id: registration.event_id.as_uuid(),
            user_id: registration.user_id.as_uuid(),
            first_name: registration.attendee.first_name,
            email: registration.attendee.email,
            phone: registration.attendee.phone,
            coupon_id: registration.coupon_id.map(|id| id.as_uuid()),
            bundle_id: registration.offer_id.map(|id| id.as_uuid()),
            tickets_bought: registration
                .tickets_bought
                .iter()
                .map(|(ticket_id, quantity)| (ticket_id.to_string(), *quantity))
                .collect(),
            total_amount: registration.total_amount,
            final_amount: registration.final_amount,
            payment_status: registration.payment_status,
            is_waitlisted: registration.is_waitlisted,
            is_verified: registration.is_verified,
            transaction_id: registration.transaction_id.map(|id| id.to_string()),
            form_response: registration.form_response,
            ticket_url: registration.ticket_url,
            reference: registration.reference,
            deleted: registration.deleted,
            created_at: registration.created_at,
        }
    }
}

fn decode(request: CreateBookingRequest) -> Result<BookingRequest, ApiError> {
    let mut tickets_bought = BTreeMap::new();
    for (key, quantity) in request.tickets_bought {
        let ticket_id = Uuid::parse_str(&key).map_err(|_| {
            ApiError::validation(format!("ticketsBought contains a malformed ticket id: {key}"))
        })?;
        tickets_bought.insert(TicketId::from_uuid(ticket_id), quantity);
    }

    Ok(BookingRequest {
        event_id: EventId::from_uuid(request.event_id),
        user_id: request
            .user_id
            .map_or_else(UserId::new, UserId::from_uuid),
        draft: BookingDraft {
            first_name: request.first_name,
            email: request.email,
            phone: request.phone,
            tickets_bought,
            form_response: request.form_response,
        },
        coupon_id: request.coupon_id.map(CouponId::from_uuid),
        offer_id: request.bundle_id.map(OfferId::from_uuid),
        existing_registration_id: request.registration_id.map(RegistrationId::from_uuid),
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a booking.
///
/// Resolves the booking mode from the event status: published events take
/// paid bookings, waitlist events take unpaid waitlist entries, and any
/// other status rejects. Supplying `registrationId` converts that prior
/// waitlist entry instead of creating a new row.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/bookings \
///   -H "Content-Type: application/json" \
///   -d '{
///     "eventId": "550e8400-e29b-41d4-a716-446655440000",
///     "firstName": "Asha",
///     "email": "asha@example.com",
///     "phone": "9876543210",
///     "ticketsBought": { "660e8400-e29b-41d4-a716-446655440001": 3 }
///   }'
/// ```
///
/// Response:
/// ```json
/// {
///   "bookingMode": "payment",
///   "booking": { "id": "...", "reference": "summer-gala-x7k2", "paymentStatus": "pending" },
///   "pricing": { "subtotal": 150000, "discountAmount": 50000, "finalAmount": 100000 }
/// }
/// ```
///
/// # Errors
///
/// Returns 404 for an unknown event, 409 for events not open to booking or
/// an ineligible conversion, and 422 for intake or coupon problems.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    let advertised_amount = request.amount;
    let booking_request = decode(request)?;

    let receipt = state.bookings.create_booking(booking_request).await?;

    // The client's own total is informational; the server price wins
    if let Some(amount) = advertised_amount {
        tracing::debug!(
            client_amount = amount,
            final_amount = %receipt.pricing.final_amount,
            "Client-advertised amount recorded"
        );
    }

    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            booking_mode: receipt.mode,
            pricing: PricingView::from(&receipt.pricing),
            booking: BookingView::from(receipt.registration),
        }),
    ))
}

/// Get booking details by ID.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/api/bookings/660e8400-e29b-41d4-a716-446655440001
/// ```
///
/// # Errors
///
/// Returns 404 when the booking does not exist.
pub async fn get_booking(
    Path(booking_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<BookingView>, ApiError> {
    let registration = state
        .bookings
        .find_booking(RegistrationId::from_uuid(booking_id))
        .await?;
    Ok(Json(BookingView::from(registration)))
}

/// Cancel an unpaid booking (soft delete).
///
/// # Example
///
/// ```bash
/// curl -X DELETE http://localhost:8080/api/bookings/660e8400-e29b-41d4-a716-446655440001
/// ```
///
/// # Errors
///
/// Returns 404 for an unknown booking and 409 when the booking is already
/// paid or already cancelled.
pub async fn cancel_booking(
    Path(booking_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<BookingView>, ApiError> {
    let cancelled = state
        .bookings
        .cancel_booking(RegistrationId::from_uuid(booking_id))
        .await?;
    Ok(Json(BookingView::from(cancelled)))
}
