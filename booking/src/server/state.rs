//! Application state for the booking HTTP server.

use std::sync::Arc;

use crate::services::{BookingService, PaymentService};

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via Arc) for each request. The services own every store
/// and provider; handlers never touch storage directly.
#[derive(Clone)]
pub struct AppState {
    /// Booking lifecycle service
    pub bookings: Arc<BookingService>,

    /// Payment settlement service
    pub payments: Arc<PaymentService>,
}

impl AppState {
    /// Creates a new application state
    #[must_use]
    pub fn new(bookings: Arc<BookingService>, payments: Arc<PaymentService>) -> Self {
        Self { bookings, payments }
    }
}
