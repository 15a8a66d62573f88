//! Router configuration for the booking engine.

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use super::health::{health_check, readiness_check};
use super::state::AppState;
use crate::api::{bookings, payments};

/// Build the complete Axum router.
///
/// Health checks live at the root; booking and payment endpoints under
/// `/api`. The callback route is the one the gateway is configured with.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Booking lifecycle
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/:id", get(bookings::get_booking))
        .route("/bookings/:id", delete(bookings::cancel_booking))
        // Payment settlement
        .route("/payments/initiate", post(payments::initiate_payment))
        .route("/payments/callback", post(payments::payment_callback))
        .route("/payments/verify", post(payments::verify_payment));

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
