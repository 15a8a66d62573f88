//! Business metrics for the booking engine.
//!
//! This module provides Prometheus metrics for tracking business operations:
//! - Bookings (created by mode, rejected by error code)
//! - Payments (opened, settled, revenue)
//! - Gateway interactions (requests by operation and outcome)
//! - Ticket issuance and effect dispatch
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `boxoffice_bookings_total{mode}` - Total bookings by mode (payment, waitlist)
//! - `boxoffice_booking_rejections_total{code}` - Rejected booking attempts by error code
//! - `boxoffice_payments_total{status}` - Payment attempts by settled status
//! - `boxoffice_payment_revenue_paise_total` - Total revenue from paid bookings in paise
//! - `boxoffice_gateway_requests_total{operation,outcome}` - Gateway calls by operation
//! - `boxoffice_callbacks_unknown_total` - Callbacks that matched no known transaction
//! - `boxoffice_tickets_issued_total` - Ticket artifacts issued
//! - `boxoffice_effect_failures_total{kind}` - Dispatched effects that exhausted retries
//!
//! ## Histograms
//! - `boxoffice_gateway_request_duration_seconds` - Gateway round-trip time

use metrics::{describe_counter, describe_histogram};

/// Initialize and register all business metrics descriptions.
///
/// This should be called once at application startup, before any metrics are recorded.
pub fn register_business_metrics() {
    // Booking metrics
    describe_counter!(
        "boxoffice_bookings_total",
        "Total number of bookings by mode (payment, waitlist)"
    );
    describe_counter!(
        "boxoffice_booking_rejections_total",
        "Total number of rejected booking attempts by error code"
    );

    // Payment metrics
    describe_counter!(
        "boxoffice_payments_total",
        "Total number of payment attempts by settled status (opened, paid, failed)"
    );
    describe_counter!(
        "boxoffice_payment_revenue_paise_total",
        "Total revenue from paid bookings in paise"
    );

    // Gateway metrics
    describe_counter!(
        "boxoffice_gateway_requests_total",
        "Total gateway calls by operation (initiate, status) and outcome"
    );
    describe_histogram!(
        "boxoffice_gateway_request_duration_seconds",
        "Gateway round-trip time in seconds"
    );
    describe_counter!(
        "boxoffice_callbacks_unknown_total",
        "Callbacks that matched no known transaction and were skipped"
    );

    // Issuance metrics
    describe_counter!(
        "boxoffice_tickets_issued_total",
        "Total number of ticket artifacts issued"
    );
    describe_counter!(
        "boxoffice_effect_failures_total",
        "Dispatched side effects that exhausted their retries, by kind"
    );

    tracing::info!("Business metrics registered");
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record a booking created.
///
/// # Arguments
///
/// * `mode` - Booking mode ("payment" or "waitlist")
pub fn record_booking_created(mode: &'static str) {
    metrics::counter!("boxoffice_bookings_total", "mode" => mode).increment(1);
    tracing::debug!(mode, "Recorded booking_created metric");
}

/// Record a booking attempt rejected at validation or lifecycle checks.
///
/// # Arguments
///
/// * `code` - Stable error code of the rejection
pub fn record_booking_rejected(code: &'static str) {
    metrics::counter!("boxoffice_booking_rejections_total", "code" => code).increment(1);
    tracing::debug!(code, "Recorded booking_rejected metric");
}

/// Record a payment attempt opened against the gateway.
pub fn record_payment_opened() {
    metrics::counter!("boxoffice_payments_total", "status" => "opened").increment(1);
    tracing::debug!("Recorded payment_opened metric");
}

/// Record a payment settled as paid.
///
/// # Arguments
///
/// * `amount_paise` - Settled amount in paise
pub fn record_payment_paid(amount_paise: u64) {
    metrics::counter!("boxoffice_payments_total", "status" => "paid").increment(1);
    metrics::counter!("boxoffice_payment_revenue_paise_total").increment(amount_paise);
    tracing::debug!(amount_paise, "Recorded payment_paid metric");
}

/// Record a payment settled as failed.
pub fn record_payment_failed() {
    metrics::counter!("boxoffice_payments_total", "status" => "failed").increment(1);
    tracing::debug!("Recorded payment_failed metric");
}

/// Record a gateway call.
///
/// # Arguments
///
/// * `operation` - Gateway operation ("initiate" or "status")
/// * `outcome` - Call outcome ("ok" or "error")
/// * `duration_secs` - Round-trip time in seconds
pub fn record_gateway_request(operation: &'static str, outcome: &'static str, duration_secs: f64) {
    metrics::counter!(
        "boxoffice_gateway_requests_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("boxoffice_gateway_request_duration_seconds").record(duration_secs);
    tracing::debug!(operation, outcome, duration_secs, "Recorded gateway_request metric");
}

/// Record a callback that matched no known transaction.
pub fn record_unknown_callback() {
    metrics::counter!("boxoffice_callbacks_unknown_total").increment(1);
    tracing::debug!("Recorded unknown_callback metric");
}

/// Record a ticket artifact issued.
pub fn record_ticket_issued() {
    metrics::counter!("boxoffice_tickets_issued_total").increment(1);
    tracing::debug!("Recorded ticket_issued metric");
}

/// Record a dispatched effect that exhausted its retries.
///
/// # Arguments
///
/// * `kind` - Effect kind ("issue_ticket", "booking_confirmed", ...)
pub fn record_effect_failure(kind: &'static str) {
    metrics::counter!("boxoffice_effect_failures_total", "kind" => kind).increment(1);
    tracing::debug!(kind, "Recorded effect_failure metric");
}
