//! HTTP API handlers, organized by resource:
//! - Bookings: creation, lookup, cancellation
//! - Payments: initiation, provider callbacks, verification
//!
//! All handlers speak camelCase JSON and map engine errors through
//! [`error::ApiError`].

pub mod bookings;
pub mod error;
pub mod payments;

pub use bookings::{cancel_booking, create_booking, get_booking};
pub use error::ApiError;
pub use payments::{initiate_payment, payment_callback, verify_payment};
