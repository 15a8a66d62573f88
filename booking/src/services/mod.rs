//! Imperative service shell around the pure reducers.
//!
//! Services own all I/O in a unit of work: load catalog and row snapshots,
//! run the reducer, persist what changed, then hand the reducer's effect
//! outbox to the dispatcher. Reducers stay pure and replayable; everything
//! order-sensitive (payment row before gateway call, payment write before
//! registration write) is sequenced here.

pub mod bookings;
pub mod payments;

pub use bookings::{BookingReceipt, BookingRequest, BookingService};
pub use payments::{InitiateError, PaymentService};
