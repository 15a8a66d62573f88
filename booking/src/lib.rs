//! Booking and payment settlement engine for ticketed events.
//!
//! Events expose priced ticket tiers, discount coupons, "buy X get Y"
//! bundle offers, and custom registration form fields; buyers book tickets
//! and pay through an external hosted-checkout gateway. This crate covers
//! the settlement core: pricing, the registration lifecycle, gateway
//! reconciliation, and ticket issuance.
//!
//! # Architecture
//!
//! State transitions are pure reducers; services sequence the I/O around
//! them and hand each transition's effect outbox to a dispatcher:
//!
//! ```text
//!                 POST /api/bookings
//!                        │
//!                        ▼
//!   ┌──────────┐   ┌───────────┐   ┌──────────────────────┐
//!   │  Intake   │──▶│  Pricing  │──▶│ Registration reducer │
//!   │ validator │   │ pipeline  │   │  (create / convert)  │
//!   └──────────┘   └───────────┘   └──────────┬───────────┘
//!                                             │ effects
//!                 POST /api/payments/initiate ▼
//!   ┌──────────────────┐   ┌──────────────────────┐   ┌────────────┐
//!   │ Payment gateway  │◀──│  Settlement reducer  │──▶│ Dispatcher │
//!   │ (hosted checkout)│   │ (open / reconcile)   │   │ (issuance, │
//!   └────────┬─────────┘   └──────────▲───────────┘   │  notify)   │
//!            │  async callback        │               └────────────┘
//!            └─────────────────────────┘
//! ```
//!
//! # Key Guarantees
//!
//! - The pending payment row is durable before the gateway hears about an
//!   attempt, so a crash mid-initiate is inspectable.
//! - Replayed terminal callbacks are idempotent: status and completion
//!   timestamp are re-asserted, never doubled, and issuance is gated on
//!   the registration not already carrying a ticket URL.
//! - Callbacks naming an unknown transaction are audited, logged, and
//!   skipped; they never fail the acknowledgement.
//! - Issuance and notification failures are logged and never roll back a
//!   settled payment.

pub mod aggregates;
pub mod api;
pub mod config;
pub mod dispatch;
pub mod effects;
pub mod error;
pub mod gateway;
pub mod intake;
pub mod metrics;
pub mod mocks;
pub mod pricing;
pub mod providers;
pub mod server;
pub mod services;
pub mod stores;
pub mod types;

pub use config::Config;
pub use error::{BookingError, Result};
pub use server::{AppState, build_router};
pub use services::{BookingReceipt, BookingRequest, BookingService, InitiateError, PaymentService};
