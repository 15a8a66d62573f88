//! Aggregate reducers for the booking engine.
//!
//! This module contains the two state machines at the heart of the engine:
//! - Registration: booking creation, waitlist handling, and cancellation
//! - Settlement: payment attempts and gateway outcome reconciliation

pub mod registration;
pub mod settlement;

pub use registration::{RegistrationAction, RegistrationReducer};
pub use settlement::{SettlementAction, SettlementReducer};
