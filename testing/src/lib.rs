//! # Boxoffice Testing
//!
//! Testing utilities and helpers for the boxoffice engine.
//!
//! This crate provides:
//! - A fluent Given-When-Then harness for reducers
//! - Assertion helpers for effect lists
//! - A deterministic test clock
//!
//! ## Example
//!
//! ```ignore
//! use boxoffice_testing::ReducerTest;
//!
//! ReducerTest::new(RegistrationReducer)
//!     .with_env(test_environment())
//!     .given_state(RegistrationState::default())
//!     .when_action(RegistrationAction::CancelBooking { registration_id })
//!     .then_state(|state| {
//!         assert!(state.registrations[&registration_id].deleted);
//!     })
//!     .then_effects(|effects| {
//!         assert!(effects.is_empty());
//!     })
//!     .run();
//! ```

pub mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};

/// Deterministic fixtures shared across reducer and service tests.
pub mod mocks {
    use boxoffice_core::environment::FixedClock;
    use chrono::{DateTime, Utc};

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

pub use mocks::test_clock;
