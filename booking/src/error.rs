//! Error types for booking and settlement operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for booking operations.
pub type Result<T> = std::result::Result<T, BookingError>;

/// Error taxonomy for the booking engine.
///
/// Every failure a caller can observe falls into one of these categories,
/// each with a stable machine code and an HTTP mapping at the API boundary.
/// Serializable so lifecycle events can carry the rejection they recorded.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingError {
    // ═══════════════════════════════════════════════════════════
    // Validation Errors
    // ═══════════════════════════════════════════════════════════

    /// Caller input failed a structural or semantic check.
    #[error("{0}")]
    Validation(String),

    /// A required, currently-visible form field was left blank.
    #[error("{label} is required")]
    RequiredFieldMissing {
        /// Display label of the missing field
        label: String,
    },

    /// The supplied coupon code cannot be applied.
    #[error("Coupon is not valid: {reason}")]
    CouponInvalid {
        /// Why the coupon was rejected
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Lookup Errors
    // ═══════════════════════════════════════════════════════════

    /// A referenced entity does not exist.
    #[error("{what} with id {id} not found")]
    NotFound {
        /// Entity kind ("event", "registration", "ticket", ...)
        what: String,
        /// The identifier that failed to resolve
        id: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Lifecycle Errors
    // ═══════════════════════════════════════════════════════════

    /// The operation is not legal in the entity's current state.
    #[error("{0}")]
    StateConflict(String),

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// The payment gateway could not be reached or answered abnormally.
    #[error("Payment gateway error: {0}")]
    Gateway(String),

    /// A storage operation failed.
    #[error("Storage error: {0}")]
    Persistence(String),
}

impl BookingError {
    /// Builds a validation error from any displayable message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Builds a state-conflict error from any displayable message.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::StateConflict(message.into())
    }

    /// Builds a not-found error for an entity kind and identifier.
    #[must_use]
    pub fn not_found(what: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            what: what.into(),
            id: id.into(),
        }
    }

    /// Returns `true` if this error is due to caller input.
    ///
    /// # Examples
    ///
    /// ```
    /// # use boxoffice_booking::error::BookingError;
    /// assert!(BookingError::validation("tickets_bought cannot be empty").is_caller_error());
    /// assert!(!BookingError::Persistence("write failed".into()).is_caller_error());
    /// ```
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::RequiredFieldMissing { .. }
                | Self::CouponInvalid { .. }
                | Self::NotFound { .. }
                | Self::StateConflict(_)
        )
    }

    /// Stable machine-readable code for API payloads.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::RequiredFieldMissing { .. } => "validation_error",
            Self::CouponInvalid { .. } => "coupon_invalid",
            Self::NotFound { .. } => "not_found",
            Self::StateConflict(_) => "state_conflict",
            Self::Gateway(_) => "gateway_error",
            Self::Persistence(_) => "persistence_error",
        }
    }

    /// HTTP status this error maps to at the API boundary.
    ///
    /// # Examples
    ///
    /// ```
    /// # use boxoffice_booking::error::BookingError;
    /// assert_eq!(BookingError::validation("bad input").http_status(), 422);
    /// assert_eq!(BookingError::not_found("event", "abc").http_status(), 404);
    /// assert_eq!(BookingError::Gateway("timeout".into()).http_status(), 502);
    /// ```
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_)
            | Self::RequiredFieldMissing { .. }
            | Self::CouponInvalid { .. } => 422,
            Self::NotFound { .. } => 404,
            Self::StateConflict(_) => 409,
            Self::Gateway(_) => 502,
            Self::Persistence(_) => 500,
        }
    }
}
