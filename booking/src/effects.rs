//! Booking side effects.
//!
//! This module defines the side effects the lifecycle and settlement
//! reducers can produce. Effects are **values**, not execution: reducers
//! return them as an outbox list and the effect dispatcher interprets them,
//! so transition correctness never depends on notification reliability.

use serde::{Deserialize, Serialize};

use crate::types::RegistrationId;

/// A side effect requested by a reducer.
///
/// The dispatcher executes these after the state transition that produced
/// them has been persisted. Execution failures are logged and retried;
/// they never roll back the transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SideEffect {
    /// Issue the ticket artifact for a settled registration.
    ///
    /// # Dispatcher Responsibility
    ///
    /// 1. Render the ticket document
    /// 2. Store it under the registration's artifact key (overwriting any
    ///    prior version)
    /// 3. Write the resolved URL back onto the registration
    /// 4. Send the ticket to the attendee
    IssueTicket {
        /// Registration to issue for
        registration_id: RegistrationId,
    },

    /// Send a notification to the attendee.
    ///
    /// # Dispatcher Responsibility
    ///
    /// 1. Render the message for the notification kind
    /// 2. Deliver it via the configured channel
    Notify(Notification),
}

/// Attendee-facing notification kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    /// Confirms a waitlist entry was recorded
    WaitlistConfirmation {
        /// Registration the entry belongs to
        registration_id: RegistrationId,
        /// Destination email address
        recipient: String,
        /// Attendee name for the salutation
        attendee_name: String,
        /// Human-readable booking reference
        reference: String,
    },

    /// Confirms a successful payment and booking
    BookingConfirmed {
        /// Registration that settled
        registration_id: RegistrationId,
        /// Destination email address
        recipient: String,
        /// Attendee name for the salutation
        attendee_name: String,
        /// Human-readable booking reference
        reference: String,
    },

    /// Reports a failed payment attempt
    PaymentFailed {
        /// Registration whose payment failed
        registration_id: RegistrationId,
        /// Destination email address
        recipient: String,
        /// Attendee name for the salutation
        attendee_name: String,
        /// Human-readable booking reference
        reference: String,
        /// Gateway-reported reason, when available
        reason: Option<String>,
    },
}

impl Notification {
    /// Destination address of this notification
    #[must_use]
    pub fn recipient(&self) -> &str {
        match self {
            Self::WaitlistConfirmation { recipient, .. }
            | Self::BookingConfirmed { recipient, .. }
            | Self::PaymentFailed { recipient, .. } => recipient,
        }
    }

    /// Registration this notification concerns
    #[must_use]
    pub const fn registration_id(&self) -> RegistrationId {
        match self {
            Self::WaitlistConfirmation {
                registration_id, ..
            }
            | Self::BookingConfirmed {
                registration_id, ..
            }
            | Self::PaymentFailed {
                registration_id, ..
            } => *registration_id,
        }
    }

    /// Short kind label used in logs and metrics
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::WaitlistConfirmation { .. } => "waitlist_confirmation",
            Self::BookingConfirmed { .. } => "booking_confirmed",
            Self::PaymentFailed { .. } => "payment_failed",
        }
    }
}
