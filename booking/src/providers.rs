//! Provider traits for the booking engine.
//!
//! Everything the services and the effect dispatcher touch outside of pure
//! reducer state sits behind one of these traits: catalog reads, row
//! persistence, the payment audit log, ticket rendering and storage, and
//! outbound notifications. All traits are dyn-compatible so the application
//! wires them as `Arc<dyn …>`; implementations return owned data through
//! boxed futures.
//!
//! The in-memory implementations live in [`crate::stores`]; recording test
//! doubles live in [`crate::mocks`].

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use crate::effects::Notification;
use crate::error::Result;
use crate::types::{
    BundleOffer, Coupon, CouponId, Event, EventId, FormField, Payment, PaymentLogEntry,
    Registration, RegistrationId, Ticket, TicketId, TransactionId,
};

/// Boxed future returned by every provider method
pub type ProviderFuture<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;

// ============================================================================
// Catalog
// ============================================================================

/// Read side of the event catalog, plus the sold counters bookings advance.
///
/// The catalog is owned by the event-management system; this engine reads
/// snapshots and bumps sold counters at booking creation.
pub trait CatalogStore: Send + Sync {
    /// Load an event snapshot
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the read fails
    fn event(&self, event_id: EventId) -> ProviderFuture<Option<Event>>;

    /// Load all ticket tiers of an event, including inactive and deleted ones
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the read fails
    fn tickets(&self, event_id: EventId) -> ProviderFuture<Vec<Ticket>>;

    /// Load the bundle offers configured for an event
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the read fails
    fn offers(&self, event_id: EventId) -> ProviderFuture<Vec<BundleOffer>>;

    /// Load the custom form fields configured for an event, in display order
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the read fails
    fn form_fields(&self, event_id: EventId) -> ProviderFuture<Vec<FormField>>;

    /// Load a coupon by id
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the read fails
    fn coupon(&self, coupon_id: CouponId) -> ProviderFuture<Option<Coupon>>;

    /// Advance sold counters for the given quantities
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the write fails
    fn increment_sold(&self, counts: BTreeMap<TicketId, u32>) -> ProviderFuture<()>;
}

// ============================================================================
// Registrations
// ============================================================================

/// Registration row persistence
pub trait RegistrationStore: Send + Sync {
    /// Load a registration by id, soft-deleted rows included
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the read fails
    fn find(&self, registration_id: RegistrationId) -> ProviderFuture<Option<Registration>>;

    /// Insert or replace a registration row
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the write fails
    fn save(&self, registration: Registration) -> ProviderFuture<()>;

    /// Attach an issued ticket URL to a registration, overwriting in place
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the write fails, `NotFound` if the row is
    /// missing
    fn attach_ticket_url(
        &self,
        registration_id: RegistrationId,
        url: String,
    ) -> ProviderFuture<()>;
}

// ============================================================================
// Payments
// ============================================================================

/// Payment row persistence
pub trait PaymentStore: Send + Sync {
    /// Load a payment by merchant transaction reference
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the read fails
    fn find(&self, transaction_id: &TransactionId) -> ProviderFuture<Option<Payment>>;

    /// Load a payment by the provider's own reference
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the read fails
    fn find_by_gateway_reference(&self, reference: &str) -> ProviderFuture<Option<Payment>>;

    /// Insert or replace a payment row
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the write fails
    fn save(&self, payment: Payment) -> ProviderFuture<()>;
}

/// Append-only audit trail of gateway interactions.
///
/// Every initiate request, initiate response, callback, and status check
/// lands here verbatim before any interpretation. Rows are never updated or
/// deleted.
pub trait PaymentLogStore: Send + Sync {
    /// Append one interaction record
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the write fails
    fn append(&self, entry: PaymentLogEntry) -> ProviderFuture<()>;
}

// ============================================================================
// Ticket issuance
// ============================================================================

/// Renders a ticket artifact for a paid registration
pub trait TicketRenderer: Send + Sync {
    /// Produce the ticket artifact bytes
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if rendering fails
    fn render(&self, registration: Registration, event: Event) -> ProviderFuture<Vec<u8>>;
}

/// Stores rendered ticket artifacts and hands back a public URL
pub trait ArtifactStore: Send + Sync {
    /// Persist the artifact, overwriting any prior one for the registration
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the write fails
    fn store_ticket(
        &self,
        registration_id: RegistrationId,
        bytes: Vec<u8>,
    ) -> ProviderFuture<String>;
}

// ============================================================================
// Notifications
// ============================================================================

/// Delivers outbound notifications to attendees
pub trait Notifier: Send + Sync {
    /// Deliver one notification
    ///
    /// # Errors
    ///
    /// Returns `Gateway` if delivery fails
    fn send(&self, notification: Notification) -> ProviderFuture<()>;
}
