//! In-memory and filesystem-backed provider implementations.
//!
//! The engine is storage-agnostic behind the [`crate::providers`] traits;
//! these implementations back the single-process deployment and every
//! integration test. Swapping in a database-backed catalog or registration
//! store means implementing the same traits elsewhere.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::effects::Notification;
use crate::error::BookingError;
use crate::providers::{
    ArtifactStore, CatalogStore, Notifier, PaymentLogStore, PaymentStore, ProviderFuture,
    RegistrationStore, TicketRenderer,
};
use crate::types::{
    BundleOffer, Coupon, CouponId, Event, EventId, FormField, OfferId, Payment, PaymentLogEntry,
    Registration, RegistrationId, Ticket, TicketId, TransactionId,
};

// ============================================================================
// Catalog
// ============================================================================

/// In-memory event catalog
#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalog {
    events: Arc<Mutex<HashMap<EventId, Event>>>,
    tickets: Arc<Mutex<HashMap<TicketId, Ticket>>>,
    offers: Arc<Mutex<HashMap<OfferId, BundleOffer>>>,
    coupons: Arc<Mutex<HashMap<CouponId, Coupon>>>,
    fields: Arc<Mutex<HashMap<EventId, Vec<FormField>>>>,
}

impl InMemoryCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an event
    pub fn insert_event(&self, event: Event) {
        if let Ok(mut events) = self.events.lock() {
            events.insert(event.id, event);
        }
    }

    /// Seed a ticket tier
    pub fn insert_ticket(&self, ticket: Ticket) {
        if let Ok(mut tickets) = self.tickets.lock() {
            tickets.insert(ticket.id, ticket);
        }
    }

    /// Seed a bundle offer
    pub fn insert_offer(&self, offer: BundleOffer) {
        if let Ok(mut offers) = self.offers.lock() {
            offers.insert(offer.id, offer);
        }
    }

    /// Seed a coupon
    pub fn insert_coupon(&self, coupon: Coupon) {
        if let Ok(mut coupons) = self.coupons.lock() {
            coupons.insert(coupon.id, coupon);
        }
    }

    /// Seed the custom form fields of an event
    pub fn set_form_fields(&self, event_id: EventId, form_fields: Vec<FormField>) {
        if let Ok(mut fields) = self.fields.lock() {
            fields.insert(event_id, form_fields);
        }
    }
}

impl CatalogStore for InMemoryCatalog {
    fn event(&self, event_id: EventId) -> ProviderFuture<Option<Event>> {
        let events = Arc::clone(&self.events);
        Box::pin(async move {
            Ok(events
                .lock()
                .map_err(|_| BookingError::Persistence("catalog lock poisoned".to_string()))?
                .get(&event_id)
                .cloned())
        })
    }

    fn tickets(&self, event_id: EventId) -> ProviderFuture<Vec<Ticket>> {
        let tickets = Arc::clone(&self.tickets);
        Box::pin(async move {
            Ok(tickets
                .lock()
                .map_err(|_| BookingError::Persistence("catalog lock poisoned".to_string()))?
                .values()
                .filter(|ticket| ticket.event_id == event_id)
                .cloned()
                .collect())
        })
    }

    fn offers(&self, event_id: EventId) -> ProviderFuture<Vec<BundleOffer>> {
        let offers = Arc::clone(&self.offers);
        Box::pin(async move {
            Ok(offers
                .lock()
                .map_err(|_| BookingError::Persistence("catalog lock poisoned".to_string()))?
                .values()
                .filter(|offer| offer.event_id == event_id)
                .cloned()
                .collect())
        })
    }

    fn form_fields(&self, event_id: EventId) -> ProviderFuture<Vec<FormField>> {
        let fields = Arc::clone(&self.fields);
        Box::pin(async move {
            Ok(fields
                .lock()
                .map_err(|_| BookingError::Persistence("catalog lock poisoned".to_string()))?
                .get(&event_id)
                .cloned()
                .unwrap_or_default())
        })
    }

    fn coupon(&self, coupon_id: CouponId) -> ProviderFuture<Option<Coupon>> {
        let coupons = Arc::clone(&self.coupons);
        Box::pin(async move {
            Ok(coupons
                .lock()
                .map_err(|_| BookingError::Persistence("catalog lock poisoned".to_string()))?
                .get(&coupon_id)
                .cloned())
        })
    }

    fn increment_sold(&self, counts: BTreeMap<TicketId, u32>) -> ProviderFuture<()> {
        let tickets = Arc::clone(&self.tickets);
        Box::pin(async move {
            let mut tickets = tickets
                .lock()
                .map_err(|_| BookingError::Persistence("catalog lock poisoned".to_string()))?;
            for (ticket_id, count) in counts {
                if let Some(ticket) = tickets.get_mut(&ticket_id) {
                    ticket.sold_count += count;
                }
            }
            Ok(())
        })
    }
}

// ============================================================================
// Registrations
// ============================================================================

/// In-memory registration store
#[derive(Clone, Debug, Default)]
pub struct InMemoryRegistrationStore {
    rows: Arc<Mutex<HashMap<RegistrationId, Registration>>>,
}

impl InMemoryRegistrationStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RegistrationStore for InMemoryRegistrationStore {
    fn find(&self, registration_id: RegistrationId) -> ProviderFuture<Option<Registration>> {
        let rows = Arc::clone(&self.rows);
        Box::pin(async move {
            Ok(rows
                .lock()
                .map_err(|_| BookingError::Persistence("registration lock poisoned".to_string()))?
                .get(&registration_id)
                .cloned())
        })
    }

    fn save(&self, registration: Registration) -> ProviderFuture<()> {
        let rows = Arc::clone(&self.rows);
        Box::pin(async move {
            rows.lock()
                .map_err(|_| BookingError::Persistence("registration lock poisoned".to_string()))?
                .insert(registration.id, registration);
            Ok(())
        })
    }

    fn attach_ticket_url(
        &self,
        registration_id: RegistrationId,
        url: String,
    ) -> ProviderFuture<()> {
        let rows = Arc::clone(&self.rows);
        Box::pin(async move {
            let mut rows = rows
                .lock()
                .map_err(|_| BookingError::Persistence("registration lock poisoned".to_string()))?;
            let registration = rows.get_mut(&registration_id).ok_or_else(|| {
                BookingError::not_found("registration", registration_id.as_uuid().to_string())
            })?;
            registration.ticket_url = Some(url);
            Ok(())
        })
    }
}

// ============================================================================
// Payments
// ============================================================================

/// In-memory payment store
#[derive(Clone, Debug, Default)]
pub struct InMemoryPaymentStore {
    rows: Arc<Mutex<HashMap<TransactionId, Payment>>>,
}

impl InMemoryPaymentStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PaymentStore for InMemoryPaymentStore {
    fn find(&self, transaction_id: &TransactionId) -> ProviderFuture<Option<Payment>> {
        let rows = Arc::clone(&self.rows);
        let transaction_id = transaction_id.clone();
        Box::pin(async move {
            Ok(rows
                .lock()
                .map_err(|_| BookingError::Persistence("payment lock poisoned".to_string()))?
                .get(&transaction_id)
                .cloned())
        })
    }

    fn find_by_gateway_reference(&self, reference: &str) -> ProviderFuture<Option<Payment>> {
        let rows = Arc::clone(&self.rows);
        let reference = reference.to_string();
        Box::pin(async move {
            Ok(rows
                .lock()
                .map_err(|_| BookingError::Persistence("payment lock poisoned".to_string()))?
                .values()
                .find(|payment| payment.gateway_reference.as_deref() == Some(reference.as_str()))
                .cloned())
        })
    }

    fn save(&self, payment: Payment) -> ProviderFuture<()> {
        let rows = Arc::clone(&self.rows);
        Box::pin(async move {
            rows.lock()
                .map_err(|_| BookingError::Persistence("payment lock poisoned".to_string()))?
                .insert(payment.transaction_id.clone(), payment);
            Ok(())
        })
    }
}

/// In-memory append-only payment audit log
#[derive(Clone, Debug, Default)]
pub struct InMemoryPaymentLog {
    entries: Arc<Mutex<Vec<PaymentLogEntry>>>,
}

impl InMemoryPaymentLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries, oldest first
    #[must_use]
    pub fn entries(&self) -> Vec<PaymentLogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl PaymentLogStore for InMemoryPaymentLog {
    fn append(&self, entry: PaymentLogEntry) -> ProviderFuture<()> {
        let entries = Arc::clone(&self.entries);
        Box::pin(async move {
            entries
                .lock()
                .map_err(|_| BookingError::Persistence("audit log lock poisoned".to_string()))?
                .push(entry);
            Ok(())
        })
    }
}

// ============================================================================
// Ticket issuance
// ============================================================================

/// Plain-text ticket renderer.
///
/// Produces a deterministic text artifact with the event name, attendee,
/// reference, and amount. A PDF renderer would slot in behind the same
/// trait.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextTicketRenderer;

impl TextTicketRenderer {
    /// Create a renderer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TicketRenderer for TextTicketRenderer {
    fn render(&self, registration: Registration, event: Event) -> ProviderFuture<Vec<u8>> {
        Box::pin(async move {
            let quantity: u32 = registration.tickets_bought.values().sum();
            let body = format!(
                "EVENT TICKET\n\
                 ============\n\
                 Event:     {}\n\
                 Attendee:  {}\n\
                 Reference: {}\n\
                 Tickets:   {}\n\
                 Paid:      {}\n",
                event.name,
                registration.attendee.first_name,
                registration.reference,
                quantity,
                registration.final_amount,
            );
            Ok(body.into_bytes())
        })
    }
}

/// Filesystem-backed artifact store.
///
/// Writes ticket artifacts under a root directory and returns URLs under a
/// configured public base.
#[derive(Clone, Debug)]
pub struct FileArtifactStore {
    root: PathBuf,
    public_base_url: String,
}

impl FileArtifactStore {
    /// Create a store writing under `root`, serving under `public_base_url`
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }
}

impl ArtifactStore for FileArtifactStore {
    fn store_ticket(
        &self,
        registration_id: RegistrationId,
        bytes: Vec<u8>,
    ) -> ProviderFuture<String> {
        let root = self.root.clone();
        let public_base_url = self.public_base_url.clone();
        Box::pin(async move {
            let file_name = format!("{}.txt", registration_id.as_uuid());
            tokio::fs::create_dir_all(&root).await.map_err(|err| {
                BookingError::Persistence(format!("failed to create ticket directory: {err}"))
            })?;
            tokio::fs::write(root.join(&file_name), bytes)
                .await
                .map_err(|err| {
                    BookingError::Persistence(format!("failed to write ticket artifact: {err}"))
                })?;
            Ok(format!(
                "{}/{file_name}",
                public_base_url.trim_end_matches('/')
            ))
        })
    }
}

// ============================================================================
// Notifications
// ============================================================================

/// Notifier that writes structured log lines instead of sending anything.
///
/// Stands in for the platform's mail/SMS pipeline in development; delivery
/// content is visible in the logs.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    /// Create a notifier
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Notifier for LogNotifier {
    fn send(&self, notification: Notification) -> ProviderFuture<()> {
        Box::pin(async move {
            tracing::info!(
                kind = notification.kind(),
                recipient = %notification.recipient(),
                registration_id = %notification.registration_id().as_uuid(),
                "Notification delivered (log only)"
            );
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{DiscountKind, EventStatus, Money};

    fn test_event() -> Event {
        Event {
            id: EventId::new(),
            name: "Winter Gala".to_string(),
            status: EventStatus::Published,
            requires_verification: false,
            registration_opens_at: None,
            registration_closes_at: None,
        }
    }

    #[tokio::test]
    async fn catalog_filters_tickets_by_event() {
        let catalog = InMemoryCatalog::new();
        let event = test_event();
        let other = test_event();

        catalog.insert_ticket(Ticket {
            id: TicketId::new(),
            event_id: event.id,
            name: "Gold".to_string(),
            price: Money::from_rupees(1000),
            quantity: None,
            sold_count: 0,
            discount: None,
            active: true,
            deleted: false,
        });
        catalog.insert_ticket(Ticket {
            id: TicketId::new(),
            event_id: other.id,
            name: "Silver".to_string(),
            price: Money::from_rupees(500),
            quantity: None,
            sold_count: 0,
            discount: None,
            active: true,
            deleted: false,
        });

        let tickets = catalog.tickets(event.id).await.unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].name, "Gold");
    }

    #[tokio::test]
    async fn coupon_lookup_by_id() {
        let catalog = InMemoryCatalog::new();
        let coupon_id = CouponId::new();
        catalog.insert_coupon(Coupon {
            id: coupon_id,
            event_id: EventId::new(),
            code: "EARLY10".to_string(),
            discount: DiscountKind::Percentage(10),
            usage_limit: None,
            used_count: 0,
            valid_from: None,
            valid_until: None,
            active: true,
        });

        let found = catalog.coupon(coupon_id).await.unwrap().unwrap();
        assert_eq!(found.code, "EARLY10");
        assert!(catalog.coupon(CouponId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn increment_sold_accumulates() {
        let catalog = InMemoryCatalog::new();
        let event_id = EventId::new();
        let ticket_id = TicketId::new();
        catalog.insert_ticket(Ticket {
            id: ticket_id,
            event_id,
            name: "Gold".to_string(),
            price: Money::from_rupees(1000),
            quantity: Some(100),
            sold_count: 5,
            discount: None,
            active: true,
            deleted: false,
        });

        let mut counts = BTreeMap::new();
        counts.insert(ticket_id, 3);
        catalog.increment_sold(counts).await.unwrap();

        let tickets = catalog.tickets(event_id).await.unwrap();
        assert_eq!(tickets[0].sold_count, 8);
    }

    #[tokio::test]
    async fn attach_ticket_url_requires_the_row() {
        let store = InMemoryRegistrationStore::new();
        let error = store
            .attach_ticket_url(RegistrationId::new(), "https://example.com/t.txt".to_string())
            .await
            .unwrap_err();
        assert!(matches!(error, BookingError::NotFound { .. }));
    }

    #[tokio::test]
    async fn payment_store_resolves_by_gateway_reference() {
        let store = InMemoryPaymentStore::new();
        let transaction_id = TransactionId::generate();
        store
            .save(Payment {
                transaction_id: transaction_id.clone(),
                registration_id: RegistrationId::new(),
                amount: Money::from_rupees(1000),
                status: crate::types::PaymentStatus::Pending,
                mode: None,
                gateway_reference: Some("GW42".to_string()),
                gateway_message: None,
                completed_at: None,
                created_at: chrono::Utc::now(),
            })
            .await
            .unwrap();

        let found = store.find_by_gateway_reference("GW42").await.unwrap();
        assert_eq!(found.unwrap().transaction_id, transaction_id);
        assert!(
            store
                .find_by_gateway_reference("GW43")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn text_renderer_includes_reference_and_amount() {
        let event = test_event();
        let registration = Registration {
            id: RegistrationId::new(),
            event_id: event.id,
            user_id: crate::types::UserId::new(),
            attendee: crate::types::Attendee {
                first_name: "Asha".to_string(),
                email: "asha@example.com".to_string(),
                phone: "9876543210".to_string(),
            },
            coupon_id: None,
            offer_id: None,
            tickets_bought: BTreeMap::new(),
            total_amount: Money::from_rupees(1000),
            final_amount: Money::from_rupees(900),
            payment_status: crate::types::PaymentStatus::Paid,
            is_waitlisted: false,
            is_verified: None,
            transaction_id: None,
            form_response: BTreeMap::new(),
            ticket_url: None,
            reference: "winter-gala-3k9f2".to_string(),
            deleted: false,
            created_at: chrono::Utc::now(),
        };

        let bytes = TextTicketRenderer::new()
            .render(registration, event)
            .await
            .unwrap();
        let body = String::from_utf8(bytes).unwrap();
        assert!(body.contains("winter-gala-3k9f2"));
        assert!(body.contains("Winter Gala"));
        assert!(body.contains("₹900.00"));
    }

    #[tokio::test]
    async fn file_artifact_store_writes_and_builds_url() {
        let root = std::env::temp_dir().join(format!("boxoffice-test-{}", uuid::Uuid::new_v4()));
        let store = FileArtifactStore::new(&root, "https://cdn.example.com/tickets/");
        let registration_id = RegistrationId::new();

        let url = store
            .store_ticket(registration_id, b"TICKET".to_vec())
            .await
            .unwrap();

        assert_eq!(
            url,
            format!(
                "https://cdn.example.com/tickets/{}.txt",
                registration_id.as_uuid()
            )
        );
        let written = tokio::fs::read(root.join(format!("{}.txt", registration_id.as_uuid())))
            .await
            .unwrap();
        assert_eq!(written, b"TICKET");

        tokio::fs::remove_dir_all(&root).await.ok();
    }
}
