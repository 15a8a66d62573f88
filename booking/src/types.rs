//! Core domain types for the booking engine.
//!
//! Identifiers are UUID newtypes, money is integer paise, and every boundary
//! shape (form fields, answers, payment modes) is a typed union rather than
//! loose JSON.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BookingError;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for events
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random event ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an event ID from an existing UUID
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for ticket tiers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TicketId(Uuid);

impl TicketId {
    /// Creates a new random ticket ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a ticket ID from an existing UUID
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for coupons
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CouponId(Uuid);

impl CouponId {
    /// Creates a new random coupon ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a coupon ID from an existing UUID
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CouponId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CouponId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for bundle offers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OfferId(Uuid);

impl OfferId {
    /// Creates a new random offer ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an offer ID from an existing UUID
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for OfferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for registrations (bookings)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationId(Uuid);

impl RegistrationId {
    /// Creates a new random registration ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a registration ID from an existing UUID
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RegistrationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for platform users
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user ID from an existing UUID
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gateway-facing transaction identifier.
///
/// One `TransactionId` keys exactly one Payment row and doubles as the
/// merchant reference sent to the payment gateway.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(String);

impl TransactionId {
    /// Creates a transaction ID from an existing reference string
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Generates a fresh transaction ID
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("txn_{}", Uuid::new_v4().simple()))
    }

    /// Returns the reference as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Money
// ============================================================================

/// Monetary amount in paise (1/100 rupee).
///
/// Integer arithmetic keeps amounts exact at two decimal places; percentage
/// discounts round half-up at the paise level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from paise
    #[must_use]
    pub const fn from_paise(paise: u64) -> Self {
        Self(paise)
    }

    /// Creates a `Money` value from whole rupees
    ///
    /// # Panics
    ///
    /// Panics if the conversion would overflow (rupees * 100 > `u64::MAX`).
    /// Use `checked_from_rupees` for non-panicking conversion.
    #[must_use]
    #[allow(clippy::panic)]
    pub const fn from_rupees(rupees: u64) -> Self {
        match rupees.checked_mul(100) {
            Some(paise) => Self(paise),
            None => panic!("Money::from_rupees overflow"),
        }
    }

    /// Creates a `Money` value from whole rupees with overflow checking
    #[must_use]
    pub const fn checked_from_rupees(rupees: u64) -> Option<Self> {
        match rupees.checked_mul(100) {
            Some(paise) => Some(Self(paise)),
            None => None,
        }
    }

    /// Returns the amount in paise
    #[must_use]
    pub const fn paise(&self) -> u64 {
        self.0
    }

    /// Returns the amount in whole rupees (rounded down)
    #[must_use]
    pub const fn rupees(&self) -> u64 {
        self.0 / 100
    }

    /// Returns the amount in rupees as a decimal value
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two money amounts with overflow checking
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Adds two money amounts
    ///
    /// # Panics
    ///
    /// Panics if the addition would overflow.
    /// Use `checked_add` for non-panicking addition.
    #[must_use]
    #[allow(clippy::panic)]
    pub const fn add(self, other: Self) -> Self {
        match self.checked_add(other) {
            Some(result) => result,
            None => panic!("Money::add overflow"),
        }
    }

    /// Subtracts two money amounts (returns None if result would be negative)
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        if self.0 >= other.0 {
            Some(Self(self.0 - other.0))
        } else {
            None
        }
    }

    /// Subtracts two money amounts, clamping at zero
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Multiplies money by a quantity with overflow checking
    #[must_use]
    pub const fn checked_multiply(self, quantity: u32) -> Option<Self> {
        match self.0.checked_mul(quantity as u64) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Multiplies money by a quantity
    ///
    /// # Panics
    ///
    /// Panics if the multiplication would overflow.
    /// Use `checked_multiply` for non-panicking multiplication.
    #[must_use]
    #[allow(clippy::panic)]
    pub const fn multiply(self, quantity: u32) -> Self {
        match self.checked_multiply(quantity) {
            Some(result) => result,
            None => panic!("Money::multiply overflow"),
        }
    }

    /// Computes a percentage of this amount, rounding half-up at the paise
    /// level, with overflow checking
    #[must_use]
    pub const fn checked_percent(self, percent: u32) -> Option<Self> {
        match self.0.checked_mul(percent as u64) {
            Some(product) => match product.checked_add(50) {
                Some(shifted) => Some(Self(shifted / 100)),
                None => None,
            },
            None => None,
        }
    }

    /// Computes a percentage of this amount, rounding half-up
    ///
    /// # Panics
    ///
    /// Panics if the calculation would overflow.
    /// Use `checked_percent` for non-panicking calculation.
    #[must_use]
    #[allow(clippy::panic)]
    pub const fn percent(self, percent: u32) -> Self {
        match self.checked_percent(percent) {
            Some(result) => result,
            None => panic!("Money::percent overflow"),
        }
    }

    /// Returns the smaller of two amounts
    #[must_use]
    pub const fn min(self, other: Self) -> Self {
        if self.0 <= other.0 { self } else { other }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{}.{:02}", self.rupees(), self.0 % 100)
    }
}

// ============================================================================
// Events
// ============================================================================

/// Lifecycle status of an event; governs the booking mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Not yet open for booking
    Draft,
    /// Open for paid booking
    Published,
    /// Collecting waitlist entries, no payment
    Waitlist,
    /// Cancelled by the organizer
    Cancelled,
    /// Already took place
    Completed,
}

impl EventStatus {
    /// Returns the status as a string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Waitlist => "waitlist",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ticketed event. Read-only to this engine; admin operations own mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event identity
    pub id: EventId,
    /// Display name, also the seed for registration references
    pub name: String,
    /// Lifecycle status
    pub status: EventStatus,
    /// Whether registrations need manual verification
    pub requires_verification: bool,
    /// Registration window open instant, informational to this engine
    pub registration_opens_at: Option<DateTime<Utc>>,
    /// Registration window close instant, informational to this engine
    pub registration_closes_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Tickets
// ============================================================================

/// Time-boxed promotional price on a ticket tier
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TicketDiscount {
    /// Price while the window is open
    pub price: Money,
    /// Window start (inclusive)
    pub starts_at: DateTime<Utc>,
    /// Window end (inclusive)
    pub ends_at: DateTime<Utc>,
}

impl TicketDiscount {
    /// Whether the discount window covers `now`
    #[must_use]
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        now >= self.starts_at && now <= self.ends_at
    }
}

/// A priced ticket tier belonging to one event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket identity
    pub id: TicketId,
    /// Owning event
    pub event_id: EventId,
    /// Tier name ("Gold", "Silver", ...)
    pub name: String,
    /// List price
    pub price: Money,
    /// Optional capacity; `None` means unlimited
    pub quantity: Option<u32>,
    /// Units sold so far
    pub sold_count: u32,
    /// Optional promotional window
    pub discount: Option<TicketDiscount>,
    /// Whether the tier is on sale
    pub active: bool,
    /// Soft-delete marker
    pub deleted: bool,
}

impl Ticket {
    /// Price in effect at `now`: the promotional price inside an open
    /// discount window, the list price otherwise
    #[must_use]
    pub fn effective_price(&self, now: DateTime<Utc>) -> Money {
        match &self.discount {
            Some(discount) if discount.is_open(now) => discount.price,
            _ => self.price,
        }
    }

    /// Read-check: whether `extra` more units fit under the capacity.
    /// Always true for uncapped tiers.
    #[must_use]
    pub fn has_capacity_for(&self, extra: u32) -> bool {
        self.quantity
            .is_none_or(|cap| self.sold_count.saturating_add(extra) <= cap)
    }
}

// ============================================================================
// Coupons
// ============================================================================

/// Discount shape carried by a coupon
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DiscountKind {
    /// Percentage of the bundle-adjusted subtotal
    Percentage(u32),
    /// Flat amount, capped at the bundle-adjusted subtotal
    Flat(Money),
}

/// A discount coupon scoped to one event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    /// Coupon identity
    pub id: CouponId,
    /// Owning event
    pub event_id: EventId,
    /// Unique code, stored uppercase; matching is case-insensitive
    pub code: String,
    /// Discount shape
    pub discount: DiscountKind,
    /// Optional redemption cap
    pub usage_limit: Option<u32>,
    /// Redemptions so far
    pub used_count: u32,
    /// Validity window start (inclusive)
    pub valid_from: Option<DateTime<Utc>>,
    /// Validity window end (inclusive)
    pub valid_until: Option<DateTime<Utc>>,
    /// Whether the coupon is switched on
    pub active: bool,
}

impl Coupon {
    /// Normalizes a raw code for storage and comparison
    #[must_use]
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Case-insensitive code comparison
    #[must_use]
    pub fn matches_code(&self, code: &str) -> bool {
        self.code == Self::normalize_code(code)
    }

    /// Whether the validity window covers `now`
    #[must_use]
    pub fn in_window(&self, now: DateTime<Utc>) -> bool {
        let opened = self.valid_from.is_none_or(|from| now >= from);
        let not_closed = self.valid_until.is_none_or(|until| now <= until);
        opened && not_closed
    }

    /// Whether the usage limit has been reached
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.usage_limit
            .is_some_and(|limit| self.used_count >= limit)
    }
}

// ============================================================================
// Bundle offers
// ============================================================================

/// Whether an offer groups units within one tier or across tiers.
///
/// Eligibility is carried entirely by the restriction set; the allocator
/// itself is tier-agnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferType {
    /// Groups form within a single tier
    SameTier,
    /// Groups may mix tiers
    CrossTier,
}

/// A "buy X get Y free" rule scoped to one event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BundleOffer {
    /// Offer identity
    pub id: OfferId,
    /// Owning event
    pub event_id: EventId,
    /// Display name for line-item summaries
    pub name: String,
    /// Units that must be paid for per group
    pub buy_quantity: u32,
    /// Units given free per group
    pub get_quantity: u32,
    /// Tier grouping flavor
    pub offer_type: OfferType,
    /// Eligible ticket tiers; `None` means all tiers
    pub restriction: Option<HashSet<TicketId>>,
}

impl BundleOffer {
    /// Units consumed per repeating group
    #[must_use]
    pub const fn group_size(&self) -> u32 {
        self.buy_quantity + self.get_quantity
    }

    /// Whether a unit of `ticket_id` is eligible under this offer
    #[must_use]
    pub fn applies_to(&self, ticket_id: TicketId) -> bool {
        self.restriction
            .as_ref()
            .is_none_or(|allowed| allowed.contains(&ticket_id))
    }
}

// ============================================================================
// Form fields
// ============================================================================

/// One selectable option of a dropdown/checkbox/radio field.
///
/// `triggers` names fields that become visible when this option is the
/// current answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    /// Stored option value
    pub value: String,
    /// Fields made visible by selecting this option
    #[serde(default)]
    pub triggers: Vec<String>,
}

/// Type-specific shape of a form field
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text input
    Text,
    /// Single choice from options; may trigger other fields
    Dropdown {
        /// Selectable options
        #[serde(default)]
        options: Vec<FieldOption>,
    },
    /// Multiple choice
    Checkbox {
        /// Selectable options
        #[serde(default)]
        options: Vec<FieldOption>,
    },
    /// Single choice rendered as radio buttons
    Radio {
        /// Selectable options
        #[serde(default)]
        options: Vec<FieldOption>,
    },
    /// Image upload
    Image,
}

/// Definition of one custom registration form field
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    /// Answer key in the form response
    pub name: String,
    /// Display label, used in validation messages
    pub label: String,
    /// Whether a visible instance must be answered
    #[serde(default)]
    pub required: bool,
    /// Hidden unless triggered by a dropdown answer
    #[serde(default)]
    pub hidden: bool,
    /// Type-specific shape
    #[serde(flatten)]
    pub kind: FieldKind,
}

/// A submitted answer for one form field.
///
/// Untagged so plain JSON scalars deserialize directly. Numeric `0` and
/// boolean `false` are valid non-blank answers; only empty text, empty
/// selections, and null are blank.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormAnswer {
    /// Boolean answer
    Flag(bool),
    /// Numeric answer
    Number(f64),
    /// Text answer (also dropdown/radio selections)
    Text(String),
    /// Multi-select answer
    Many(Vec<String>),
    /// Explicit null
    Empty,
}

impl FormAnswer {
    /// Whether this answer counts as blank for required-field checks
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Many(values) => values.is_empty(),
            Self::Empty => true,
            Self::Flag(_) | Self::Number(_) => false,
        }
    }

    /// The answer as text, when it is textual
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Submitted answers keyed by field name
pub type FormResponse = BTreeMap<String, FormAnswer>;

// ============================================================================
// Registrations
// ============================================================================

/// Payment progress of a registration or payment row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting a terminal gateway outcome
    Pending,
    /// Settled successfully
    Paid,
    /// Settled unsuccessfully
    Failed,
}

impl PaymentStatus {
    /// Returns the status as a string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }

    /// Whether this status is terminal
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Failed)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a booking is taken: paid checkout or waitlist entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingMode {
    /// Normal paid checkout
    Payment,
    /// Waitlist entry, no payment collected
    Waitlist,
}

impl BookingMode {
    /// Returns the mode as a string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Waitlist => "waitlist",
        }
    }
}

/// Attendee contact details captured at intake
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    /// Attendee name
    pub first_name: String,
    /// Contact email
    pub email: String,
    /// Ten-digit phone number
    pub phone: String,
}

/// The central booking record.
///
/// Created `pending` by the lifecycle reducer; settled to `paid`/`failed`
/// exactly once by reconciliation; soft-deletable only while unpaid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    /// Registration identity
    pub id: RegistrationId,
    /// Booked event
    pub event_id: EventId,
    /// Booking user
    pub user_id: UserId,
    /// Attendee contact details
    pub attendee: Attendee,
    /// Applied coupon, if any
    pub coupon_id: Option<CouponId>,
    /// Bundle offer the buyer selected, if any
    pub offer_id: Option<OfferId>,
    /// Booked quantities per ticket tier
    pub tickets_bought: BTreeMap<TicketId, u32>,
    /// Pre-discount subtotal
    pub total_amount: Money,
    /// Amount actually charged
    pub final_amount: Money,
    /// Payment progress
    pub payment_status: PaymentStatus,
    /// Waitlist flag
    pub is_waitlisted: bool,
    /// `None` when the event does not require verification
    pub is_verified: Option<bool>,
    /// Link to the active payment attempt
    pub transaction_id: Option<TransactionId>,
    /// Submitted custom form answers
    pub form_response: FormResponse,
    /// Issued ticket artifact URL, set once
    pub ticket_url: Option<String>,
    /// Human-readable unique reference
    pub reference: String,
    /// Soft-delete marker
    pub deleted: bool,
    /// Creation instant
    pub created_at: DateTime<Utc>,
}

impl Registration {
    /// Whether a direct cancel is still allowed
    #[must_use]
    pub const fn can_cancel(&self) -> bool {
        !self.deleted && matches!(self.payment_status, PaymentStatus::Pending)
    }

    /// Whether payment can be initiated for this registration
    #[must_use]
    pub const fn is_payable(&self) -> bool {
        !self.deleted && !self.is_waitlisted && matches!(self.payment_status, PaymentStatus::Pending | PaymentStatus::Failed)
    }
}

/// Generates a human-readable registration reference: the event name
/// sanitized and truncated, plus a random suffix for uniqueness.
#[must_use]
pub fn generate_reference(event_name: &str) -> String {
    let prefix: String = event_name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(10)
        .collect::<String>()
        .to_uppercase();
    let prefix = if prefix.is_empty() {
        "EVENT".to_string()
    } else {
        prefix
    };

    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|byte| (byte as char).to_ascii_uppercase())
        .collect();

    format!("{prefix}-{suffix}")
}

// ============================================================================
// Payments
// ============================================================================

/// Normalized payment instrument vocabulary
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    /// UPI transfer
    Upi,
    /// Net banking
    NetBanking,
    /// Debit card
    DebitCard,
    /// Credit card
    CreditCard,
    /// Wallet balance
    Wallet,
    /// Anything the provider reports outside the known set
    Other,
}

impl PaymentMode {
    /// Normalizes a provider-reported mode code
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "upi" => Self::Upi,
            "net_banking" | "netbanking" | "nb" => Self::NetBanking,
            "debit_card" | "debitcard" | "dc" => Self::DebitCard,
            "credit_card" | "creditcard" | "cc" => Self::CreditCard,
            "wallet" => Self::Wallet,
            _ => Self::Other,
        }
    }

    /// Returns the mode as a string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Upi => "upi",
            Self::NetBanking => "net_banking",
            Self::DebitCard => "debit_card",
            Self::CreditCard => "credit_card",
            Self::Wallet => "wallet",
            Self::Other => "other",
        }
    }
}

/// One payment attempt against a registration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Merchant transaction reference, also the gateway's external reference
    pub transaction_id: TransactionId,
    /// Registration being paid for
    pub registration_id: RegistrationId,
    /// Amount charged
    pub amount: Money,
    /// Settlement progress
    pub status: PaymentStatus,
    /// Instrument used, known after the gateway reports back
    pub mode: Option<PaymentMode>,
    /// The provider's own reference, known after the first callback
    pub gateway_reference: Option<String>,
    /// Last gateway-reported message
    pub gateway_message: Option<String>,
    /// Terminal settlement instant
    pub completed_at: Option<DateTime<Utc>>,
    /// Row creation instant
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Aggregate state
// ============================================================================

/// State for the registration lifecycle aggregate
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegistrationState {
    /// Registrations indexed by ID
    pub registrations: HashMap<RegistrationId, Registration>,
    /// Last validation error
    pub last_error: Option<BookingError>,
}

impl RegistrationState {
    /// Creates a new empty `RegistrationState`
    #[must_use]
    pub fn new() -> Self {
        Self {
            registrations: HashMap::new(),
            last_error: None,
        }
    }

    /// Gets a registration by ID
    #[must_use]
    pub fn get(&self, id: &RegistrationId) -> Option<&Registration> {
        self.registrations.get(id)
    }

    /// Checks if a registration exists
    #[must_use]
    pub fn exists(&self, id: &RegistrationId) -> bool {
        self.registrations.contains_key(id)
    }

    /// Returns the number of registrations
    #[must_use]
    pub fn count(&self) -> usize {
        self.registrations.len()
    }
}

impl Default for RegistrationState {
    fn default() -> Self {
        Self::new()
    }
}

/// State for the payment settlement aggregate
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SettlementState {
    /// Payment attempts indexed by transaction ID
    pub payments: HashMap<TransactionId, Payment>,
    /// Registrations indexed by ID
    pub registrations: HashMap<RegistrationId, Registration>,
    /// Last validation error
    pub last_error: Option<BookingError>,
}

impl SettlementState {
    /// Creates a new empty `SettlementState`
    #[must_use]
    pub fn new() -> Self {
        Self {
            payments: HashMap::new(),
            registrations: HashMap::new(),
            last_error: None,
        }
    }

    /// Gets a payment by transaction ID
    #[must_use]
    pub fn payment(&self, id: &TransactionId) -> Option<&Payment> {
        self.payments.get(id)
    }

    /// Gets a registration by ID
    #[must_use]
    pub fn registration(&self, id: &RegistrationId) -> Option<&Registration> {
        self.registrations.get(id)
    }

    /// Resolves a payment by transaction ID or gateway reference.
    /// Either identifier is sufficient; the transaction ID wins when both
    /// are present.
    #[must_use]
    pub fn find_payment(
        &self,
        transaction_id: Option<&TransactionId>,
        gateway_reference: Option<&str>,
    ) -> Option<&Payment> {
        if let Some(id) = transaction_id {
            if let Some(payment) = self.payments.get(id) {
                return Some(payment);
            }
        }
        gateway_reference.and_then(|reference| {
            self.payments
                .values()
                .find(|payment| payment.gateway_reference.as_deref() == Some(reference))
        })
    }
}

impl Default for SettlementState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Audit trail
// ============================================================================

/// Kind of gateway interaction being audited
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Outbound initiate request payload
    InitiateRequest,
    /// Gateway response to an initiate request
    InitiateResponse,
    /// Inbound provider callback
    Callback,
    /// Explicit transaction status poll
    StatusCheck,
}

impl AuditAction {
    /// Returns the action as a string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InitiateRequest => "initiate_request",
            Self::InitiateResponse => "initiate_response",
            Self::Callback => "callback",
            Self::StatusCheck => "status_check",
        }
    }
}

/// One append-only audit row recording a gateway interaction verbatim
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentLogEntry {
    /// Row identity
    pub id: Uuid,
    /// Related transaction, when known
    pub transaction_id: Option<TransactionId>,
    /// Interaction kind
    pub action: AuditAction,
    /// HTTP status involved, when applicable
    pub http_status: Option<u16>,
    /// Gateway-reported status text, when applicable
    pub gateway_status: Option<String>,
    /// Verbatim payload
    pub payload: serde_json::Value,
    /// Insertion instant
    pub at: DateTime<Utc>,
}

impl PaymentLogEntry {
    /// Builds an audit row stamped `at`
    #[must_use]
    pub fn new(
        transaction_id: Option<TransactionId>,
        action: AuditAction,
        http_status: Option<u16>,
        gateway_status: Option<String>,
        payload: serde_json::Value,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            transaction_id,
            action,
            http_status,
            gateway_status,
            payload,
            at,
        }
    }
}
