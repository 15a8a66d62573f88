//! Pricing pipeline: unit expansion, bundle allocation, coupon overlay.
//!
//! The pipeline is pure given a catalog snapshot and a clock instant, so
//! every price a caller sees can be recomputed and audited.

pub mod bundle;
pub mod coupon;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use bundle::{AppliedOffer, BundleAllocation, PoolUnit, allocate};

use crate::error::{BookingError, Result};
use crate::types::{BundleOffer, Coupon, EventId, Money, Ticket, TicketId};

/// Fully itemized price of a booking
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    /// Sum of all unit prices before any discount
    pub subtotal: Money,
    /// Value freed by bundle offers
    pub bundle_discount: Money,
    /// Value removed by the coupon overlay
    pub coupon_discount: Money,
    /// Amount the buyer pays
    pub final_amount: Money,
    /// Bundle savings per ticket tier
    pub by_ticket: BTreeMap<TicketId, Money>,
    /// Offers that produced savings, in application order
    pub applied_offers: Vec<AppliedOffer>,
}

impl PricingBreakdown {
    /// A zero breakdown, used by waitlist bookings that carry no charge
    #[must_use]
    pub fn zero() -> Self {
        Self {
            subtotal: Money::ZERO,
            bundle_discount: Money::ZERO,
            coupon_discount: Money::ZERO,
            final_amount: Money::ZERO,
            by_ticket: BTreeMap::new(),
            applied_offers: Vec::new(),
        }
    }

    /// Combined bundle and coupon discount
    #[must_use]
    pub fn total_discount(&self) -> Money {
        self.bundle_discount.add(self.coupon_discount)
    }
}

/// Expands booked quantities into the per-unit pricing pool.
///
/// Each unit carries the price in effect at `now`, honoring any open
/// promotional window. Capacity is read-checked here; the check is not
/// atomic with the later sold-count increment.
///
/// # Errors
///
/// Returns `NotFound` for ticket ids absent from the catalog (soft-deleted
/// tiers included) and `StateConflict` for tiers that are off sale or
/// cannot seat the requested quantity.
pub fn expand_units(
    tickets_bought: &BTreeMap<TicketId, u32>,
    catalog: &[Ticket],
    now: DateTime<Utc>,
) -> Result<Vec<PoolUnit>> {
    let mut pool = Vec::new();

    for (&ticket_id, &quantity) in tickets_bought {
        if quantity == 0 {
            continue;
        }

        let ticket = catalog
            .iter()
            .find(|ticket| ticket.id == ticket_id && !ticket.deleted)
            .ok_or_else(|| BookingError::not_found("ticket", ticket_id.to_string()))?;

        if !ticket.active {
            return Err(BookingError::conflict(format!(
                "Ticket \"{}\" is not on sale",
                ticket.name
            )));
        }
        if !ticket.has_capacity_for(quantity) {
            return Err(BookingError::conflict(format!(
                "Not enough \"{}\" tickets available",
                ticket.name
            )));
        }

        let price = ticket.effective_price(now);
        pool.extend(std::iter::repeat_n(PoolUnit { ticket_id, price }, quantity as usize));
    }

    Ok(pool)
}

/// Prices a unit pool end to end: subtotal, bundle allocation, coupon
/// overlay, final amount.
///
/// The final amount is `max(0, subtotal - bundle - coupon)`; it can never
/// exceed the subtotal and never goes negative.
///
/// # Errors
///
/// Returns `CouponInvalid` when a coupon is supplied and fails validation.
pub fn price_booking(
    pool: &[PoolUnit],
    offers: &[BundleOffer],
    coupon: Option<&Coupon>,
    event_id: EventId,
    now: DateTime<Utc>,
) -> Result<PricingBreakdown> {
    let subtotal = pool
        .iter()
        .fold(Money::ZERO, |total, unit| total.add(unit.price));

    let allocation = allocate(pool, offers);
    let after_bundle = subtotal.saturating_sub(allocation.total_discount);

    let coupon_discount = match coupon {
        Some(coupon) => {
            coupon::validate(coupon, event_id, now)?;
            coupon::discount_amount(coupon.discount, after_bundle)
        }
        None => Money::ZERO,
    };

    Ok(PricingBreakdown {
        subtotal,
        bundle_discount: allocation.total_discount,
        coupon_discount,
        final_amount: after_bundle.saturating_sub(coupon_discount),
        by_ticket: allocation.by_ticket,
        applied_offers: allocation.applied_offers,
    })
}
