//! Property-based tests for the pricing pipeline.
//!
//! Generates unit pools, offers, and coupons and checks the allocator's
//! group arithmetic, cheapest-first freeing, and the breakdown's
//! accounting identities.
//!
//! Run with: `cargo test --test pricing_properties`

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use boxoffice_booking::pricing::coupon::discount_amount;
use boxoffice_booking::pricing::{PoolUnit, allocate, price_booking};
use boxoffice_booking::types::{
    BundleOffer, Coupon, CouponId, DiscountKind, EventId, Money, OfferId, OfferType, TicketId,
};
use proptest::prelude::*;

fn offer(buy: u32, get: u32, restriction: Option<HashSet<TicketId>>) -> BundleOffer {
    BundleOffer {
        id: OfferId::new(),
        event_id: EventId::new(),
        name: "Offer".to_string(),
        buy_quantity: buy,
        get_quantity: get,
        offer_type: OfferType::SameTier,
        restriction,
    }
}

fn coupon(event_id: EventId, discount: DiscountKind) -> Coupon {
    Coupon {
        id: CouponId::new(),
        event_id,
        code: "PROP".to_string(),
        discount,
        usage_limit: None,
        used_count: 0,
        valid_from: None,
        valid_until: None,
        active: true,
    }
}

/// Units as (tier index, whole-rupee price) pairs, up to three tiers.
fn units_strategy() -> impl Strategy<Value = Vec<(u8, u64)>> {
    prop::collection::vec((0u8..3, 1u64..=500), 0..24)
}

fn build_pool(units: &[(u8, u64)], tiers: &[TicketId; 3]) -> Vec<PoolUnit> {
    units
        .iter()
        .map(|&(tier, price)| PoolUnit {
            ticket_id: tiers[tier as usize],
            price: Money::from_rupees(price),
        })
        .collect()
}

proptest! {
    #[test]
    fn free_units_follow_group_arithmetic(
        count in 0usize..30,
        price in 1u64..=500,
        buy in 1u32..5,
        get in 1u32..4,
    ) {
        let tier = TicketId::new();
        let pool = vec![
            PoolUnit {
                ticket_id: tier,
                price: Money::from_rupees(price),
            };
            count
        ];

        let allocation = allocate(&pool, &[offer(buy, get, None)]);

        let group = (buy + get) as usize;
        let expected_free = (count / group) * get as usize;
        prop_assert_eq!(
            allocation.total_discount,
            Money::from_rupees(price).multiply(u32::try_from(expected_free).unwrap())
        );
        if expected_free == 0 {
            prop_assert!(allocation.applied_offers.is_empty());
        } else {
            prop_assert_eq!(
                allocation.applied_offers[0].free_units,
                u32::try_from(expected_free).unwrap()
            );
        }
    }

    #[test]
    fn cheapest_eligible_units_are_freed(
        prices in prop::collection::vec(1u64..=500, 1..24),
        buy in 1u32..5,
        get in 1u32..4,
    ) {
        let tier = TicketId::new();
        let pool: Vec<PoolUnit> = prices
            .iter()
            .map(|&price| PoolUnit {
                ticket_id: tier,
                price: Money::from_rupees(price),
            })
            .collect();

        let allocation = allocate(&pool, &[offer(buy, get, None)]);

        let group = (buy + get) as usize;
        let free = (pool.len() / group) * get as usize;
        let mut sorted = prices;
        sorted.sort_unstable();
        let expected: u64 = sorted.iter().take(free).map(|&price| price * 100).sum();
        prop_assert_eq!(allocation.total_discount.paise(), expected);
    }

    #[test]
    fn restricted_offer_frees_only_its_tier(
        units in units_strategy(),
        buy in 1u32..4,
        get in 1u32..3,
    ) {
        let tiers = [TicketId::new(), TicketId::new(), TicketId::new()];
        let pool = build_pool(&units, &tiers);
        let restricted = offer(buy, get, Some(HashSet::from([tiers[0]])));

        let allocation = allocate(&pool, &[restricted]);

        prop_assert!(allocation.by_ticket.keys().all(|&tier| tier == tiers[0]));
    }

    #[test]
    fn breakdown_accounting_stays_in_bounds(
        units in units_strategy(),
        offer_specs in prop::collection::vec((1u32..4, 1u32..3, prop::option::of(0u8..3)), 0..3),
        coupon_spec in prop::option::of(prop_oneof![
            (1u32..=100).prop_map(DiscountKind::Percentage),
            (1u64..=2000).prop_map(|rupees| DiscountKind::Flat(Money::from_rupees(rupees))),
        ]),
    ) {
        let event_id = EventId::new();
        let tiers = [TicketId::new(), TicketId::new(), TicketId::new()];
        let pool = build_pool(&units, &tiers);
        let offers: Vec<BundleOffer> = offer_specs
            .iter()
            .map(|&(buy, get, restriction)| {
                let mut built = offer(buy, get, restriction.map(|tier| {
                    HashSet::from([tiers[tier as usize]])
                }));
                built.event_id = event_id;
                built
            })
            .collect();
        let applied_coupon = coupon_spec.map(|discount| coupon(event_id, discount));

        let pricing = price_booking(
            &pool,
            &offers,
            applied_coupon.as_ref(),
            event_id,
            chrono::Utc::now(),
        )
        .unwrap();

        let subtotal: u64 = pool.iter().map(|unit| unit.price.paise()).sum();
        prop_assert_eq!(pricing.subtotal.paise(), subtotal);
        prop_assert!(pricing.bundle_discount.paise() <= subtotal);

        // The coupon overlays the bundle-adjusted subtotal and never
        // pushes the final amount negative
        let after_bundle = subtotal - pricing.bundle_discount.paise();
        prop_assert!(pricing.coupon_discount.paise() <= after_bundle);
        prop_assert_eq!(
            pricing.final_amount.paise(),
            after_bundle - pricing.coupon_discount.paise()
        );
        prop_assert!(pricing.final_amount.paise() <= subtotal);

        // Line items reconcile with the headline discount
        let by_ticket: u64 = pricing.by_ticket.values().map(|value| value.paise()).sum();
        prop_assert_eq!(by_ticket, pricing.bundle_discount.paise());
        let by_offer: u64 = pricing
            .applied_offers
            .iter()
            .map(|applied| applied.savings.paise())
            .sum();
        prop_assert_eq!(by_offer, pricing.bundle_discount.paise());
    }

    #[test]
    fn percentage_discount_rounds_half_up(
        paise in 0u64..=5_000_000,
        percent in 0u32..=100,
    ) {
        let discount =
            discount_amount(DiscountKind::Percentage(percent), Money::from_paise(paise));
        prop_assert_eq!(discount.paise(), (paise * u64::from(percent) + 50) / 100);
    }

    #[test]
    fn flat_discount_caps_at_the_subtotal(
        paise in 0u64..=5_000_000,
        value in 0u64..=10_000_000,
    ) {
        let discount =
            discount_amount(DiscountKind::Flat(Money::from_paise(value)), Money::from_paise(paise));
        prop_assert_eq!(discount.paise(), value.min(paise));
    }
}
