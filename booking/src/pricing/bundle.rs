//! Greedy bundle-discount allocator.
//!
//! Purchased units form a flat pool; offers are applied in descending
//! free-fraction order, each consuming whole groups of eligible units and
//! marking the cheapest units of every group free.

use std::collections::BTreeMap;

use crate::types::{BundleOffer, Money, OfferId, TicketId};

/// One purchasable unit in the pricing pool. A ticket bought at quantity N
/// expands to N units, each carrying the price in effect at booking time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolUnit {
    /// Tier this unit belongs to
    pub ticket_id: TicketId,
    /// Unit price at booking time
    pub price: Money,
}

/// Line-item summary of one offer that produced a discount
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AppliedOffer {
    /// Offer identity
    pub offer_id: OfferId,
    /// Offer display name
    pub name: String,
    /// Units given free
    pub free_units: u32,
    /// Total value of the freed units
    pub savings: Money,
}

/// Result of running the allocator over a unit pool
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BundleAllocation {
    /// Sum of all freed unit prices
    pub total_discount: Money,
    /// Freed value per ticket tier, for line-item display
    pub by_ticket: BTreeMap<TicketId, Money>,
    /// Per-offer summaries, in application order
    pub applied_offers: Vec<AppliedOffer>,
}

/// Runs the greedy allocation over `pool` with the event's offers.
///
/// Offers are ranked by free fraction `G / (B + G)` descending, so the
/// offer giving proportionally more away claims units first. Each offer
/// fills as many whole groups as its eligible remainder allows; the
/// cheapest units within those groups are freed. Consumed units, free and
/// paid alike, leave the pool and cannot feed a lower-ranked offer.
///
/// An offer that cannot fill a single group contributes nothing. No offers,
/// or no qualifying units, yields a zero allocation rather than an error.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn allocate(pool: &[PoolUnit], offers: &[BundleOffer]) -> BundleAllocation {
    let mut ranked: Vec<&BundleOffer> = offers
        .iter()
        .filter(|offer| offer.get_quantity > 0)
        .collect();

    // Free fractions compared by cross-multiplication to stay in integers;
    // the stable sort keeps input order on ties.
    ranked.sort_by(|a, b| {
        (u64::from(b.get_quantity) * u64::from(a.group_size()))
            .cmp(&(u64::from(a.get_quantity) * u64::from(b.group_size())))
    });

    let mut remaining: Vec<PoolUnit> = pool.to_vec();
    let mut allocation = BundleAllocation::default();

    for offer in ranked {
        let group_size = offer.group_size() as usize;

        let mut eligible: Vec<usize> = remaining
            .iter()
            .enumerate()
            .filter(|(_, unit)| offer.applies_to(unit.ticket_id))
            .map(|(index, _)| index)
            .collect();

        let sets = eligible.len() / group_size;
        if sets == 0 {
            continue;
        }

        // Cheapest-first ordering puts the free slots on the cheapest units
        eligible.sort_by_key(|&index| remaining[index].price);

        let consumed_count = sets * group_size;
        let free_count = sets * offer.get_quantity as usize;

        let mut savings = Money::ZERO;
        for &index in eligible.iter().take(free_count) {
            let unit = remaining[index];
            savings = savings.add(unit.price);
            let entry = allocation
                .by_ticket
                .entry(unit.ticket_id)
                .or_insert(Money::ZERO);
            *entry = entry.add(unit.price);
        }

        allocation.total_discount = allocation.total_discount.add(savings);
        allocation.applied_offers.push(AppliedOffer {
            offer_id: offer.id,
            name: offer.name.clone(),
            free_units: free_count as u32,
            savings,
        });

        // Whole groups leave the pool: the freed units and their paired
        // paid units alike.
        let consumed: Vec<usize> = eligible.into_iter().take(consumed_count).collect();
        remaining = remaining
            .into_iter()
            .enumerate()
            .filter_map(|(index, unit)| (!consumed.contains(&index)).then_some(unit))
            .collect();
    }

    allocation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventId, OfferType};
    use std::collections::HashSet;

    fn unit(ticket_id: TicketId, rupees: u64) -> PoolUnit {
        PoolUnit {
            ticket_id,
            price: Money::from_rupees(rupees),
        }
    }

    fn offer(
        name: &str,
        buy: u32,
        get: u32,
        restriction: Option<HashSet<TicketId>>,
    ) -> BundleOffer {
        BundleOffer {
            id: OfferId::new(),
            event_id: EventId::new(),
            name: name.to_string(),
            buy_quantity: buy,
            get_quantity: get,
            offer_type: OfferType::SameTier,
            restriction,
        }
    }

    #[test]
    fn gold_triple_fills_one_group() {
        let gold = TicketId::new();
        let pool = vec![unit(gold, 500), unit(gold, 500), unit(gold, 500)];
        let offers = vec![offer("Gold 2+1", 2, 1, Some(HashSet::from([gold])))];

        let allocation = allocate(&pool, &offers);

        assert_eq!(allocation.total_discount, Money::from_rupees(500));
        assert_eq!(allocation.applied_offers.len(), 1);
        assert_eq!(allocation.applied_offers[0].free_units, 1);
        assert_eq!(allocation.applied_offers[0].savings, Money::from_rupees(500));
        assert_eq!(
            allocation.by_ticket.get(&gold),
            Some(&Money::from_rupees(500))
        );
    }

    #[test]
    fn partial_group_contributes_nothing() {
        let gold = TicketId::new();
        let silver = TicketId::new();
        let pool = vec![unit(gold, 500), unit(gold, 500), unit(silver, 300)];
        let offers = vec![offer("Gold 2+1", 2, 1, Some(HashSet::from([gold])))];

        let allocation = allocate(&pool, &offers);

        assert_eq!(allocation.total_discount, Money::ZERO);
        assert!(allocation.applied_offers.is_empty());
        assert!(allocation.by_ticket.is_empty());
    }

    #[test]
    fn free_count_follows_floor_of_pool_over_group() {
        let gold = TicketId::new();
        // Seven eligible units, group size three: two full groups, two free
        let pool = vec![unit(gold, 500); 7];
        let offers = vec![offer("Gold 2+1", 2, 1, None)];

        let allocation = allocate(&pool, &offers);

        assert_eq!(allocation.applied_offers[0].free_units, 2);
        assert_eq!(allocation.total_discount, Money::from_rupees(1000));
    }

    #[test]
    fn cheapest_units_are_freed() {
        let gold = TicketId::new();
        let silver = TicketId::new();
        let pool = vec![unit(gold, 500), unit(silver, 300), unit(gold, 500)];
        let offers = vec![offer("Any 2+1", 2, 1, None)];

        let allocation = allocate(&pool, &offers);

        assert_eq!(allocation.total_discount, Money::from_rupees(300));
        assert_eq!(
            allocation.by_ticket.get(&silver),
            Some(&Money::from_rupees(300))
        );
        assert_eq!(allocation.by_ticket.get(&gold), None);
    }

    #[test]
    fn higher_free_fraction_claims_units_first() {
        let gold = TicketId::new();
        let pool = vec![unit(gold, 100); 4];
        // 1+1 frees half, 2+1 frees a third; the generous offer must win
        let offers = vec![
            offer("Stingy 2+1", 2, 1, None),
            offer("Generous 1+1", 1, 1, None),
        ];

        let allocation = allocate(&pool, &offers);

        assert_eq!(allocation.applied_offers.len(), 1);
        assert_eq!(allocation.applied_offers[0].name, "Generous 1+1");
        assert_eq!(allocation.applied_offers[0].free_units, 2);
        assert_eq!(allocation.total_discount, Money::from_rupees(200));
    }

    #[test]
    fn consumed_units_are_not_reused_by_later_offers() {
        let gold = TicketId::new();
        let silver = TicketId::new();
        // Gold-only 1+1 consumes both golds; the unrestricted 1+1 then only
        // sees the two silvers.
        let pool = vec![
            unit(gold, 500),
            unit(gold, 500),
            unit(silver, 300),
            unit(silver, 300),
        ];
        let offers = vec![
            offer("Gold 1+1", 1, 1, Some(HashSet::from([gold]))),
            offer("Any 1+1", 1, 1, None),
        ];

        let allocation = allocate(&pool, &offers);

        assert_eq!(allocation.applied_offers.len(), 2);
        assert_eq!(allocation.total_discount, Money::from_rupees(800));
        assert_eq!(
            allocation.by_ticket.get(&gold),
            Some(&Money::from_rupees(500))
        );
        assert_eq!(
            allocation.by_ticket.get(&silver),
            Some(&Money::from_rupees(300))
        );
    }

    #[test]
    fn no_offers_yields_zero_allocation() {
        let gold = TicketId::new();
        let pool = vec![unit(gold, 500); 3];

        let allocation = allocate(&pool, &[]);

        assert_eq!(allocation, BundleAllocation::default());
    }

    #[test]
    fn empty_pool_yields_zero_allocation() {
        let offers = vec![offer("Any 2+1", 2, 1, None)];

        let allocation = allocate(&[], &offers);

        assert_eq!(allocation.total_discount, Money::ZERO);
        assert!(allocation.applied_offers.is_empty());
    }

    #[test]
    fn offers_without_free_units_are_ignored() {
        let gold = TicketId::new();
        let pool = vec![unit(gold, 500); 3];
        let offers = vec![offer("Nothing free", 3, 0, None)];

        let allocation = allocate(&pool, &offers);

        assert_eq!(allocation.total_discount, Money::ZERO);
        assert!(allocation.applied_offers.is_empty());
    }
}
