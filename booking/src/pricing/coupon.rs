//! Coupon validation and discount overlay.
//!
//! Coupons apply after the bundle allocator: the discount is computed on
//! the bundle-adjusted subtotal and capped so the final amount never goes
//! negative.

use chrono::{DateTime, Utc};

use crate::error::{BookingError, Result};
use crate::types::{Coupon, DiscountKind, EventId, Money};

/// Checks a resolved coupon against its own state, scope, and window.
///
/// # Errors
///
/// Returns `CouponInvalid` when the coupon belongs to another event, is
/// switched off, is outside its validity window, or has reached its usage
/// limit.
pub fn validate(coupon: &Coupon, event_id: EventId, now: DateTime<Utc>) -> Result<()> {
    if coupon.event_id != event_id {
        return Err(BookingError::CouponInvalid {
            reason: "coupon does not belong to this event".to_string(),
        });
    }
    if !coupon.active {
        return Err(BookingError::CouponInvalid {
            reason: "coupon is not active".to_string(),
        });
    }
    if !coupon.in_window(now) {
        return Err(BookingError::CouponInvalid {
            reason: "coupon is outside its validity window".to_string(),
        });
    }
    if coupon.is_exhausted() {
        return Err(BookingError::CouponInvalid {
            reason: "coupon usage limit reached".to_string(),
        });
    }
    Ok(())
}

/// Discount produced by `kind` on the bundle-adjusted subtotal.
///
/// Percentage discounts round half-up at the paise level; flat discounts
/// are capped at the subtotal so the result can always be subtracted.
#[must_use]
pub fn discount_amount(kind: DiscountKind, subtotal_after_bundle: Money) -> Money {
    match kind {
        DiscountKind::Percentage(value) => subtotal_after_bundle.percent(value),
        DiscountKind::Flat(value) => value.min(subtotal_after_bundle),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::CouponId;
    use chrono::TimeZone;

    fn coupon(event_id: EventId, discount: DiscountKind) -> Coupon {
        Coupon {
            id: CouponId::new(),
            event_id,
            code: "EARLY10".to_string(),
            discount,
            usage_limit: None,
            used_count: 0,
            valid_from: None,
            valid_until: None,
            active: true,
        }
    }

    #[test]
    fn percentage_discount_on_adjusted_subtotal() {
        assert_eq!(
            discount_amount(DiscountKind::Percentage(10), Money::from_rupees(1300)),
            Money::from_rupees(130)
        );
    }

    #[test]
    fn percentage_discount_rounds_half_up() {
        // 10% of ₹12.55 rounds up to ₹1.26
        assert_eq!(
            discount_amount(DiscountKind::Percentage(10), Money::from_paise(1255)),
            Money::from_paise(126)
        );
    }

    #[test]
    fn flat_discount_capped_at_subtotal() {
        assert_eq!(
            discount_amount(
                DiscountKind::Flat(Money::from_rupees(200)),
                Money::from_rupees(150)
            ),
            Money::from_rupees(150)
        );
        assert_eq!(
            discount_amount(
                DiscountKind::Flat(Money::from_rupees(50)),
                Money::from_rupees(150)
            ),
            Money::from_rupees(50)
        );
    }

    #[test]
    fn validates_active_in_scope_coupon() {
        let event_id = EventId::new();
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        assert!(validate(&coupon(event_id, DiscountKind::Percentage(10)), event_id, now).is_ok());
    }

    #[test]
    fn rejects_foreign_event_coupon() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let foreign = coupon(EventId::new(), DiscountKind::Percentage(10));
        let error = validate(&foreign, EventId::new(), now).unwrap_err();
        assert!(matches!(error, BookingError::CouponInvalid { .. }));
    }

    #[test]
    fn rejects_inactive_coupon() {
        let event_id = EventId::new();
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let mut inactive = coupon(event_id, DiscountKind::Percentage(10));
        inactive.active = false;
        let error = validate(&inactive, event_id, now).unwrap_err();
        assert!(matches!(error, BookingError::CouponInvalid { .. }));
    }

    #[test]
    fn rejects_expired_coupon() {
        let event_id = EventId::new();
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let mut expired = coupon(event_id, DiscountKind::Percentage(10));
        expired.valid_until = Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
        let error = validate(&expired, event_id, now).unwrap_err();
        assert!(matches!(error, BookingError::CouponInvalid { .. }));
    }

    #[test]
    fn rejects_not_yet_valid_coupon() {
        let event_id = EventId::new();
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let mut early = coupon(event_id, DiscountKind::Percentage(10));
        early.valid_from = Some(Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap());
        let error = validate(&early, event_id, now).unwrap_err();
        assert!(matches!(error, BookingError::CouponInvalid { .. }));
    }

    #[test]
    fn rejects_exhausted_coupon() {
        let event_id = EventId::new();
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let mut spent = coupon(event_id, DiscountKind::Percentage(10));
        spent.usage_limit = Some(5);
        spent.used_count = 5;
        let error = validate(&spent, event_id, now).unwrap_err();
        assert!(matches!(error, BookingError::CouponInvalid { .. }));
    }
}
