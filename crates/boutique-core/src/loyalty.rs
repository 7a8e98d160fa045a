//! # Loyalty Points
//!
//! The boutique's points program.
//!
//! ## Program Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  EARN     1 point per ₹100 of subtotal (1%, rounded down)              │
//! │  REDEEM   1 point = ₹1 off the bill                                    │
//! │  CAP      at most 20% of the subtotal may be paid with points          │
//! │  FLOOR    a balance never goes below zero                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Earn rate and cap are applied by the billing screen (see
//! [`crate::pricing`]); checkout only enforces the floor, through
//! [`LoyaltyAdjustment::apply`].

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

/// Points earned per sale, in basis points of the subtotal (100 = 1%).
pub const EARN_RATE_BPS: u32 = 100;

/// Share of the subtotal payable with points, in basis points (2000 = 20%).
pub const REDEEM_CAP_BPS: u32 = 2000;

/// Value of one point.
pub const POINT_VALUE: Money = Money::from_rupees(1);

/// Points earned on a subtotal.
///
/// ## Example
/// ```rust
/// use boutique_core::loyalty::points_earned;
/// use boutique_core::money::Money;
///
/// assert_eq!(points_earned(Money::from_rupees(1000)), 10);
/// assert_eq!(points_earned(Money::from_rupees(199)), 1);
/// ```
pub fn points_earned(subtotal: Money) -> i64 {
    if !subtotal.is_positive() {
        return 0;
    }
    subtotal.percentage_floor(EARN_RATE_BPS).paise() / POINT_VALUE.paise()
}

/// Most points a customer with `balance` may redeem against `subtotal`.
///
/// ## Example
/// ```rust
/// use boutique_core::loyalty::max_redeemable;
/// use boutique_core::money::Money;
///
/// // 20% of ₹1000 = 200 points, but only 50 in the balance
/// assert_eq!(max_redeemable(50, Money::from_rupees(1000)), 50);
/// assert_eq!(max_redeemable(500, Money::from_rupees(1000)), 200);
/// ```
pub fn max_redeemable(balance: i64, subtotal: Money) -> i64 {
    if balance <= 0 || !subtotal.is_positive() {
        return 0;
    }
    let cap = subtotal.percentage_floor(REDEEM_CAP_BPS).paise() / POINT_VALUE.paise();
    balance.min(cap)
}

/// Discount value of a number of points.
#[inline]
pub fn points_value(points: i64) -> Money {
    POINT_VALUE * points
}

/// A balance change requested by one checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoyaltyAdjustment {
    pub redeemed: i64,
    pub earned: i64,
}

impl LoyaltyAdjustment {
    pub fn new(redeemed: i64, earned: i64) -> Self {
        LoyaltyAdjustment { redeemed, earned }
    }

    /// Net change to the balance: `earned - redeemed`.
    #[inline]
    pub fn delta(&self) -> i64 {
        self.earned - self.redeemed
    }

    /// True when the checkout neither redeems nor earns anything.
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.redeemed == 0 && self.earned == 0
    }

    /// Applies the adjustment to a balance.
    ///
    /// ## Rule
    /// Redemption is checked against the balance held *before* this sale's
    /// earnings are credited; points earned on a bill cannot pay for it.
    /// An earn that would push the balance past `i64::MAX` is rejected
    /// as out of range.
    ///
    /// ## Example
    /// ```rust
    /// use boutique_core::loyalty::LoyaltyAdjustment;
    ///
    /// let adj = LoyaltyAdjustment::new(30, 10);
    /// assert_eq!(adj.apply(7, 50).unwrap(), 30);
    /// assert!(LoyaltyAdjustment::new(80, 0).apply(7, 50).is_err());
    /// ```
    pub fn apply(&self, customer_id: i64, balance: i64) -> CoreResult<i64> {
        if self.redeemed > balance {
            return Err(CoreError::InsufficientPoints {
                customer_id,
                available: balance,
                requested: self.redeemed,
            });
        }
        let remaining = balance - self.redeemed;
        remaining.checked_add(self.earned).ok_or_else(|| {
            ValidationError::OutOfRange {
                field: "loyaltyPointsEarned".to_string(),
                min: 0,
                max: i64::MAX - remaining,
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_earned_rounds_down() {
        assert_eq!(points_earned(Money::from_paise(9_999)), 0);
        assert_eq!(points_earned(Money::from_paise(10_000)), 1);
        assert_eq!(points_earned(Money::from_paise(109_999)), 10);
        assert_eq!(points_earned(Money::zero()), 0);
    }

    #[test]
    fn test_max_redeemable_cap() {
        assert_eq!(max_redeemable(0, Money::from_rupees(1000)), 0);
        assert_eq!(max_redeemable(1000, Money::from_rupees(999)), 199);
        assert_eq!(max_redeemable(10, Money::zero()), 0);
    }

    #[test]
    fn test_apply_conserves_points() {
        let adj = LoyaltyAdjustment::new(20, 15);
        assert_eq!(adj.delta(), -5);
        assert_eq!(adj.apply(1, 50).unwrap(), 45);
    }

    #[test]
    fn test_apply_allows_redeeming_entire_balance() {
        assert_eq!(LoyaltyAdjustment::new(50, 0).apply(1, 50).unwrap(), 0);
    }

    #[test]
    fn test_apply_rejects_overdraw_even_with_earnings() {
        // 60 redeemed against 50 held; the 20 earned on this bill don't count
        let err = LoyaltyAdjustment::new(60, 20).apply(7, 50).unwrap_err();
        match err {
            CoreError::InsufficientPoints {
                customer_id,
                available,
                requested,
            } => {
                assert_eq!(customer_id, 7);
                assert_eq!(available, 50);
                assert_eq!(requested, 60);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_apply_rejects_balance_overflow() {
        let err = LoyaltyAdjustment::new(0, i64::MAX).apply(7, 50).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { ref field, max, .. })
                if field == "loyaltyPointsEarned" && max == i64::MAX - 50
        ));
    }

    #[test]
    fn test_points_value() {
        assert_eq!(points_value(80), Money::from_rupees(80));
    }
}
