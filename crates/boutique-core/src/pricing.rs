//! # Pricing
//!
//! Bill arithmetic: what the billing screen computes before it submits a
//! cart, and the optional server-side cross-check of those figures.
//!
//! ## Formula
//! ```text
//! subtotal  = Σ unit_price × quantity
//! gst       = subtotal × rate                 (flat, bill-level)
//! redeemed  = min(requested, max_redeemable(balance, subtotal))
//! total     = subtotal + gst − discount − redeemed × ₹1   (never below 0)
//! earned    = floor(1% of subtotal)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::loyalty;
use crate::money::Money;
use crate::types::{CartRequest, Customer, LineItem, PaymentMode, TaxRate};
use crate::validation::ValidationResult;

/// The grand total for a set of figures.
///
/// ## Example
/// ```rust
/// use boutique_core::money::Money;
/// use boutique_core::pricing::grand_total;
///
/// let total = grand_total(Money::from_rupees(1000), Money::from_rupees(50), Money::zero(), 0);
/// assert_eq!(total, Money::from_rupees(1050));
/// ```
pub fn grand_total(subtotal: Money, gst: Money, discount: Money, points_redeemed: i64) -> Money {
    (subtotal + gst).saturating_sub_to_zero(discount + loyalty::points_value(points_redeemed))
}

/// [`grand_total`], or `None` if any intermediate figure overflows.
pub fn checked_grand_total(
    subtotal: Money,
    gst: Money,
    discount: Money,
    points_redeemed: i64,
) -> Option<Money> {
    let gross = subtotal.checked_add(gst)?;
    let points = loyalty::POINT_VALUE.checked_multiply_quantity(points_redeemed)?;
    let deductions = discount.checked_add(points)?;
    Some(gross.saturating_sub_to_zero(deductions))
}

fn overflow(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
}

/// A priced cart, ready to be turned into a [`CartRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub items: Vec<LineItem>,
    pub subtotal: Money,
    pub gst_amount: Money,
    pub discount: Money,
    pub points_redeemed: i64,
    pub points_earned: i64,
    pub total_amount: Money,
}

impl Quote {
    /// Prices a set of lines.
    ///
    /// ## Arguments
    /// * `items` - lines with unit price and quantity (line totals are recomputed)
    /// * `gst_rate` - flat bill-level GST rate
    /// * `discount` - flat discount in paise
    /// * `requested_points` - points the customer asked to redeem
    /// * `balance` - the customer's current balance (0 for walk-ins)
    ///
    /// Requested points are clamped to what the program allows.
    pub fn build(
        items: Vec<LineItem>,
        gst_rate: TaxRate,
        discount: Money,
        requested_points: i64,
        balance: i64,
    ) -> Self {
        let items: Vec<LineItem> = items
            .into_iter()
            .map(|mut item| {
                item.line_total = item.expected_line_total();
                item
            })
            .collect();

        let subtotal: Money = items.iter().map(|i| i.line_total).sum();
        let gst_amount = subtotal.calculate_tax(gst_rate);
        let points_redeemed = requested_points
            .max(0)
            .min(loyalty::max_redeemable(balance, subtotal));

        Quote {
            total_amount: grand_total(subtotal, gst_amount, discount, points_redeemed),
            points_earned: loyalty::points_earned(subtotal),
            items,
            subtotal,
            gst_amount,
            discount,
            points_redeemed,
        }
    }

    /// Turns the quote into the request the till submits.
    ///
    /// With no customer attached the sale is recorded against `walk_in_name`
    /// and no points move.
    pub fn into_cart_request(
        self,
        customer: Option<&Customer>,
        walk_in_name: &str,
        payment_mode: PaymentMode,
    ) -> CartRequest {
        let (customer_id, customer_name, customer_phone, redeemed, earned) = match customer {
            Some(c) => (
                Some(c.id),
                c.name.clone(),
                Some(c.phone.clone()),
                self.points_redeemed,
                self.points_earned,
            ),
            None => (None, walk_in_name.to_string(), None, 0, 0),
        };

        let total_amount = if customer.is_some() {
            self.total_amount
        } else {
            grand_total(self.subtotal, self.gst_amount, self.discount, 0)
        };

        CartRequest {
            customer_id,
            customer_name,
            customer_phone,
            items: self.items,
            subtotal: self.subtotal,
            discount: self.discount,
            gst_amount: self.gst_amount,
            total_amount,
            payment_mode,
            loyalty_points_redeemed: redeemed,
            loyalty_points_earned: earned,
        }
    }
}

/// Cross-checks the caller's figures against the line items.
///
/// ## What Is Checked
/// 1. Every `lineTotal` equals `unitPrice × quantity`
/// 2. `subtotal` equals the sum of line totals
/// 3. `totalAmount` equals `subtotal + gstAmount − discount − redeemed points`
///
/// GST itself is not recomputed: the rate is the caller's choice. A
/// figure too large to compute is rejected as out of range.
///
/// Off by default; enabled with `verify_totals` in the store config.
pub fn verify_totals(cart: &CartRequest) -> ValidationResult<()> {
    for item in &cart.items {
        let expected = item
            .unit_price
            .checked_multiply_quantity(item.quantity)
            .ok_or_else(|| overflow("lineTotal"))?;
        if item.line_total != expected {
            return Err(ValidationError::TotalsMismatch {
                field: format!("lineTotal for {}", item.product_name),
                expected,
                actual: item.line_total,
            });
        }
    }

    let subtotal = cart
        .items
        .iter()
        .try_fold(Money::zero(), |acc, i| acc.checked_add(i.line_total))
        .ok_or_else(|| overflow("subtotal"))?;
    if cart.subtotal != subtotal {
        return Err(ValidationError::TotalsMismatch {
            field: "subtotal".to_string(),
            expected: subtotal,
            actual: cart.subtotal,
        });
    }

    let total = checked_grand_total(
        cart.subtotal,
        cart.gst_amount,
        cart.discount,
        cart.loyalty_points_redeemed,
    )
    .ok_or_else(|| overflow("totalAmount"))?;
    if cart.total_amount != total {
        return Err(ValidationError::TotalsMismatch {
            field: "totalAmount".to_string(),
            expected: total,
            actual: cart.total_amount,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn line(product_id: i64, name: &str, quantity: i64, rupees: i64) -> LineItem {
        LineItem {
            product_id,
            product_name: name.to_string(),
            quantity,
            unit_price: Money::from_rupees(rupees),
            line_total: Money::zero(),
        }
    }

    fn customer(points: i64) -> Customer {
        Customer {
            id: 7,
            name: "Meera Iyer".to_string(),
            phone: "9876543210".to_string(),
            email: None,
            address: None,
            loyalty_points: points,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_quote_matches_billing_screen() {
        let quote = Quote::build(
            vec![line(1, "Silk Saree", 2, 500)],
            TaxRate::from_bps(500),
            Money::zero(),
            0,
            0,
        );

        assert_eq!(quote.subtotal, Money::from_rupees(1000));
        assert_eq!(quote.gst_amount, Money::from_rupees(50));
        assert_eq!(quote.total_amount, Money::from_rupees(1050));
        assert_eq!(quote.points_earned, 10);
        assert_eq!(quote.items[0].line_total, Money::from_rupees(1000));
    }

    #[test]
    fn test_quote_clamps_redemption_to_cap() {
        let quote = Quote::build(
            vec![line(1, "Silk Saree", 2, 500)],
            TaxRate::zero(),
            Money::from_rupees(100),
            500,
            500,
        );

        // 20% of ₹1000
        assert_eq!(quote.points_redeemed, 200);
        assert_eq!(quote.total_amount, Money::from_rupees(700));
    }

    #[test]
    fn test_quote_total_never_negative() {
        let quote = Quote::build(
            vec![line(1, "Dupatta", 1, 100)],
            TaxRate::zero(),
            Money::from_rupees(500),
            0,
            0,
        );
        assert_eq!(quote.total_amount, Money::zero());
    }

    #[test]
    fn test_walk_in_cart_moves_no_points() {
        let cart = Quote::build(
            vec![line(1, "Silk Saree", 1, 1000)],
            TaxRate::zero(),
            Money::zero(),
            100,
            0,
        )
        .into_cart_request(None, "Walk-in Customer", PaymentMode::Cash);

        assert_eq!(cart.customer_id, None);
        assert_eq!(cart.customer_name, "Walk-in Customer");
        assert_eq!(cart.loyalty_points_redeemed, 0);
        assert_eq!(cart.loyalty_points_earned, 0);
        assert!(verify_totals(&cart).is_ok());
    }

    #[test]
    fn test_customer_cart_passes_verification() {
        let meera = customer(120);
        let quote = Quote::build(
            vec![line(1, "Silk Saree", 1, 1000), line(2, "Dupatta", 2, 250)],
            TaxRate::from_bps(1200),
            Money::from_rupees(50),
            100,
            meera.loyalty_points,
        );
        let cart = quote.into_cart_request(Some(&meera), "Walk-in Customer", PaymentMode::Upi);

        assert_eq!(cart.customer_id, Some(7));
        assert_eq!(cart.loyalty_points_redeemed, 100);
        assert_eq!(cart.loyalty_points_earned, 15);
        // 1500 + 180 - 50 - 100
        assert_eq!(cart.total_amount, Money::from_rupees(1530));
        assert!(verify_totals(&cart).is_ok());
    }

    #[test]
    fn test_verify_totals_catches_understated_total() {
        let mut cart = Quote::build(
            vec![line(1, "Silk Saree", 2, 500)],
            TaxRate::from_bps(500),
            Money::zero(),
            0,
            0,
        )
        .into_cart_request(None, "Walk-in Customer", PaymentMode::Cash);
        cart.total_amount = Money::from_rupees(10);

        let err = verify_totals(&cart).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TotalsMismatch { ref field, .. } if field == "totalAmount"
        ));
    }

    #[test]
    fn test_verify_totals_catches_bad_line_total() {
        let mut cart = Quote::build(
            vec![line(1, "Silk Saree", 2, 500)],
            TaxRate::zero(),
            Money::zero(),
            0,
            0,
        )
        .into_cart_request(None, "Walk-in Customer", PaymentMode::Cash);
        cart.items[0].line_total = Money::from_rupees(500);

        assert!(verify_totals(&cart).is_err());
    }

    #[test]
    fn test_verify_totals_rejects_figures_too_large_to_compute() {
        let mut cart = Quote::build(
            vec![line(1, "Silk Saree", 2, 500)],
            TaxRate::zero(),
            Money::zero(),
            0,
            0,
        )
        .into_cart_request(None, "Walk-in Customer", PaymentMode::Cash);

        cart.items[0].unit_price = Money::from_paise(i64::MAX / 2 + 1);
        cart.items[0].line_total = Money::from_paise(i64::MAX);
        assert!(matches!(
            verify_totals(&cart),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "lineTotal"
        ));

        // Two lines that each fit but whose sum doesn't
        let big = LineItem {
            product_id: 1,
            product_name: "Bridal Lehenga".to_string(),
            quantity: 1,
            unit_price: Money::from_paise(i64::MAX - 1),
            line_total: Money::from_paise(i64::MAX - 1),
        };
        cart.items = vec![big.clone(), big];
        cart.subtotal = Money::from_paise(i64::MAX);
        assert!(matches!(
            verify_totals(&cart),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "subtotal"
        ));
    }

    #[test]
    fn test_checked_grand_total_reports_overflow() {
        let max = Money::from_paise(i64::MAX);
        assert_eq!(checked_grand_total(max, Money::from_paise(1), Money::zero(), 0), None);
        assert_eq!(checked_grand_total(Money::zero(), Money::zero(), Money::zero(), i64::MAX), None);
        assert_eq!(
            checked_grand_total(Money::from_rupees(100), Money::from_rupees(5), Money::zero(), 10),
            Some(Money::from_rupees(95))
        );
        // The saturating form never panics
        assert_eq!(grand_total(max, max, Money::zero(), 0), max);
    }
}
