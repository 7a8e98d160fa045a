//! # Sales Report
//!
//! Dashboard figures computed from a slice of bills. Storage picks the
//! bills (see `BillRepository::list` in boutique-db); this module only
//! aggregates them.
//!
//! ```text
//! Vec<Bill> ──► SalesSummary::from_bills ──► totals
//!                                          ├─ payment mode breakdown
//!                                          ├─ top 5 products (by units)
//!                                          └─ daily sales
//! ```

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Bill, PaymentMode};

/// How many products the best-seller list holds.
pub const TOP_PRODUCTS: usize = 5;

// =============================================================================
// Report Period
// =============================================================================

/// The dashboard's period selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ReportPeriod {
    /// Since midnight (UTC) today.
    Today,
    /// Since midnight seven days ago.
    Week,
    /// Since midnight on the same day last month (clamped to that month's
    /// last day, so 31 March looks back to 28 or 29 February).
    Month,
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

impl ReportPeriod {
    /// First instant included in the period.
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive();
        match self {
            ReportPeriod::Today => midnight(today),
            ReportPeriod::Week => midnight(today - Duration::days(7)),
            ReportPeriod::Month => {
                midnight(today.checked_sub_months(Months::new(1)).unwrap_or(today))
            }
        }
    }
}

// =============================================================================
// Summary Rows
// =============================================================================

/// Sales taken through one payment mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentModeTotal {
    pub payment_mode: PaymentMode,
    pub amount: Money,
    pub bills: i64,
}

/// A best-seller row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductSales {
    pub product_name: String,
    pub quantity: i64,
    pub revenue: Money,
}

/// Sales for one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DailySales {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub sales: Money,
    pub bills: i64,
}

// =============================================================================
// Sales Summary
// =============================================================================

/// Aggregated figures for a set of bills.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalesSummary {
    pub total_sales: Money,
    pub total_bills: i64,
    pub total_discount: Money,
    pub total_gst: Money,
    pub total_points_redeemed: i64,
    /// Only modes that were actually used, in [`PaymentMode::ALL`] order.
    pub payment_modes: Vec<PaymentModeTotal>,
    /// Up to [`TOP_PRODUCTS`] products by units sold.
    pub top_products: Vec<ProductSales>,
    /// Oldest day first.
    pub daily_sales: Vec<DailySales>,
}

impl SalesSummary {
    pub fn from_bills(bills: &[Bill]) -> Self {
        let mut summary = SalesSummary::default();
        let mut modes: BTreeMap<PaymentMode, (Money, i64)> = BTreeMap::new();
        let mut days: BTreeMap<NaiveDate, (Money, i64)> = BTreeMap::new();
        // keyed by product id; the name is the first snapshot seen
        let mut products: HashMap<i64, ProductSales> = HashMap::new();

        for bill in bills {
            summary.total_sales += bill.total_amount;
            summary.total_bills += 1;
            summary.total_discount += bill.discount;
            summary.total_gst += bill.gst_amount;
            summary.total_points_redeemed = summary
                .total_points_redeemed
                .saturating_add(bill.loyalty_points_redeemed);

            let mode = modes.entry(bill.payment_mode).or_default();
            mode.0 += bill.total_amount;
            mode.1 += 1;

            let day = days.entry(bill.created_at.date_naive()).or_default();
            day.0 += bill.total_amount;
            day.1 += 1;

            for item in &bill.items {
                let row = products.entry(item.product_id).or_insert_with(|| ProductSales {
                    product_name: item.product_name.clone(),
                    quantity: 0,
                    revenue: Money::zero(),
                });
                row.quantity = row.quantity.saturating_add(item.quantity);
                row.revenue += item.line_total;
            }
        }

        summary.payment_modes = modes
            .into_iter()
            .map(|(payment_mode, (amount, bills))| PaymentModeTotal {
                payment_mode,
                amount,
                bills,
            })
            .collect();

        summary.daily_sales = days
            .into_iter()
            .map(|(date, (sales, bills))| DailySales { date, sales, bills })
            .collect();

        let mut top: Vec<ProductSales> = products.into_values().collect();
        top.sort_by(|a, b| {
            b.quantity
                .cmp(&a.quantity)
                .then_with(|| b.revenue.cmp(&a.revenue))
                .then_with(|| a.product_name.cmp(&b.product_name))
        });
        top.truncate(TOP_PRODUCTS);
        summary.top_products = top;

        summary
    }

    /// Mean bill value, zero when there are no bills.
    pub fn average_bill(&self) -> Money {
        if self.total_bills == 0 {
            return Money::zero();
        }
        Money::from_paise(self.total_sales.paise() / self.total_bills)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LineItem;

    fn item(product_id: i64, name: &str, quantity: i64, rupees: i64) -> LineItem {
        LineItem {
            product_id,
            product_name: name.to_string(),
            quantity,
            unit_price: Money::from_rupees(rupees),
            line_total: Money::from_rupees(rupees * quantity),
        }
    }

    fn bill(id: i64, day: u32, mode: PaymentMode, items: Vec<LineItem>) -> Bill {
        let subtotal: Money = items.iter().map(|i| i.line_total).sum();
        Bill {
            id,
            invoice_number: format!("DB2025-{id:03}"),
            customer_id: None,
            customer_name: "Walk-in Customer".to_string(),
            customer_phone: None,
            items,
            subtotal,
            discount: Money::from_rupees(10),
            gst_amount: Money::zero(),
            loyalty_points_redeemed: 0,
            loyalty_points_earned: 0,
            total_amount: subtotal - Money::from_rupees(10),
            payment_mode: mode,
            created_by: 1,
            created_at: Utc.with_ymd_and_hms(2025, 3, day, 11, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = SalesSummary::from_bills(&[]);
        assert_eq!(summary.total_bills, 0);
        assert_eq!(summary.average_bill(), Money::zero());
        assert!(summary.payment_modes.is_empty());
        assert!(summary.top_products.is_empty());
    }

    #[test]
    fn test_totals_and_breakdowns() {
        let bills = vec![
            bill(1, 3, PaymentMode::Upi, vec![item(1, "Silk Saree", 1, 1000)]),
            bill(2, 3, PaymentMode::Cash, vec![item(2, "Dupatta", 3, 200)]),
            bill(
                3,
                4,
                PaymentMode::Upi,
                vec![item(2, "Dupatta", 1, 200), item(1, "Silk Saree", 1, 1000)],
            ),
        ];

        let summary = SalesSummary::from_bills(&bills);

        assert_eq!(summary.total_bills, 3);
        // 990 + 590 + 1190
        assert_eq!(summary.total_sales, Money::from_rupees(2770));
        assert_eq!(summary.total_discount, Money::from_rupees(30));

        assert_eq!(summary.payment_modes.len(), 2);
        assert_eq!(summary.payment_modes[0].payment_mode, PaymentMode::Cash);
        assert_eq!(summary.payment_modes[1].payment_mode, PaymentMode::Upi);
        assert_eq!(summary.payment_modes[1].bills, 2);

        assert_eq!(summary.top_products[0].product_name, "Dupatta");
        assert_eq!(summary.top_products[0].quantity, 4);
        assert_eq!(summary.top_products[1].revenue, Money::from_rupees(2000));

        assert_eq!(summary.daily_sales.len(), 2);
        assert_eq!(summary.daily_sales[0].bills, 2);
        assert_eq!(
            summary.daily_sales[1].date,
            NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
        );
    }

    #[test]
    fn test_top_products_capped() {
        let items = (1..=8).map(|id| item(id, &format!("Item {id}"), id, 100)).collect();
        let summary = SalesSummary::from_bills(&[bill(1, 5, PaymentMode::Card, items)]);

        assert_eq!(summary.top_products.len(), TOP_PRODUCTS);
        assert_eq!(summary.top_products[0].product_name, "Item 8");
    }

    #[test]
    fn test_period_start() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 15, 45, 0).unwrap();
        assert_eq!(
            ReportPeriod::Today.start(now),
            Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap()
        );
        assert_eq!(
            ReportPeriod::Month.start(now),
            Utc.with_ymd_and_hms(2025, 2, 14, 0, 0, 0).unwrap()
        );
        assert_eq!(
            ReportPeriod::Week.start(now),
            Utc.with_ymd_and_hms(2025, 3, 7, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_month_start_clamps_to_shorter_month() {
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 9, 0, 0).unwrap();
        assert_eq!(
            ReportPeriod::Month.start(now),
            Utc.with_ymd_and_hms(2025, 2, 28, 0, 0, 0).unwrap()
        );
    }
}
