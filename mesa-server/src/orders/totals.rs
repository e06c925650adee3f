//! Order Totals
//!
//! Recomputes every derived amount on an order from its lines and applied
//! discounts. Uses rust_decimal for precise calculations, stores as f64.

use crate::coupons::engine;
use crate::db::models::Order;
use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

#[inline]
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

#[inline]
fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Tax and service-charge rates, percentages of the subtotal
#[derive(Debug, Clone, Copy)]
pub struct TaxRates {
    pub cgst_rate: f64,
    pub sgst_rate: f64,
    pub service_charge_rate: f64,
}

/// Recompute subtotal, taxes, discounts and totals in place.
///
/// - `subtotal` = Σ price × quantity over all lines
/// - CGST / SGST / service charge are each a percentage of the subtotal
/// - `discount_total` = order coupon discount + Σ dish coupon discounts,
///   clamped to the subtotal
/// - `original_total` = subtotal + taxes + service charge (no discounts)
/// - `total` = original_total − discount_total, never negative
pub fn recompute(order: &mut Order, rates: &TaxRates) {
    let subtotal: Decimal = order
        .items
        .iter()
        .map(|item| to_decimal(item.price) * Decimal::from(item.quantity))
        .sum();

    let cgst = subtotal * to_decimal(rates.cgst_rate) / Decimal::ONE_HUNDRED;
    let sgst = subtotal * to_decimal(rates.sgst_rate) / Decimal::ONE_HUNDRED;
    let service_charge = subtotal * to_decimal(rates.service_charge_rate) / Decimal::ONE_HUNDRED;

    let coupon_discount = order
        .applied_coupon
        .as_ref()
        .map(|c| to_decimal(c.discount))
        .unwrap_or_default();
    // Every line matching the coupon's dish contributes, once per line
    let dish_discount: Decimal = order
        .applied_dish_coupons
        .iter()
        .map(|c| {
            order
                .items
                .iter()
                .filter(|item| item.name.eq_ignore_ascii_case(&c.dish_name))
                .map(|item| to_decimal(engine::dish_coupon_discount(c.percentage, item.price)))
                .sum::<Decimal>()
        })
        .sum();

    let discount_total = (coupon_discount + dish_discount)
        .min(subtotal)
        .max(Decimal::ZERO);

    let original_total = subtotal + cgst + sgst + service_charge;
    let total = (original_total - discount_total).max(Decimal::ZERO);

    order.subtotal = to_f64(subtotal);
    order.cgst = to_f64(cgst);
    order.sgst = to_f64(sgst);
    order.service_charge = to_f64(service_charge);
    order.discount_total = to_f64(discount_total);
    order.original_total = to_f64(original_total);
    order.total = to_f64(total);
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{
        AppliedCoupon, AppliedDishCoupon, DiscountType, OrderItem, OrderStatus, OrderType,
    };

    const RATES: TaxRates = TaxRates {
        cgst_rate: 2.5,
        sgst_rate: 2.5,
        service_charge_rate: 0.0,
    };

    fn order_with_items(items: Vec<OrderItem>) -> Order {
        Order {
            id: None,
            order_number: "ORD202608260001".to_string(),
            order_type: OrderType::DineIn,
            status: OrderStatus::Ongoing,
            items,
            table_ids: vec![],
            location_id: None,
            subtotal: 0.0,
            cgst: 0.0,
            sgst: 0.0,
            service_charge: 0.0,
            applied_coupon: None,
            applied_dish_coupons: vec![],
            discount_total: 0.0,
            total: 0.0,
            original_total: 0.0,
            staff_id: None,
            manager_id: None,
            created_at: 0,
            updated_at: 0,
            transferred_at: None,
            settled_at: None,
            cancelled_at: None,
            version: 1,
        }
    }

    #[test]
    fn test_subtotal_and_taxes() {
        let mut order = order_with_items(vec![
            OrderItem::new("Dal Makhani", 220.0, 2),
            OrderItem::new("Butter Naan", 40.0, 4),
        ]);
        recompute(&mut order, &RATES);

        // 220*2 + 40*4 = 600
        assert_eq!(order.subtotal, 600.0);
        assert_eq!(order.cgst, 15.0);
        assert_eq!(order.sgst, 15.0);
        assert_eq!(order.service_charge, 0.0);
        assert_eq!(order.original_total, 630.0);
        assert_eq!(order.total, 630.0);
    }

    #[test]
    fn test_coupon_reduces_total() {
        let mut order = order_with_items(vec![OrderItem::new("Thali", 300.0, 2)]);
        order.applied_coupon = Some(AppliedCoupon {
            coupon_id: "coupon:c1".to_string(),
            name: "FLAT50".to_string(),
            discount_type: DiscountType::Fixed,
            value: 50.0,
            discount: 50.0,
        });
        recompute(&mut order, &RATES);

        assert_eq!(order.subtotal, 600.0);
        assert_eq!(order.discount_total, 50.0);
        assert_eq!(order.original_total, 630.0);
        assert_eq!(order.total, 580.0);
    }

    #[test]
    fn test_dish_coupon_floors_once_per_line() {
        // 8% of ₹169 = 13.52 → ₹13, once, even though quantity is 3
        let mut order = order_with_items(vec![OrderItem::new("Paneer Tikka", 169.0, 3)]);
        order.applied_dish_coupons = vec![AppliedDishCoupon {
            coupon_id: "dish_coupon:d1".to_string(),
            code: "PANEERTIKKA8".to_string(),
            dish_name: "Paneer Tikka".to_string(),
            percentage: 8.0,
        }];
        recompute(&mut order, &RATES);

        assert_eq!(order.subtotal, 507.0);
        assert_eq!(order.discount_total, 13.0);
    }

    #[test]
    fn test_dish_coupon_sums_over_matching_lines() {
        // Half and full portion as separate lines: 8% of ₹100 = ₹8,
        // 8% of ₹169 = 13.52 → ₹13; both lines contribute
        let mut order = order_with_items(vec![
            OrderItem::new("Paneer Tikka", 100.0, 1),
            OrderItem::new("Paneer Tikka", 169.0, 1),
        ]);
        order.applied_dish_coupons = vec![AppliedDishCoupon {
            coupon_id: "dish_coupon:d1".to_string(),
            code: "PANEERTIKKA8".to_string(),
            dish_name: "Paneer Tikka".to_string(),
            percentage: 8.0,
        }];
        recompute(&mut order, &RATES);

        assert_eq!(order.subtotal, 269.0);
        assert_eq!(order.discount_total, 21.0);
    }

    #[test]
    fn test_dish_coupon_match_is_case_insensitive() {
        let mut order = order_with_items(vec![OrderItem::new("paneer tikka", 169.0, 1)]);
        order.applied_dish_coupons = vec![AppliedDishCoupon {
            coupon_id: "dish_coupon:d1".to_string(),
            code: "PANEERTIKKA8".to_string(),
            dish_name: "Paneer Tikka".to_string(),
            percentage: 8.0,
        }];
        recompute(&mut order, &RATES);
        assert_eq!(order.discount_total, 13.0);
    }

    #[test]
    fn test_total_never_negative() {
        let mut order = order_with_items(vec![OrderItem::new("Chai", 20.0, 1)]);
        order.applied_coupon = Some(AppliedCoupon {
            coupon_id: "coupon:c1".to_string(),
            name: "FLAT100".to_string(),
            discount_type: DiscountType::Fixed,
            value: 100.0,
            discount: 100.0,
        });
        recompute(&mut order, &RATES);

        // Discount clamps to the subtotal; the taxes still stand
        assert_eq!(order.subtotal, 20.0);
        assert_eq!(order.discount_total, 20.0);
        assert!(order.total >= 0.0);
        assert_eq!(order.total, 1.0);
    }

    #[test]
    fn test_empty_order_is_all_zero() {
        let mut order = order_with_items(vec![]);
        recompute(&mut order, &RATES);
        assert_eq!(order.subtotal, 0.0);
        assert_eq!(order.total, 0.0);
    }
}
