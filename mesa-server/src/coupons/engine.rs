//! Discount Calculation
//!
//! Uses rust_decimal for precise calculations, stores as f64.
//!
//! Order-level coupons discount the pre-tax subtotal: fixed coupons by a
//! flat amount, percentage coupons by a fraction capped at `max_discount`.
//! Dish coupons knock a whole-unit amount off one matching line.

use crate::db::models::Coupon;
use rust_decimal::prelude::*;
use shared::order::DiscountType;
use thiserror::Error;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

#[derive(Debug, Error, PartialEq)]
pub enum CouponError {
    #[error("Coupon is not active")]
    Inactive,
    #[error("Order subtotal {subtotal:.2} is below the minimum {required:.2}")]
    BelowMinimum { required: f64, subtotal: f64 },
    #[error("Percentage coupon is missing its max_discount cap")]
    MissingCap,
}

/// Convert f64 to Decimal for calculation
#[inline]
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Discount an order-level coupon grants on a subtotal.
///
/// - Fixed coupons grant their face value.
/// - Percentage coupons grant `subtotal * value / 100`, capped at
///   `max_discount`.
/// - Either kind is clamped to `[0, subtotal]` so the order never goes
///   negative and the coupon never pays out more than the bill.
pub fn coupon_discount(coupon: &Coupon, subtotal: f64) -> Result<f64, CouponError> {
    if !coupon.is_active {
        return Err(CouponError::Inactive);
    }
    if let Some(min) = coupon.min_order_amount
        && subtotal < min
    {
        return Err(CouponError::BelowMinimum {
            required: min,
            subtotal,
        });
    }

    let subtotal_dec = to_decimal(subtotal);
    let value = to_decimal(coupon.value);

    let raw = match coupon.discount_type {
        DiscountType::Fixed => value,
        DiscountType::Percentage => {
            let cap = coupon.max_discount.ok_or(CouponError::MissingCap)?;
            let pct_amount = subtotal_dec * value / Decimal::ONE_HUNDRED;
            pct_amount.min(to_decimal(cap))
        }
    };

    let clamped = raw.min(subtotal_dec).max(Decimal::ZERO);
    Ok(to_f64(clamped))
}

/// Discount a dish coupon grants on one matching line.
///
/// Floored to a whole unit and applied once per line regardless of
/// quantity: `floor(price * percentage / 100)`.
pub fn dish_coupon_discount(percentage: f64, unit_price: f64) -> f64 {
    let amount = to_decimal(unit_price) * to_decimal(percentage) / Decimal::ONE_HUNDRED;
    amount.floor().to_f64().unwrap_or_default()
}

/// Whether a dish coupon can join an order's applied set.
///
/// One coupon per distinct dish name, case-insensitive.
pub fn can_apply_dish_coupon(
    applied: &[shared::order::AppliedDishCoupon],
    dish_name: &str,
) -> bool {
    !applied
        .iter()
        .any(|c| c.dish_name.eq_ignore_ascii_case(dish_name))
}

/// Display code for a dish coupon: the dish name uppercased with
/// whitespace stripped, followed by the percentage.
///
/// Codes are not unique keys; two dishes can collide and that is fine.
pub fn generate_code(dish_name: &str, percentage: f64) -> String {
    let base: String = dish_name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    if percentage.fract() == 0.0 {
        format!("{}{}", base, percentage as i64)
    } else {
        format!("{}{}", base, percentage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_coupon(value: f64, min_order: Option<f64>) -> Coupon {
        Coupon {
            id: None,
            name: "FLAT".to_string(),
            discount_type: DiscountType::Fixed,
            value,
            max_discount: None,
            min_order_amount: min_order,
            is_active: true,
            location_id: None,
            created_at: 0,
        }
    }

    fn percentage_coupon(value: f64, max_discount: f64) -> Coupon {
        Coupon {
            id: None,
            name: "PCT".to_string(),
            discount_type: DiscountType::Percentage,
            value,
            max_discount: Some(max_discount),
            min_order_amount: None,
            is_active: true,
            location_id: None,
            created_at: 0,
        }
    }

    #[test]
    fn test_fixed_discount() {
        let coupon = fixed_coupon(50.0, None);
        assert_eq!(coupon_discount(&coupon, 300.0).unwrap(), 50.0);
    }

    #[test]
    fn test_fixed_discount_capped_at_subtotal() {
        // ₹100 off a ₹60 order discounts ₹60, never more
        let coupon = fixed_coupon(100.0, None);
        assert_eq!(coupon_discount(&coupon, 60.0).unwrap(), 60.0);
    }

    #[test]
    fn test_percentage_discount() {
        // 10% of ₹500 = ₹50, under the ₹100 cap
        let coupon = percentage_coupon(10.0, 100.0);
        assert_eq!(coupon_discount(&coupon, 500.0).unwrap(), 50.0);
    }

    #[test]
    fn test_percentage_discount_hits_cap() {
        // 20% of ₹1000 = ₹200, capped at ₹150
        let coupon = percentage_coupon(20.0, 150.0);
        assert_eq!(coupon_discount(&coupon, 1000.0).unwrap(), 150.0);
    }

    #[test]
    fn test_min_order_threshold() {
        let coupon = fixed_coupon(50.0, Some(200.0));
        assert_eq!(
            coupon_discount(&coupon, 150.0),
            Err(CouponError::BelowMinimum {
                required: 200.0,
                subtotal: 150.0,
            })
        );
        assert_eq!(coupon_discount(&coupon, 200.0).unwrap(), 50.0);
    }

    #[test]
    fn test_inactive_coupon_rejected() {
        let mut coupon = fixed_coupon(50.0, None);
        coupon.is_active = false;
        assert_eq!(coupon_discount(&coupon, 300.0), Err(CouponError::Inactive));
    }

    #[test]
    fn test_percentage_without_cap_rejected() {
        let mut coupon = percentage_coupon(10.0, 0.0);
        coupon.max_discount = None;
        assert_eq!(
            coupon_discount(&coupon, 500.0),
            Err(CouponError::MissingCap)
        );
    }

    #[test]
    fn test_percentage_rounding_half_up() {
        // 15% of ₹99.99 = ₹14.9985 → ₹15.00
        let coupon = percentage_coupon(15.0, 1000.0);
        assert_eq!(coupon_discount(&coupon, 99.99).unwrap(), 15.0);
    }

    // ========== Dish coupons ==========

    #[test]
    fn test_dish_discount_floors() {
        // 8% of ₹169 = ₹13.52 → floors to ₹13
        assert_eq!(dish_coupon_discount(8.0, 169.0), 13.0);
    }

    #[test]
    fn test_dish_discount_whole_result() {
        // 10% of ₹250 = ₹25 exactly
        assert_eq!(dish_coupon_discount(10.0, 250.0), 25.0);
    }

    #[test]
    fn test_dish_discount_small_price_floors_to_zero() {
        // 5% of ₹15 = ₹0.75 → ₹0
        assert_eq!(dish_coupon_discount(5.0, 15.0), 0.0);
    }

    #[test]
    fn test_one_coupon_per_dish() {
        let applied = vec![shared::order::AppliedDishCoupon {
            coupon_id: "dish_coupon:d1".to_string(),
            code: "PANEERTIKKA8".to_string(),
            dish_name: "Paneer Tikka".to_string(),
            percentage: 8.0,
        }];
        assert!(!can_apply_dish_coupon(&applied, "paneer tikka"));
        assert!(can_apply_dish_coupon(&applied, "Dal Makhani"));
    }

    #[test]
    fn test_generate_code() {
        assert_eq!(generate_code("Paneer Tikka", 8.0), "PANEERTIKKA8");
        assert_eq!(generate_code("dal makhani", 12.5), "DALMAKHANI12.5");
        assert_eq!(generate_code(" Veg  Biryani ", 10.0), "VEGBIRYANI10");
    }
}
