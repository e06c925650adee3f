//! Shared order value types

use serde::{Deserialize, Serialize};

/// A line item as entered by staff
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Dish name (matching for dish coupons is case-insensitive on this)
    pub name: String,
    /// Unit price
    pub price: f64,
    /// Quantity ordered
    pub quantity: i32,
    /// Portion size (e.g. "half", "full")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portion: Option<String>,
    /// Free-form modification note ("no onions")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl OrderItem {
    pub fn new(name: impl Into<String>, price: f64, quantity: i32) -> Self {
        Self {
            name: name.into(),
            price,
            quantity,
            portion: None,
            note: None,
        }
    }
}

/// Coupon discount type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// 固定金额
    Fixed,
    /// 百分比（必须带最高优惠上限）
    Percentage,
}

/// Order-level coupon applied to an order.
///
/// The discount is computed once at apply time against the then-current
/// subtotal and stored here; dish coupons by contrast are recomputed from
/// items on every totals pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedCoupon {
    /// Coupon record id ("coupon:xyz")
    pub coupon_id: String,
    pub name: String,
    pub discount_type: DiscountType,
    pub value: f64,
    /// Discount computed at apply time
    pub discount: f64,
}

/// Dish-specific coupon applied to an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedDishCoupon {
    /// Dish coupon record id ("dish_coupon:xyz")
    pub coupon_id: String,
    /// Generated display code, e.g. "PANEERTIKKA8"
    pub code: String,
    pub dish_name: String,
    pub percentage: f64,
}

/// Who collected a customer-data record.
///
/// Staff-collected records keep their source across later manager upserts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerSource {
    #[default]
    Staff,
    Manager,
}
