//! Coupon Models
//!
//! 两类优惠券：
//! - [`Coupon`]: 订单级（固定金额或百分比，百分比必须带上限）
//! - [`DishCoupon`]: 菜品级（按菜名匹配，每行只折一份）

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::order::DiscountType;
use surrealdb::RecordId;

/// Order-level coupon entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub name: String,
    pub discount_type: DiscountType,
    pub value: f64,
    /// Cap for percentage coupons (required when discount_type is Percentage)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_discount: Option<f64>,
    /// Minimum subtotal for the coupon to apply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_order_amount: Option<f64>,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

impl Coupon {
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|i| i.to_string()).unwrap_or_default()
    }
}

/// Create coupon payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponCreate {
    pub name: String,
    pub discount_type: DiscountType,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_order_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}

/// Update coupon payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_order_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Dish-specific coupon entity
///
/// `code` 由菜名和折扣率生成，仅用于展示；唯一性按
/// (location, 菜名小写, 折扣率) 三元组在仓储层保证。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishCoupon {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// Generated display code, e.g. "PANEERTIKKA8"
    pub code: String,
    pub dish_name: String,
    pub percentage: f64,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    pub created_at: i64,
}

impl DishCoupon {
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|i| i.to_string()).unwrap_or_default()
    }
}

/// Bulk-create payload: several percentages for one dish at once
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DishCouponBatchCreate {
    pub dish_name: String,
    pub percentages: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}
