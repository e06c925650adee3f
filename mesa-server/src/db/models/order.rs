//! Order Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::order::{AppliedCoupon, AppliedDishCoupon, OrderItem, OrderStatus, OrderType};
use surrealdb::RecordId;

/// Order entity (订单)
///
/// SurrealDB 为权威存储；活跃订单在 redb 缓存中保留一份同版本快照。
/// `version` 用于乐观并发控制：每次更新 +1，更新语句校验期望版本。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    /// Human-readable order number, e.g. "ORD202608260001"
    pub order_number: String,
    pub order_type: OrderType,
    pub status: OrderStatus,
    /// Line items
    #[serde(default)]
    pub items: Vec<OrderItem>,
    /// Claimed dining tables (empty for delivery orders)
    #[serde(default, with = "serde_helpers::record_id_vec")]
    pub table_ids: Vec<RecordId>,
    /// Optional owning location ("location:xyz" as plain filter field)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,

    // === Amounts ===
    pub subtotal: f64,
    pub cgst: f64,
    pub sgst: f64,
    #[serde(default)]
    pub service_charge: f64,
    /// Order-level coupon (at most one)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_coupon: Option<AppliedCoupon>,
    /// Dish-specific coupons (one per distinct dish name)
    #[serde(default)]
    pub applied_dish_coupons: Vec<AppliedDishCoupon>,
    /// Total discount (order coupon + dish coupons), capped at subtotal
    #[serde(default)]
    pub discount_total: f64,
    /// Final amount: subtotal + taxes + service charge - discount_total
    pub total: f64,
    /// Pre-discount amount: subtotal + taxes + service charge
    pub original_total: f64,

    // === Operators ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,

    // === Timestamps (Unix millis) ===
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transferred_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settled_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<i64>,

    /// Optimistic concurrency version
    #[serde(default)]
    pub version: u64,
}

impl Order {
    /// "order:xyz" 形式的 ID，未持久化时为空串
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|i| i.to_string()).unwrap_or_default()
    }
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    #[serde(default)]
    pub order_type: OrderType,
    /// Tables to claim on creation (dine-in)
    #[serde(default)]
    pub table_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<String>,
}
