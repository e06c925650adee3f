//! Database Models
//!
//! SurrealDB 持久化实体。订单行项目、折扣记录等线上类型来自 `shared`。

pub mod serde_helpers;

pub mod coupon;
pub mod customer;
pub mod dining_table;
pub mod order;
pub mod order_history;

// Re-exports
pub use coupon::{Coupon, CouponCreate, CouponUpdate, DishCoupon, DishCouponBatchCreate};
pub use customer::{CustomerData, CustomerDataUpsert};
pub use dining_table::{
    DiningTable, DiningTableCreate, DiningTableUpdate, Reservation, TableStatus,
};
pub use order::{Order, OrderCreate};
pub use order_history::OrderHistory;
