//! Shared types for Mesa POS
//!
//! Common types used by the server and POS terminal clients:
//! order lifecycle states, line items, applied coupon records
//! and small utilities (timestamps, snowflake IDs).

pub mod order;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use order::{
    AppliedCoupon, AppliedDishCoupon, CustomerSource, DiscountType, OrderItem, OrderStatus,
    OrderType,
};
