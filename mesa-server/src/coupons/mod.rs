//! Coupon Engine
//!
//! Pure discount arithmetic for order-level coupons and dish coupons.
//! Persistence lives in `db::repository::coupon`; the order service calls
//! into here when applying discounts.

pub mod engine;

pub use engine::{
    CouponError, can_apply_dish_coupon, coupon_discount, dish_coupon_discount, generate_code,
};
