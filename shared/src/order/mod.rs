//! Order domain types
//!
//! Types shared between the server and POS terminals:
//! - [`OrderStatus`]: the order lifecycle state machine
//! - [`OrderItem`]: a line item as entered by staff
//! - [`AppliedCoupon`] / [`AppliedDishCoupon`]: discount records stored on an order

pub mod status;
pub mod types;

// Re-exports
pub use status::{OrderStatus, OrderType};
pub use types::{AppliedCoupon, AppliedDishCoupon, CustomerSource, DiscountType, OrderItem};
