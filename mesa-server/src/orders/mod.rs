//! Order Domain
//!
//! Order lifecycle: `Temporary → Ongoing → Transferred → Settled`, with
//! `Cancelled` reachable from every non-terminal state. SurrealDB is the
//! authoritative store; the redb cache mirrors active orders and is removed
//! on terminal transitions.

pub mod cache;
pub mod service;
pub mod totals;

pub use cache::OrderCache;
pub use service::{OrderService, SettleRequest, SettleResult};
