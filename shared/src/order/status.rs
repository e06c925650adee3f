//! Order lifecycle state machine
//!
//! ```text
//! Temporary ──► Ongoing ──► Transferred ──► Settled
//!     │            │             │
//!     └────────────┴─────────────┴──► Cancelled
//! ```
//!
//! `Settled` and `Cancelled` are terminal. Transitions that end a table
//! occupancy (settle, cancel) must release the referenced tables; a failed
//! release is a consistency defect to be retried, not a fatal error.

use serde::{Deserialize, Serialize};

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// 临时订单 - 刚创建，尚无菜品
    #[default]
    Temporary,
    /// 进行中 - 已有菜品，员工可编辑
    Ongoing,
    /// 已移交 - 移交经理结账队列，员工只读
    Transferred,
    /// 已结算 - 终态
    Settled,
    /// 已取消 - 终态
    Cancelled,
}

impl OrderStatus {
    /// Whether the order has reached a terminal state
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Settled | OrderStatus::Cancelled)
    }

    /// Whether staff may still edit items and coupons
    pub fn is_editable(self) -> bool {
        matches!(self, OrderStatus::Temporary | OrderStatus::Ongoing)
    }

    /// Validate a lifecycle transition
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Temporary, Ongoing)
                | (Ongoing, Transferred)
                | (Transferred, Settled)
                | (Temporary, Cancelled)
                | (Ongoing, Cancelled)
                | (Transferred, Cancelled)
        )
    }
}

/// Order type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// 堂食
    #[default]
    DineIn,
    /// 外送
    Delivery,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_path_is_valid() {
        assert!(OrderStatus::Temporary.can_transition_to(OrderStatus::Ongoing));
        assert!(OrderStatus::Ongoing.can_transition_to(OrderStatus::Transferred));
        assert!(OrderStatus::Transferred.can_transition_to(OrderStatus::Settled));
    }

    #[test]
    fn cancel_allowed_from_every_non_terminal_state() {
        for s in [
            OrderStatus::Temporary,
            OrderStatus::Ongoing,
            OrderStatus::Transferred,
        ] {
            assert!(s.can_transition_to(OrderStatus::Cancelled), "{s:?}");
        }
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for s in [OrderStatus::Settled, OrderStatus::Cancelled] {
            for t in [
                OrderStatus::Temporary,
                OrderStatus::Ongoing,
                OrderStatus::Transferred,
                OrderStatus::Settled,
                OrderStatus::Cancelled,
            ] {
                assert!(!s.can_transition_to(t), "{s:?} -> {t:?}");
            }
        }
    }

    #[test]
    fn no_shortcuts() {
        // Settling without a transfer and skipping Ongoing are both rejected.
        assert!(!OrderStatus::Ongoing.can_transition_to(OrderStatus::Settled));
        assert!(!OrderStatus::Temporary.can_transition_to(OrderStatus::Transferred));
        assert!(!OrderStatus::Temporary.can_transition_to(OrderStatus::Settled));
    }
}
