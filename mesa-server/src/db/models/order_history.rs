//! Order History Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::order::OrderStatus;
use surrealdb::RecordId;

/// Terminal-state audit record, written on settle and cancel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderHistory {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub order: RecordId,
    pub order_number: String,
    /// Final status: Settled or Cancelled
    pub final_status: OrderStatus,
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_id: Option<String>,
    pub recorded_at: i64,
}
