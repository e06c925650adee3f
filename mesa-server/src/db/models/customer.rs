//! Customer Data Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::order::CustomerSource;
use surrealdb::RecordId;

/// Per-order customer record (客户资料)
///
/// 以订单为键 upsert；`source` 一旦为 Staff 便不可被经理端覆盖。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerData {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub order: RecordId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    pub source: CustomerSource,
    pub collected_at: i64,
}

/// Upsert payload (customer fields + the collecting side)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDataUpsert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub source: CustomerSource,
}
