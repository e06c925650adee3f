//! Dining Table Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Table status (桌台状态)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
    Reserved,
    Maintenance,
}

/// Reservation metadata, cleared on release or expiry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reservation {
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    /// Unix millis; the sweep releases the table once this has passed
    pub reserved_until: i64,
}

/// Dining table entity (桌台)
///
/// 状态变更全部走版本号 check-and-set：并发的清扫任务与人工操作
/// 竞争同一张桌台时，后写者收到 Conflict 而不是覆盖前者。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTable {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub capacity: i32,
    #[serde(default)]
    pub status: TableStatus,
    /// Order currently occupying this table
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub current_order: Option<RecordId>,
    /// Merge group id shared by merged tables (first selected is primary)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation: Option<Reservation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    /// Optimistic concurrency version
    #[serde(default)]
    pub version: u64,
}

fn default_true() -> bool {
    true
}

impl DiningTable {
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|i| i.to_string()).unwrap_or_default()
    }
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub name: String,
    pub capacity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}

/// Update dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
