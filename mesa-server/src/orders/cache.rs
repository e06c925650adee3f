//! redb-based read cache for active orders
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `order_snapshots` | `order_id` | `Order` | Active order cache |
//! | `active_orders` | `order_id` | `()` | Active order index |
//! | `counters` | `&str` | `u64` | Daily order-number counter |
//!
//! # Consistency
//!
//! SurrealDB is authoritative. The cache is written only AFTER a database
//! write succeeds and is removed when an order reaches a terminal state.
//! Cached orders carry their `version`, so a reader that needs certainty
//! can compare against the database row and fall through on mismatch.
//!
//! # Durability
//!
//! redb commits with `Durability::Immediate`, so the order-number counter
//! survives power loss without ever reissuing a number.

use crate::db::models::Order;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Cached active orders: key = order_id, value = JSON-serialized Order
const SNAPSHOTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("order_snapshots");

/// Active order index: key = order_id, value = empty (existence check)
const ACTIVE_TABLE: TableDefinition<&str, ()> = TableDefinition::new("active_orders");

/// Counters: order-number date + sequence
const COUNTER_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

const ORDER_DATE_KEY: &str = "order_date";
const ORDER_SEQ_KEY: &str = "order_seq";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order missing id")]
    MissingId,
}

pub type CacheResult<T> = Result<T, CacheError>;

impl From<CacheError> for crate::utils::AppError {
    fn from(err: CacheError) -> Self {
        crate::utils::AppError::internal(format!("Order cache error: {err}"))
    }
}

/// Active-order cache backed by redb
#[derive(Clone)]
pub struct OrderCache {
    db: Arc<Database>,
}

impl OrderCache {
    /// Open or create the cache database at the given path
    pub fn open(path: impl AsRef<Path>) -> CacheResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory cache (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> CacheResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> CacheResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SNAPSHOTS_TABLE)?;
            let _ = write_txn.open_table(ACTIVE_TABLE)?;
            let _ = write_txn.open_table(COUNTER_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    // ========== Order Number Counter ==========

    /// Issue the next order number: `ORD<yyyymmdd><seq>`.
    ///
    /// The counter resets when the date changes and is committed before the
    /// number is returned, so a crash never reissues a number.
    pub fn next_order_number(&self, today_compact: &str) -> CacheResult<String> {
        let today_u64: u64 = today_compact.parse().unwrap_or(0);

        let txn = self.db.begin_write()?;
        let seq = {
            let mut table = txn.open_table(COUNTER_TABLE)?;
            let stored_date = table.get(ORDER_DATE_KEY)?.map(|g| g.value()).unwrap_or(0);

            let next = if stored_date != today_u64 {
                table.insert(ORDER_DATE_KEY, today_u64)?;
                1
            } else {
                table.get(ORDER_SEQ_KEY)?.map(|g| g.value()).unwrap_or(0) + 1
            };
            table.insert(ORDER_SEQ_KEY, next)?;
            next
        };
        txn.commit()?;

        Ok(format!("ORD{}{:04}", today_compact, seq))
    }

    // ========== Snapshot Operations ==========

    /// Cache an order and mark it active
    pub fn put_active(&self, order: &Order) -> CacheResult<()> {
        let order_id = order.id.as_ref().ok_or(CacheError::MissingId)?.to_string();
        let value = serde_json::to_vec(order)?;

        let txn = self.db.begin_write()?;
        {
            let mut snapshots = txn.open_table(SNAPSHOTS_TABLE)?;
            snapshots.insert(order_id.as_str(), value.as_slice())?;
            let mut active = txn.open_table(ACTIVE_TABLE)?;
            active.insert(order_id.as_str(), ())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Get a cached order
    pub fn get(&self, order_id: &str) -> CacheResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SNAPSHOTS_TABLE)?;

        match table.get(order_id)? {
            Some(value) => {
                let order: Order = serde_json::from_slice(value.value())?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    /// Remove an order from the cache (terminal state reached)
    pub fn remove(&self, order_id: &str) -> CacheResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut snapshots = txn.open_table(SNAPSHOTS_TABLE)?;
            snapshots.remove(order_id)?;
            let mut active = txn.open_table(ACTIVE_TABLE)?;
            active.remove(order_id)?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn is_active(&self, order_id: &str) -> CacheResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACTIVE_TABLE)?;
        Ok(table.get(order_id)?.is_some())
    }

    /// All cached active orders
    pub fn active_orders(&self) -> CacheResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let active = read_txn.open_table(ACTIVE_TABLE)?;
        let snapshots = read_txn.open_table(SNAPSHOTS_TABLE)?;

        let mut orders = Vec::new();
        for result in active.iter()? {
            let (key, _) = result?;
            if let Some(value) = snapshots.get(key.value())? {
                let order: Order = serde_json::from_slice(value.value())?;
                orders.push(order);
            }
        }
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{OrderStatus, OrderType};
    use surrealdb::RecordId;

    fn create_test_order(id: &str) -> Order {
        Order {
            id: Some(RecordId::from_table_key("order", id)),
            order_number: "ORD202608260001".to_string(),
            order_type: OrderType::DineIn,
            status: OrderStatus::Ongoing,
            items: vec![],
            table_ids: vec![],
            location_id: None,
            subtotal: 0.0,
            cgst: 0.0,
            sgst: 0.0,
            service_charge: 0.0,
            applied_coupon: None,
            applied_dish_coupons: vec![],
            discount_total: 0.0,
            total: 0.0,
            original_total: 0.0,
            staff_id: None,
            manager_id: None,
            created_at: shared::util::now_millis(),
            updated_at: shared::util::now_millis(),
            transferred_at: None,
            settled_at: None,
            cancelled_at: None,
            version: 1,
        }
    }

    #[test]
    fn test_put_get_remove() {
        let cache = OrderCache::open_in_memory().unwrap();
        let order = create_test_order("o1");
        let order_id = order.id_string();

        assert!(cache.get(&order_id).unwrap().is_none());

        cache.put_active(&order).unwrap();
        assert!(cache.is_active(&order_id).unwrap());
        let cached = cache.get(&order_id).unwrap().unwrap();
        assert_eq!(cached.order_number, order.order_number);
        assert_eq!(cached.version, 1);

        cache.remove(&order_id).unwrap();
        assert!(!cache.is_active(&order_id).unwrap());
        assert!(cache.get(&order_id).unwrap().is_none());
    }

    #[test]
    fn test_put_overwrites_with_newer_version() {
        let cache = OrderCache::open_in_memory().unwrap();
        let mut order = create_test_order("o2");
        cache.put_active(&order).unwrap();

        order.version = 2;
        order.subtotal = 450.0;
        cache.put_active(&order).unwrap();

        let cached = cache.get(&order.id_string()).unwrap().unwrap();
        assert_eq!(cached.version, 2);
        assert_eq!(cached.subtotal, 450.0);
    }

    #[test]
    fn test_active_orders_listing() {
        let cache = OrderCache::open_in_memory().unwrap();
        cache.put_active(&create_test_order("a")).unwrap();
        cache.put_active(&create_test_order("b")).unwrap();

        let active = cache.active_orders().unwrap();
        assert_eq!(active.len(), 2);

        cache.remove("order:a").unwrap();
        assert_eq!(cache.active_orders().unwrap().len(), 1);
    }

    #[test]
    fn test_order_number_sequence() {
        let cache = OrderCache::open_in_memory().unwrap();

        assert_eq!(cache.next_order_number("20260826").unwrap(), "ORD202608260001");
        assert_eq!(cache.next_order_number("20260826").unwrap(), "ORD202608260002");

        // Date rollover resets the counter
        assert_eq!(cache.next_order_number("20260827").unwrap(), "ORD202608270001");
    }

    #[test]
    fn test_counter_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.redb");

        {
            let cache = OrderCache::open(&path).unwrap();
            assert_eq!(cache.next_order_number("20260826").unwrap(), "ORD202608260001");
            assert_eq!(cache.next_order_number("20260826").unwrap(), "ORD202608260002");
        }

        // Reopening the file must continue the sequence, never reissue
        let cache = OrderCache::open(&path).unwrap();
        assert_eq!(cache.next_order_number("20260826").unwrap(), "ORD202608260003");
    }
}
