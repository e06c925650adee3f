//! Dining Table Repository
//!
//! 所有占用状态变更 (occupy/release/reserve/merge) 走版本号 check-and-set：
//! `UPDATE ... WHERE version = $expected` 返回空结果即为并发冲突。

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{
    DiningTable, DiningTableCreate, DiningTableUpdate, Reservation, TableStatus,
};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "dining_table";

#[derive(Clone)]
pub struct DiningTableRepository {
    base: BaseRepository,
}

impl DiningTableRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all active dining tables
    pub async fn find_all(&self) -> RepoResult<Vec<DiningTable>> {
        let tables: Vec<DiningTable> = self
            .base
            .db()
            .query("SELECT * FROM dining_table WHERE is_active = true ORDER BY name")
            .await?
            .take(0)?;
        Ok(tables)
    }

    /// Find table by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<DiningTable>> {
        let thing = parse_record_id(id)?;
        let table: Option<DiningTable> = self.base.db().select(thing).await?;
        Ok(table)
    }

    /// Find table by id, erroring when missing
    pub async fn get(&self, id: &str) -> RepoResult<DiningTable> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Table {} not found", id)))
    }

    /// Find all tables currently referencing an order
    pub async fn find_by_order(&self, order_id: &RecordId) -> RepoResult<Vec<DiningTable>> {
        let tables: Vec<DiningTable> = self
            .base
            .db()
            .query("SELECT * FROM dining_table WHERE current_order = $order")
            .bind(("order", order_id.clone()))
            .await?
            .take(0)?;
        Ok(tables)
    }

    /// Find reserved tables whose reservation has expired
    pub async fn find_expired_reserved(&self, now: i64) -> RepoResult<Vec<DiningTable>> {
        let tables: Vec<DiningTable> = self
            .base
            .db()
            .query(
                "SELECT * FROM dining_table \
                 WHERE status = 'RESERVED' AND reservation.reserved_until < $now",
            )
            .bind(("now", now))
            .await?
            .take(0)?;
        Ok(tables)
    }

    /// All members of a merge group
    pub async fn find_by_merge_group(&self, group: &str) -> RepoResult<Vec<DiningTable>> {
        let tables: Vec<DiningTable> = self
            .base
            .db()
            .query("SELECT * FROM dining_table WHERE merge_group = $group ORDER BY name")
            .bind(("group", group.to_string()))
            .await?
            .take(0)?;
        Ok(tables)
    }

    /// Find table by name
    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<DiningTable>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM dining_table WHERE name = $name LIMIT 1")
            .bind(("name", name.to_string()))
            .await?;
        let tables: Vec<DiningTable> = result.take(0)?;
        Ok(tables.into_iter().next())
    }

    /// Create a new dining table
    pub async fn create(&self, data: DiningTableCreate) -> RepoResult<DiningTable> {
        if self.find_by_name(&data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Table '{}' already exists",
                data.name
            )));
        }

        let table = DiningTable {
            id: None,
            name: data.name,
            capacity: data.capacity.unwrap_or(4),
            status: TableStatus::Available,
            current_order: None,
            merge_group: None,
            reservation: None,
            location_id: data.location_id,
            is_active: true,
            version: 0,
        };

        let created: Option<DiningTable> = self.base.db().create(TABLE).content(table).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create dining table".to_string()))
    }

    /// Update name/capacity/is_active (not occupancy state)
    pub async fn update(&self, id: &str, data: DiningTableUpdate) -> RepoResult<DiningTable> {
        let thing = parse_record_id(id)?;
        let existing = self.get(id).await?;

        if let Some(new_name) = &data.name
            && *new_name != existing.name
            && self.find_by_name(new_name).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Table '{}' already exists",
                new_name
            )));
        }

        let name = data.name.unwrap_or(existing.name);
        let capacity = data.capacity.unwrap_or(existing.capacity);
        let is_active = data.is_active.unwrap_or(existing.is_active);

        self.base
            .db()
            .query("UPDATE $thing SET name = $name, capacity = $capacity, is_active = $is_active")
            .bind(("thing", thing))
            .bind(("name", name))
            .bind(("capacity", capacity))
            .bind(("is_active", is_active))
            .await?;

        self.get(id).await
    }

    /// Hard delete a dining table
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_id(id)?;
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }

    // ========== Occupancy transitions (check-and-set) ==========

    /// Mark a table occupied by an order
    pub async fn set_occupied(
        &self,
        table: &DiningTable,
        order_id: &RecordId,
    ) -> RepoResult<DiningTable> {
        let thing = self.thing_of(table)?;
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET status = 'OCCUPIED', current_order = $order, \
                 reservation = NONE, version = version + 1 \
                 WHERE version = $expected",
            )
            .bind(("thing", thing))
            .bind(("order", order_id.clone()))
            .bind(("expected", table.version))
            .await?;
        self.cas_result(result.take(0)?, &table.name)
    }

    /// Release a table back to available (clears order ref and reservation)
    pub async fn set_released(&self, table: &DiningTable) -> RepoResult<DiningTable> {
        let thing = self.thing_of(table)?;
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET status = 'AVAILABLE', current_order = NONE, \
                 reservation = NONE, merge_group = NONE, version = version + 1 \
                 WHERE version = $expected",
            )
            .bind(("thing", thing))
            .bind(("expected", table.version))
            .await?;
        self.cas_result(result.take(0)?, &table.name)
    }

    /// Reserve a table with the given metadata
    pub async fn set_reserved(
        &self,
        table: &DiningTable,
        reservation: Reservation,
    ) -> RepoResult<DiningTable> {
        let thing = self.thing_of(table)?;
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET status = 'RESERVED', reservation = $reservation, \
                 version = version + 1 \
                 WHERE version = $expected",
            )
            .bind(("thing", thing))
            .bind(("reservation", reservation))
            .bind(("expected", table.version))
            .await?;
        self.cas_result(result.take(0)?, &table.name)
    }

    /// Set or clear the merge group
    pub async fn set_merge_group(
        &self,
        table: &DiningTable,
        group: Option<String>,
    ) -> RepoResult<DiningTable> {
        let thing = self.thing_of(table)?;
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET merge_group = $group, version = version + 1 \
                 WHERE version = $expected",
            )
            .bind(("thing", thing))
            .bind(("group", group))
            .bind(("expected", table.version))
            .await?;
        self.cas_result(result.take(0)?, &table.name)
    }

    fn thing_of(&self, table: &DiningTable) -> RepoResult<RecordId> {
        table
            .id
            .clone()
            .ok_or_else(|| RepoError::Validation("Table has no ID".to_string()))
    }

    fn cas_result(&self, rows: Vec<DiningTable>, name: &str) -> RepoResult<DiningTable> {
        rows.into_iter().next().ok_or_else(|| {
            RepoError::Conflict(format!(
                "Table '{}' was modified concurrently, retry with fresh state",
                name
            ))
        })
    }
}
