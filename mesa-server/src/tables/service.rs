//! Table lifecycle operations
//!
//! 桌台状态变更全部走版本号 check-and-set，输掉竞争返回 Conflict。
//! 批量操作（合桌、拆桌、整单释放）逐桌执行并收集失败，不整体回滚。

use crate::db::models::{DiningTable, Reservation, TableStatus};
use crate::db::repository::{DiningTableRepository, OrderRepository, RepoError, parse_record_id};
use crate::orders::cache::OrderCache;
use crate::utils::error::{AppError, AppResult};
use crate::utils::time::{minutes_to_millis, now_millis};
use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Per-member failure in a multi-table operation
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub table_id: String,
    pub error: String,
}

/// Result of a multi-table operation. Failures are collected, never fatal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    pub succeeded: Vec<String>,
    pub failed: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Result of merging tables into one group
#[derive(Debug, Clone, Serialize)]
pub struct MergeResult {
    pub merge_group: String,
    /// First requested table, the one guests are seated at
    pub primary: String,
    pub outcome: BatchOutcome,
}

#[derive(Clone)]
pub struct TableService {
    tables: DiningTableRepository,
    orders: OrderRepository,
    cache: OrderCache,
    expiry_minutes: i64,
}

impl TableService {
    pub fn new(db: Surreal<Db>, cache: OrderCache, expiry_minutes: i64) -> Self {
        Self {
            tables: DiningTableRepository::new(db.clone()),
            orders: OrderRepository::new(db),
            cache,
            expiry_minutes,
        }
    }

    pub fn repository(&self) -> &DiningTableRepository {
        &self.tables
    }

    /// Reserve an available table.
    ///
    /// The reservation expires `expiry_minutes` after now; the sweep task
    /// releases it if nobody shows up.
    pub async fn reserve(
        &self,
        table_id: &str,
        customer_name: String,
        customer_phone: Option<String>,
    ) -> AppResult<DiningTable> {
        let table = self.tables.get(table_id).await?;
        if table.status != TableStatus::Available {
            return Err(AppError::business_rule(format!(
                "Table '{}' is {:?}, only available tables can be reserved",
                table.name, table.status
            )));
        }

        let reservation = Reservation {
            customer_name,
            customer_phone,
            reserved_until: now_millis() + minutes_to_millis(self.expiry_minutes),
        };
        let updated = self.tables.set_reserved(&table, reservation).await?;
        tracing::info!(table = %updated.name, until = updated.reservation.as_ref().map(|r| r.reserved_until), "Table reserved");
        Ok(updated)
    }

    /// Release a table back to Available, clearing order, reservation and
    /// merge group.
    pub async fn release(&self, table_id: &str) -> AppResult<DiningTable> {
        let table = self.tables.get(table_id).await?;
        if table.status == TableStatus::Available {
            return Ok(table);
        }
        let updated = self.tables.set_released(&table).await?;
        tracing::info!(table = %updated.name, "Table released");
        Ok(updated)
    }

    /// Release every table an order holds.
    ///
    /// Each table is attempted independently; a failure is a consistency
    /// defect to flag, not a reason to abort the rest.
    ///
    /// Besides the listed tables, any table still pointing at the order is
    /// released too, so a stale `table_ids` list cannot strand a table.
    pub async fn release_for_order(&self, order_id: &str, table_ids: &[String]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        let mut targets: Vec<String> = table_ids.to_vec();
        if let Ok(order) = parse_record_id(order_id) {
            match self.tables.find_by_order(&order).await {
                Ok(found) => {
                    for table in found {
                        let id = table.id_string();
                        if !targets.contains(&id) {
                            targets.push(id);
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(order_id = %order_id, error = %err, "Occupant lookup failed during release");
                }
            }
        }
        for table_id in &targets {
            match self.try_release(table_id).await {
                Ok(()) => outcome.succeeded.push(table_id.clone()),
                Err(err) => {
                    tracing::warn!(table_id = %table_id, error = %err, "Failed to release table");
                    outcome.failed.push(BatchFailure {
                        table_id: table_id.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }
        outcome
    }

    async fn try_release(&self, table_id: &str) -> AppResult<()> {
        let table = self.tables.get(table_id).await?;
        if table.status != TableStatus::Available {
            self.tables.set_released(&table).await?;
        }
        Ok(())
    }

    /// Move an order from one table to another.
    ///
    /// The target must be Available. The target is claimed first; only then
    /// is the source released, so the order never ends up holding no table.
    pub async fn switch_table(
        &self,
        order_id: &str,
        from_table_id: &str,
        to_table_id: &str,
    ) -> AppResult<DiningTable> {
        let mut order = self.orders.get(order_id).await?;
        if order.status.is_terminal() {
            return Err(AppError::business_rule(format!(
                "Order {} is {:?}, cannot switch tables",
                order.order_number, order.status
            )));
        }
        if !order.table_ids.iter().any(|t| t.to_string() == from_table_id) {
            return Err(AppError::validation(format!(
                "Order {} does not occupy table {}",
                order.order_number, from_table_id
            )));
        }

        let target = self.tables.get(to_table_id).await?;
        if target.status != TableStatus::Available {
            return Err(AppError::business_rule(format!(
                "Table '{}' is {:?}, cannot move an order there",
                target.name, target.status
            )));
        }

        let order_rid = order
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Order has no ID"))?;
        let claimed = self.tables.set_occupied(&target, &order_rid).await?;

        // Source release failure leaves the table flagged, not the move undone
        if let Err(err) = self.try_release(from_table_id).await {
            tracing::warn!(table_id = %from_table_id, error = %err, "Source table not released after switch");
        }

        for tid in order.table_ids.iter_mut() {
            if tid.to_string() == from_table_id {
                *tid = claimed
                    .id
                    .clone()
                    .ok_or_else(|| AppError::internal("Table has no ID"))?;
            }
        }
        let expected = order.version;
        order.version += 1;
        order.updated_at = now_millis();
        let updated = self.orders.update_cas(order, expected).await?;
        if let Err(err) = self.cache.put_active(&updated) {
            tracing::warn!(error = %err, "Order cache refresh failed after table switch");
        }

        tracing::info!(order = %updated.order_number, from = %from_table_id, to = %to_table_id, "Order switched tables");
        Ok(claimed)
    }

    /// Merge two or more available tables into one group.
    ///
    /// The first requested table is the primary seat. Members that lose a
    /// concurrent race are reported in the outcome, not rolled back.
    pub async fn merge(&self, table_ids: &[String]) -> AppResult<MergeResult> {
        if table_ids.len() < 2 {
            return Err(AppError::validation("Merging requires at least 2 tables"));
        }

        let mut members = Vec::with_capacity(table_ids.len());
        for table_id in table_ids {
            let table = self.tables.get(table_id).await?;
            if table.status != TableStatus::Available {
                return Err(AppError::business_rule(format!(
                    "Table '{}' is {:?}, only available tables can merge",
                    table.name, table.status
                )));
            }
            members.push(table);
        }

        let group = uuid::Uuid::new_v4().to_string();
        let mut outcome = BatchOutcome::default();
        for table in &members {
            match self.tables.set_merge_group(table, Some(group.clone())).await {
                Ok(_) => outcome.succeeded.push(table.id_string()),
                Err(err) => outcome.failed.push(BatchFailure {
                    table_id: table.id_string(),
                    error: err.to_string(),
                }),
            }
        }

        tracing::info!(group = %group, members = outcome.succeeded.len(), "Tables merged");
        Ok(MergeResult {
            merge_group: group,
            primary: table_ids[0].clone(),
            outcome,
        })
    }

    /// Dissolve a merge group back into independent available tables
    pub async fn split(&self, merge_group: &str) -> AppResult<BatchOutcome> {
        let members = self.tables.find_by_merge_group(merge_group).await?;
        if members.is_empty() {
            return Err(AppError::not_found(format!(
                "Merge group {} not found",
                merge_group
            )));
        }

        let mut outcome = BatchOutcome::default();
        for table in &members {
            let result = if table.status == TableStatus::Available {
                self.tables.set_merge_group(table, None).await.map(|_| ())
            } else {
                self.tables.set_released(table).await.map(|_| ())
            };
            match result {
                Ok(()) => outcome
                    .succeeded
                    .push(table.id_string()),
                Err(err) => outcome.failed.push(BatchFailure {
                    table_id: table.id_string(),
                    error: err.to_string(),
                }),
            }
        }

        tracing::info!(group = %merge_group, members = outcome.succeeded.len(), "Merge group dissolved");
        Ok(outcome)
    }

    /// Release reserved tables whose reservation expired.
    ///
    /// Losing the version race means another terminal already acted on the
    /// table; the sweep skips it.
    pub async fn sweep_expired(&self) -> AppResult<usize> {
        let expired = self.tables.find_expired_reserved(now_millis()).await?;
        let mut released = 0;
        for table in &expired {
            match self.tables.set_released(table).await {
                Ok(_) => {
                    tracing::info!(table = %table.name, "Expired reservation released");
                    released += 1;
                }
                Err(RepoError::Conflict(_)) => {
                    tracing::debug!(table = %table.name, "Reservation changed concurrently, skipping");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(released)
    }
}
