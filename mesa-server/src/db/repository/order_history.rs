//! Order History Repository
//!
//! 终态订单的只读归档，结账/取消时写入一条。

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::OrderHistory;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "order_history";

#[derive(Clone)]
pub struct OrderHistoryRepository {
    base: BaseRepository,
}

impl OrderHistoryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, entry: OrderHistory) -> RepoResult<OrderHistory> {
        let created: Option<OrderHistory> = self.base.db().create(TABLE).content(entry).await?;
        created.ok_or_else(|| RepoError::Database("Failed to record order history".to_string()))
    }

    /// Newest first
    pub async fn find_recent(&self, limit: usize) -> RepoResult<Vec<OrderHistory>> {
        let entries: Vec<OrderHistory> = self
            .base
            .db()
            .query("SELECT * FROM order_history ORDER BY recorded_at DESC LIMIT $limit")
            .bind(("limit", limit))
            .await?
            .take(0)?;
        Ok(entries)
    }
}
