//! Order Repository
//!
//! 订单整体以文档形式写入；更新走 `UPDATE ... CONTENT ... WHERE version`
//! 的 check-and-set，写入内容由调用方先把 version +1。

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::Order;
use shared::order::OrderStatus;
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

const TABLE: &str = "order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Persist a new order
    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Find order by id
    /// Hard delete, used to roll back a creation whose table claim failed
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_id(id)?;
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let thing = parse_record_id(id)?;
        let order: Option<Order> = self.base.db().select(thing).await?;
        Ok(order)
    }

    /// Find order by id, erroring when missing
    pub async fn get(&self, id: &str) -> RepoResult<Order> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }

    /// All orders, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Orders in a given lifecycle state, oldest first (queue semantics)
    pub async fn find_by_status(&self, status: OrderStatus) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE status = $status ORDER BY created_at ASC")
            .bind(("status", status))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Check-and-set update of the whole order document.
    ///
    /// `order.version` must already be bumped by the caller; `expected` is the
    /// version read before mutation. An empty update set means a concurrent
    /// writer won the race.
    pub async fn update_cas(&self, order: Order, expected: u64) -> RepoResult<Order> {
        let thing = order
            .id
            .clone()
            .ok_or_else(|| RepoError::Validation("Order has no ID".to_string()))?;
        let order_number = order.order_number.clone();
        // CONTENT 不能携带字符串形式的 id，目标记录已由 $thing 指定
        let doc = Order { id: None, ..order };
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing CONTENT $order WHERE version = $expected")
            .bind(("thing", thing))
            .bind(("order", doc))
            .bind(("expected", expected))
            .await?;
        let rows: Vec<Order> = result.take(0)?;
        rows.into_iter().next().ok_or_else(|| {
            RepoError::Conflict(format!(
                "Order {} was modified concurrently, retry with fresh state",
                order_number
            ))
        })
    }
}
