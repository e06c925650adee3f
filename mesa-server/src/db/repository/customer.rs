//! Customer Data Repository
//!
//! 客户资料在结账时登记，每个订单最多一条记录。

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{CustomerData, CustomerDataUpsert};
use crate::utils::time::now_millis;
use shared::order::CustomerSource;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "customer_data";

#[derive(Clone)]
pub struct CustomerRepository {
    base: BaseRepository,
}

impl CustomerRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All records, newest first (export reads this)
    pub async fn find_all(&self) -> RepoResult<Vec<CustomerData>> {
        let records: Vec<CustomerData> = self
            .base
            .db()
            .query("SELECT * FROM customer_data ORDER BY collected_at DESC")
            .await?
            .take(0)?;
        Ok(records)
    }

    pub async fn find_by_order(&self, order_id: &str) -> RepoResult<Option<CustomerData>> {
        // `order` 持久化为 "table:id" 字符串，按同一形式比较
        let order = parse_record_id(order_id)?;
        let record: Option<CustomerData> = self
            .base
            .db()
            .query("SELECT * FROM customer_data WHERE order = $order LIMIT 1")
            .bind(("order", order.to_string()))
            .await?
            .take(0)?;
        Ok(record)
    }

    /// Create or update the record for an order.
    ///
    /// A record whose source is `Staff` keeps that source forever: a later
    /// manager-side write updates the fields but never downgrades the source.
    pub async fn upsert_for_order(
        &self,
        order_id: &str,
        data: CustomerDataUpsert,
    ) -> RepoResult<CustomerData> {
        let order = parse_record_id(order_id)?;

        match self.find_by_order(order_id).await? {
            Some(existing) => {
                let id = existing.id.clone().ok_or_else(|| {
                    RepoError::Database("customer_data record missing id".to_string())
                })?;
                let source = if existing.source == CustomerSource::Staff {
                    CustomerSource::Staff
                } else {
                    data.source
                };
                let updated: Option<CustomerData> = self
                    .base
                    .db()
                    .query(
                        "UPDATE $thing SET name = $name, phone = $phone, city = $city, \
                         payment_method = $payment_method, source = $source \
                         RETURN AFTER",
                    )
                    .bind(("thing", id))
                    .bind(("name", data.name))
                    .bind(("phone", data.phone))
                    .bind(("city", data.city))
                    .bind(("payment_method", data.payment_method))
                    .bind(("source", source))
                    .await?
                    .take(0)?;
                updated.ok_or_else(|| {
                    RepoError::Database("Failed to update customer data".to_string())
                })
            }
            None => {
                let record = CustomerData {
                    id: None,
                    order,
                    name: data.name,
                    phone: data.phone,
                    city: data.city,
                    payment_method: data.payment_method,
                    source: data.source,
                    collected_at: now_millis(),
                };
                let created: Option<CustomerData> =
                    self.base.db().create(TABLE).content(record).await?;
                created.ok_or_else(|| {
                    RepoError::Database("Failed to create customer data".to_string())
                })
            }
        }
    }
}
