//! Order Service
//!
//! Every mutation follows the same shape: load the authoritative row,
//! validate the transition, recompute totals, write back with a version
//! check-and-set, then refresh or drop the cache entry. The cache is never
//! written before the database commit.

use crate::coupons::engine;
use crate::db::models::{CustomerDataUpsert, Order, OrderCreate, OrderHistory, TableStatus};
use crate::db::repository::{
    CouponRepository, CustomerRepository, OrderHistoryRepository, OrderRepository,
    parse_record_id,
};
use crate::orders::cache::OrderCache;
use crate::orders::totals::{self, TaxRates};
use crate::tables::{BatchOutcome, TableService};
use crate::utils::error::{AppError, AppResult};
use crate::utils::time::{now_millis, today_compact};
use serde::{Deserialize, Serialize};
use shared::order::{AppliedCoupon, AppliedDishCoupon, CustomerSource, OrderItem, OrderStatus};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Settlement payload: payment method plus optional customer details
#[derive(Debug, Clone, Deserialize)]
pub struct SettleRequest {
    pub payment_method: String,
    #[serde(default)]
    pub manager_id: Option<String>,
    #[serde(default)]
    pub customer: Option<CustomerDataUpsert>,
}

/// Settlement result: the terminal order plus the per-table release outcome
#[derive(Debug, Clone, Serialize)]
pub struct SettleResult {
    pub order: Order,
    pub tables: BatchOutcome,
}

#[derive(Clone)]
pub struct OrderService {
    orders: OrderRepository,
    coupons: CouponRepository,
    customers: CustomerRepository,
    history: OrderHistoryRepository,
    tables: TableService,
    cache: OrderCache,
    rates: TaxRates,
}

impl OrderService {
    pub fn new(db: Surreal<Db>, cache: OrderCache, tables: TableService, rates: TaxRates) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            coupons: CouponRepository::new(db.clone()),
            customers: CustomerRepository::new(db.clone()),
            history: OrderHistoryRepository::new(db),
            tables,
            cache,
            rates,
        }
    }

    // ========== Queries ==========

    pub async fn get(&self, order_id: &str) -> AppResult<Order> {
        Ok(self.orders.get(order_id).await?)
    }

    pub async fn list(&self) -> AppResult<Vec<Order>> {
        Ok(self.orders.find_all().await?)
    }

    /// Active orders, served from the redb cache
    pub fn active(&self) -> AppResult<Vec<Order>> {
        Ok(self.cache.active_orders()?)
    }

    /// Manager settlement queue (transferred, oldest first)
    pub async fn pending(&self) -> AppResult<Vec<Order>> {
        Ok(self.orders.find_by_status(OrderStatus::Transferred).await?)
    }

    // ========== Lifecycle ==========

    /// Open a new order, claiming any requested tables.
    ///
    /// Tables are claimed after the order row exists so they can reference
    /// it; if any claim loses its version race, already-claimed tables are
    /// released and the order row is removed again.
    pub async fn create(&self, data: OrderCreate) -> AppResult<Order> {
        let order_number = self.cache.next_order_number(&today_compact())?;
        let now = now_millis();

        let mut table_ids = Vec::with_capacity(data.table_ids.len());
        for raw in &data.table_ids {
            table_ids.push(parse_record_id(raw)?);
        }

        let order = Order {
            id: None,
            order_number,
            order_type: data.order_type,
            status: OrderStatus::Temporary,
            items: vec![],
            table_ids,
            location_id: data.location_id,
            subtotal: 0.0,
            cgst: 0.0,
            sgst: 0.0,
            service_charge: 0.0,
            applied_coupon: None,
            applied_dish_coupons: vec![],
            discount_total: 0.0,
            total: 0.0,
            original_total: 0.0,
            staff_id: data.staff_id,
            manager_id: None,
            created_at: now,
            updated_at: now,
            transferred_at: None,
            settled_at: None,
            cancelled_at: None,
            version: 1,
        };

        let created = self.orders.create(order).await?;
        let order_rid = created
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Created order has no ID"))?;

        let mut claimed: Vec<String> = Vec::new();
        for table_rid in &created.table_ids {
            let table_id = table_rid.to_string();
            let claim = async {
                let table = self.tables.repository().get(&table_id).await?;
                if table.status != TableStatus::Available
                    && table.status != TableStatus::Reserved
                {
                    return Err(AppError::business_rule(format!(
                        "Table '{}' is {:?}, cannot seat a new order",
                        table.name, table.status
                    )));
                }
                self.tables.repository().set_occupied(&table, &order_rid).await?;
                Ok::<(), AppError>(())
            };
            if let Err(err) = claim.await {
                self.rollback_creation(&created, &claimed).await;
                return Err(err);
            }
            claimed.push(table_id);
        }

        self.cache.put_active(&created)?;
        tracing::info!(order = %created.order_number, tables = claimed.len(), "Order created");
        Ok(created)
    }

    async fn rollback_creation(&self, order: &Order, claimed: &[String]) {
        let outcome = self
            .tables
            .release_for_order(&order.id_string(), claimed)
            .await;
        if !outcome.is_clean() {
            tracing::error!(order = %order.order_number, failed = outcome.failed.len(), "Rollback left tables claimed");
        }
        if let Err(err) = self.orders.delete(&order.id_string()).await {
            tracing::error!(order = %order.order_number, error = %err, "Failed to remove order after claim failure");
        }
    }

    /// Replace the order's line items.
    ///
    /// Allowed while Temporary or Ongoing; the first items promote a
    /// Temporary order to Ongoing.
    pub async fn update_items(&self, order_id: &str, items: Vec<OrderItem>) -> AppResult<Order> {
        let mut order = self.editable(order_id).await?;

        for item in &items {
            if item.quantity <= 0 {
                return Err(AppError::validation(format!(
                    "Item '{}' has non-positive quantity",
                    item.name
                )));
            }
            if !item.price.is_finite() || item.price < 0.0 {
                return Err(AppError::validation(format!(
                    "Item '{}' has an invalid price",
                    item.name
                )));
            }
        }

        if order.status == OrderStatus::Temporary && !items.is_empty() {
            order.status = OrderStatus::Ongoing;
        }
        order.items = items;
        totals::recompute(&mut order, &self.rates);
        self.persist(order).await
    }

    /// Apply an order-level coupon (at most one per order)
    pub async fn apply_coupon(&self, order_id: &str, coupon_id: &str) -> AppResult<Order> {
        let mut order = self.editable(order_id).await?;
        if order.applied_coupon.is_some() {
            return Err(AppError::business_rule(
                "Order already has a coupon, remove it first",
            ));
        }

        let coupon = self.coupons.get(coupon_id).await?;
        let discount = engine::coupon_discount(&coupon, order.subtotal)
            .map_err(|e| AppError::business_rule(e.to_string()))?;

        order.applied_coupon = Some(AppliedCoupon {
            coupon_id: coupon.id_string(),
            name: coupon.name,
            discount_type: coupon.discount_type,
            value: coupon.value,
            discount,
        });
        totals::recompute(&mut order, &self.rates);
        self.persist(order).await
    }

    pub async fn remove_coupon(&self, order_id: &str) -> AppResult<Order> {
        let mut order = self.editable(order_id).await?;
        if order.applied_coupon.take().is_none() {
            return Err(AppError::not_found("Order has no coupon applied"));
        }
        totals::recompute(&mut order, &self.rates);
        self.persist(order).await
    }

    /// Apply a dish coupon (one per distinct dish name, case-insensitive)
    pub async fn apply_dish_coupon(&self, order_id: &str, dish_coupon_id: &str) -> AppResult<Order> {
        let mut order = self.editable(order_id).await?;

        let coupon = self
            .coupons
            .find_dish_by_id(dish_coupon_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Dish coupon {} not found", dish_coupon_id)))?;
        if !coupon.is_active {
            return Err(AppError::business_rule(format!(
                "Dish coupon {} is not active",
                coupon.code
            )));
        }
        if !engine::can_apply_dish_coupon(&order.applied_dish_coupons, &coupon.dish_name) {
            return Err(AppError::business_rule(format!(
                "A coupon for '{}' is already applied",
                coupon.dish_name
            )));
        }
        if !order
            .items
            .iter()
            .any(|item| item.name.eq_ignore_ascii_case(&coupon.dish_name))
        {
            return Err(AppError::business_rule(format!(
                "Order has no line for '{}'",
                coupon.dish_name
            )));
        }

        order.applied_dish_coupons.push(AppliedDishCoupon {
            coupon_id: coupon.id_string(),
            code: coupon.code,
            dish_name: coupon.dish_name,
            percentage: coupon.percentage,
        });
        totals::recompute(&mut order, &self.rates);
        self.persist(order).await
    }

    pub async fn remove_dish_coupon(&self, order_id: &str, code: &str) -> AppResult<Order> {
        let mut order = self.editable(order_id).await?;
        let before = order.applied_dish_coupons.len();
        order.applied_dish_coupons.retain(|c| c.code != code);
        if order.applied_dish_coupons.len() == before {
            return Err(AppError::not_found(format!(
                "Dish coupon '{}' is not applied to this order",
                code
            )));
        }
        totals::recompute(&mut order, &self.rates);
        self.persist(order).await
    }

    /// Hand the order to the manager settlement queue
    pub async fn transfer(&self, order_id: &str) -> AppResult<Order> {
        let mut order = self.orders.get(order_id).await?;
        self.check_transition(&order, OrderStatus::Transferred)?;
        order.status = OrderStatus::Transferred;
        order.transferred_at = Some(now_millis());
        let updated = self.persist(order).await?;
        tracing::info!(order = %updated.order_number, "Order transferred for settlement");
        Ok(updated)
    }

    /// Settle a transferred order.
    ///
    /// Tables are released one by one; failures are collected into the
    /// result rather than aborting the settlement.
    pub async fn settle(&self, order_id: &str, request: SettleRequest) -> AppResult<SettleResult> {
        let mut order = self.orders.get(order_id).await?;
        self.check_transition(&order, OrderStatus::Settled)?;

        order.status = OrderStatus::Settled;
        order.settled_at = Some(now_millis());
        order.manager_id = request.manager_id.clone();
        let settled = self.persist(order).await?;

        let table_ids: Vec<String> = settled.table_ids.iter().map(|t| t.to_string()).collect();
        let tables = self
            .tables
            .release_for_order(&settled.id_string(), &table_ids)
            .await;

        let mut customer = request.customer.unwrap_or(CustomerDataUpsert {
            name: None,
            phone: None,
            city: None,
            payment_method: None,
            source: CustomerSource::Manager,
        });
        customer.payment_method = Some(request.payment_method);
        self.customers
            .upsert_for_order(&settled.id_string(), customer)
            .await?;

        self.record_history(&settled, request.manager_id).await;

        tracing::info!(order = %settled.order_number, total = settled.total, "Order settled");
        Ok(SettleResult {
            order: settled,
            tables,
        })
    }

    /// Cancel a non-terminal order, releasing its tables
    pub async fn cancel(&self, order_id: &str, operator_id: Option<String>) -> AppResult<SettleResult> {
        let mut order = self.orders.get(order_id).await?;
        self.check_transition(&order, OrderStatus::Cancelled)?;

        order.status = OrderStatus::Cancelled;
        order.cancelled_at = Some(now_millis());
        let cancelled = self.persist(order).await?;

        let table_ids: Vec<String> = cancelled.table_ids.iter().map(|t| t.to_string()).collect();
        let tables = self
            .tables
            .release_for_order(&cancelled.id_string(), &table_ids)
            .await;

        self.record_history(&cancelled, operator_id).await;

        tracing::info!(order = %cancelled.order_number, "Order cancelled");
        Ok(SettleResult {
            order: cancelled,
            tables,
        })
    }

    // ========== Internals ==========

    async fn editable(&self, order_id: &str) -> AppResult<Order> {
        let order = self.orders.get(order_id).await?;
        if !order.status.is_editable() {
            return Err(AppError::business_rule(format!(
                "Order {} is {:?} and read-only",
                order.order_number, order.status
            )));
        }
        Ok(order)
    }

    fn check_transition(&self, order: &Order, target: OrderStatus) -> AppResult<()> {
        if !order.status.can_transition_to(target) {
            return Err(AppError::business_rule(format!(
                "Order {} cannot go from {:?} to {:?}",
                order.order_number, order.status, target
            )));
        }
        Ok(())
    }

    /// Check-and-set write, then cache refresh (or removal on terminal state)
    async fn persist(&self, mut order: Order) -> AppResult<Order> {
        let expected = order.version;
        order.version += 1;
        order.updated_at = now_millis();
        let updated = self.orders.update_cas(order, expected).await?;

        if updated.status.is_terminal() {
            self.cache.remove(&updated.id_string())?;
        } else {
            self.cache.put_active(&updated)?;
        }
        Ok(updated)
    }

    /// History write failures are logged, never surfaced: the settlement
    /// itself already committed.
    async fn record_history(&self, order: &Order, operator_id: Option<String>) {
        let entry = OrderHistory {
            id: None,
            order: match order.id.clone() {
                Some(id) => id,
                None => return,
            },
            order_number: order.order_number.clone(),
            final_status: order.status,
            total: order.total,
            operator_id,
            recorded_at: now_millis(),
        };
        if let Err(err) = self.history.create(entry).await {
            tracing::error!(order = %order.order_number, error = %err, "Failed to write order history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::{CouponCreate, DiningTableCreate};
    use shared::order::{DiscountType, OrderType};

    const RATES: TaxRates = TaxRates {
        cgst_rate: 2.5,
        sgst_rate: 2.5,
        service_charge_rate: 0.0,
    };

    async fn services() -> (OrderService, TableService) {
        let db = DbService::new_mem().await.unwrap();
        let cache = OrderCache::open_in_memory().unwrap();
        let tables = TableService::new(db.db.clone(), cache.clone(), 120);
        let orders = OrderService::new(db.db.clone(), cache, tables.clone(), RATES);
        (orders, tables)
    }

    async fn make_table(tables: &TableService, name: &str) -> String {
        tables
            .repository()
            .create(DiningTableCreate {
                name: name.to_string(),
                capacity: Some(4),
                location_id: None,
            })
            .await
            .unwrap()
            .id_string()
    }

    fn dine_in(table_ids: Vec<String>) -> OrderCreate {
        OrderCreate {
            order_type: OrderType::DineIn,
            table_ids,
            location_id: None,
            staff_id: Some("staff_1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_claims_tables() {
        let (orders, tables) = services().await;
        let table_id = make_table(&tables, "T1").await;

        let order = orders.create(dine_in(vec![table_id.clone()])).await.unwrap();
        assert_eq!(order.status, OrderStatus::Temporary);
        assert!(order.order_number.starts_with("ORD"));

        let table = tables.repository().get(&table_id).await.unwrap();
        assert_eq!(table.status, TableStatus::Occupied);
        assert_eq!(
            table.current_order.as_ref().map(|o| o.to_string()),
            Some(order.id_string())
        );

        // Active cache mirrors the new order
        assert_eq!(orders.active().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_rolls_back_when_table_occupied() {
        let (orders, tables) = services().await;
        let table_id = make_table(&tables, "T2").await;

        orders.create(dine_in(vec![table_id.clone()])).await.unwrap();
        let err = orders.create(dine_in(vec![table_id])).await;
        assert!(err.is_err());

        // Only the first order survives
        assert_eq!(orders.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_first_items_promote_to_ongoing() {
        let (orders, _) = services().await;
        let order = orders.create(dine_in(vec![])).await.unwrap();

        let updated = orders
            .update_items(
                &order.id_string(),
                vec![OrderItem::new("Dal Makhani", 220.0, 2)],
            )
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Ongoing);
        assert_eq!(updated.subtotal, 440.0);
        assert_eq!(updated.total, 462.0);
        assert_eq!(updated.version, 2);
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let (orders, tables) = services().await;
        let table_id = make_table(&tables, "T3").await;
        let order = orders.create(dine_in(vec![table_id.clone()])).await.unwrap();
        let id = order.id_string();

        orders
            .update_items(&id, vec![OrderItem::new("Thali", 300.0, 2)])
            .await
            .unwrap();
        let transferred = orders.transfer(&id).await.unwrap();
        assert_eq!(transferred.status, OrderStatus::Transferred);
        assert!(transferred.transferred_at.is_some());

        // Transferred orders show in the manager queue and are read-only
        assert_eq!(orders.pending().await.unwrap().len(), 1);
        assert!(
            orders
                .update_items(&id, vec![OrderItem::new("Chai", 20.0, 1)])
                .await
                .is_err()
        );

        let result = orders
            .settle(
                &id,
                SettleRequest {
                    payment_method: "UPI".to_string(),
                    manager_id: Some("mgr_1".to_string()),
                    customer: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(result.order.status, OrderStatus::Settled);
        assert!(result.tables.is_clean());

        // Table released, cache entry dropped
        let table = tables.repository().get(&table_id).await.unwrap();
        assert_eq!(table.status, TableStatus::Available);
        assert!(table.current_order.is_none());
        assert!(orders.active().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_lifecycle_shortcuts() {
        let (orders, _) = services().await;
        let order = orders.create(dine_in(vec![])).await.unwrap();
        let id = order.id_string();

        // Temporary cannot transfer or settle
        assert!(orders.transfer(&id).await.is_err());
        assert!(
            orders
                .settle(
                    &id,
                    SettleRequest {
                        payment_method: "CASH".to_string(),
                        manager_id: None,
                        customer: None,
                    }
                )
                .await
                .is_err()
        );

        // Ongoing cannot settle without transferring first
        orders
            .update_items(&id, vec![OrderItem::new("Chai", 20.0, 1)])
            .await
            .unwrap();
        assert!(
            orders
                .settle(
                    &id,
                    SettleRequest {
                        payment_method: "CASH".to_string(),
                        manager_id: None,
                        customer: None,
                    }
                )
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_cancel_releases_tables_and_is_final() {
        let (orders, tables) = services().await;
        let table_id = make_table(&tables, "T4").await;
        let order = orders.create(dine_in(vec![table_id.clone()])).await.unwrap();
        let id = order.id_string();

        let result = orders.cancel(&id, Some("staff_1".to_string())).await.unwrap();
        assert_eq!(result.order.status, OrderStatus::Cancelled);
        assert!(result.tables.is_clean());

        let table = tables.repository().get(&table_id).await.unwrap();
        assert_eq!(table.status, TableStatus::Available);

        // Terminal states accept nothing
        assert!(orders.cancel(&id, None).await.is_err());
        assert!(orders.transfer(&id).await.is_err());
    }

    #[tokio::test]
    async fn test_apply_coupon_respects_min_order() {
        let (orders, _) = services().await;
        let order = orders.create(dine_in(vec![])).await.unwrap();
        let id = order.id_string();
        orders
            .update_items(&id, vec![OrderItem::new("Chai", 20.0, 2)])
            .await
            .unwrap();

        let coupon = orders
            .coupons
            .create(CouponCreate {
                name: "FLAT50".to_string(),
                discount_type: DiscountType::Fixed,
                value: 50.0,
                max_discount: None,
                min_order_amount: Some(200.0),
                location_id: None,
            })
            .await
            .unwrap();

        // Subtotal 40 is below the 200 threshold
        assert!(orders.apply_coupon(&id, &coupon.id_string()).await.is_err());

        orders
            .update_items(&id, vec![OrderItem::new("Thali", 300.0, 1)])
            .await
            .unwrap();
        let updated = orders.apply_coupon(&id, &coupon.id_string()).await.unwrap();
        assert_eq!(updated.discount_total, 50.0);
        assert_eq!(updated.applied_coupon.as_ref().unwrap().name, "FLAT50");

        // At most one order-level coupon
        assert!(orders.apply_coupon(&id, &coupon.id_string()).await.is_err());

        let removed = orders.remove_coupon(&id).await.unwrap();
        assert!(removed.applied_coupon.is_none());
        assert_eq!(removed.discount_total, 0.0);
    }

    #[tokio::test]
    async fn test_dish_coupon_one_per_dish_and_floored() {
        let (orders, _) = services().await;
        let order = orders.create(dine_in(vec![])).await.unwrap();
        let id = order.id_string();
        orders
            .update_items(&id, vec![OrderItem::new("Paneer Tikka", 169.0, 2)])
            .await
            .unwrap();

        let batch = orders
            .coupons
            .create_dish_coupons(None, "Paneer Tikka", &[8.0, 10.0])
            .await
            .unwrap();
        assert_eq!(batch.created.len(), 2);

        let first = &batch.created[0];
        let updated = orders.apply_dish_coupon(&id, &first.id_string()).await.unwrap();
        // floor(169 * 8%) = 13, once per line
        assert_eq!(updated.discount_total, 13.0);

        // Second coupon for the same dish is rejected
        let second = &batch.created[1];
        assert!(orders.apply_dish_coupon(&id, &second.id_string()).await.is_err());

        let removed = orders.remove_dish_coupon(&id, &first.code).await.unwrap();
        assert!(removed.applied_dish_coupons.is_empty());
        assert_eq!(removed.discount_total, 0.0);
    }

    #[tokio::test]
    async fn test_dish_coupon_requires_matching_line() {
        let (orders, _) = services().await;
        let order = orders.create(dine_in(vec![])).await.unwrap();
        let id = order.id_string();
        orders
            .update_items(&id, vec![OrderItem::new("Chai", 20.0, 1)])
            .await
            .unwrap();

        let batch = orders
            .coupons
            .create_dish_coupons(None, "Paneer Tikka", &[8.0])
            .await
            .unwrap();
        assert!(
            orders
                .apply_dish_coupon(&id, &batch.created[0].id_string())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_settle_records_customer_and_history() {
        let (orders, _) = services().await;
        let order = orders.create(dine_in(vec![])).await.unwrap();
        let id = order.id_string();
        orders
            .update_items(&id, vec![OrderItem::new("Thali", 300.0, 1)])
            .await
            .unwrap();
        orders.transfer(&id).await.unwrap();

        orders
            .settle(
                &id,
                SettleRequest {
                    payment_method: "CARD".to_string(),
                    manager_id: Some("mgr_1".to_string()),
                    customer: Some(CustomerDataUpsert {
                        name: Some("Asha".to_string()),
                        phone: Some("9876543210".to_string()),
                        city: Some("Pune".to_string()),
                        payment_method: None,
                        source: CustomerSource::Manager,
                    }),
                },
            )
            .await
            .unwrap();

        let customer = orders.customers.find_by_order(&id).await.unwrap().unwrap();
        assert_eq!(customer.name.as_deref(), Some("Asha"));
        assert_eq!(customer.payment_method.as_deref(), Some("CARD"));

        let history = orders.history.find_recent(10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].final_status, OrderStatus::Settled);
    }

    #[tokio::test]
    async fn test_stale_version_write_conflicts() {
        let (orders, _) = services().await;
        let order = orders.create(dine_in(vec![])).await.unwrap();
        let id = order.id_string();

        // Both writers loaded version 1; the second write must lose
        let stale = orders.get(&id).await.unwrap();
        orders
            .update_items(&id, vec![OrderItem::new("Chai", 20.0, 1)])
            .await
            .unwrap();

        let result = orders.orders.update_cas(stale.clone(), stale.version).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_settle_with_capped_coupon_releases_all_tables() {
        let (orders, tables) = services().await;
        let t1 = make_table(&tables, "T1").await;
        let t2 = make_table(&tables, "T2").await;
        let order = orders
            .create(dine_in(vec![t1.clone(), t2.clone()]))
            .await
            .unwrap();
        let id = order.id_string();

        orders
            .update_items(
                &id,
                vec![
                    OrderItem::new("Veg Biryani", 180.0, 1),
                    OrderItem::new("Dal Makhani", 120.0, 1),
                ],
            )
            .await
            .unwrap();

        let coupon = orders
            .coupons
            .create(CouponCreate {
                name: "TEN".to_string(),
                discount_type: DiscountType::Percentage,
                value: 10.0,
                max_discount: Some(20.0),
                min_order_amount: None,
                location_id: None,
            })
            .await
            .unwrap();

        // 10% of 300 is 30, capped at 20; taxes 2.5% + 2.5% on subtotal
        let updated = orders.apply_coupon(&id, &coupon.id_string()).await.unwrap();
        assert_eq!(updated.subtotal, 300.0);
        assert_eq!(updated.discount_total, 20.0);
        assert_eq!(updated.total, 295.0);

        orders.transfer(&id).await.unwrap();
        let result = orders
            .settle(
                &id,
                SettleRequest {
                    payment_method: "CASH".to_string(),
                    manager_id: Some("mgr_1".to_string()),
                    customer: None,
                },
            )
            .await
            .unwrap();
        assert!(result.tables.is_clean());

        for table_id in [&t1, &t2] {
            let table = tables.repository().get(table_id).await.unwrap();
            assert_eq!(table.status, TableStatus::Available);
            assert!(table.current_order.is_none());
        }
    }
}
