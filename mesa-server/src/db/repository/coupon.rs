//! Coupon Repository
//!
//! 订单级优惠券 CRUD + 菜品优惠券批量创建（去重保护）。

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::coupons::engine::generate_code;
use crate::db::models::{Coupon, CouponCreate, CouponUpdate, DishCoupon};
use crate::utils::time::now_millis;
use serde::Serialize;
use shared::order::DiscountType;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const COUPON_TABLE: &str = "coupon";
const DISH_COUPON_TABLE: &str = "dish_coupon";

/// Outcome of a dish-coupon bulk create
#[derive(Debug, Clone, Serialize)]
pub struct DishCouponBatchResult {
    pub created: Vec<DishCoupon>,
    /// Percentages skipped because an active coupon already existed
    pub skipped: Vec<f64>,
}

#[derive(Clone)]
pub struct CouponRepository {
    base: BaseRepository,
}

impl CouponRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    // ========== Order-level coupons ==========

    /// All coupons, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Coupon>> {
        let coupons: Vec<Coupon> = self
            .base
            .db()
            .query("SELECT * FROM coupon ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(coupons)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Coupon>> {
        let thing = parse_record_id(id)?;
        let coupon: Option<Coupon> = self.base.db().select(thing).await?;
        Ok(coupon)
    }

    pub async fn get(&self, id: &str) -> RepoResult<Coupon> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Coupon {} not found", id)))
    }

    /// Create an order-level coupon.
    ///
    /// Percentage coupons must carry a max-discount cap.
    pub async fn create(&self, data: CouponCreate) -> RepoResult<Coupon> {
        if data.name.trim().is_empty() {
            return Err(RepoError::Validation(
                "Coupon name must not be empty".to_string(),
            ));
        }
        match data.discount_type {
            DiscountType::Fixed => {
                if !data.value.is_finite() || data.value <= 0.0 {
                    return Err(RepoError::Validation(format!(
                        "Fixed coupon value must be positive (got {})",
                        data.value
                    )));
                }
            }
            DiscountType::Percentage => {
                if !(data.value > 0.0 && data.value <= 100.0) {
                    return Err(RepoError::Validation(format!(
                        "Percentage must be between 0 and 100 (got {})",
                        data.value
                    )));
                }
            }
        }
        if data.discount_type == DiscountType::Percentage && data.max_discount.is_none() {
            return Err(RepoError::Validation(
                "Percentage coupons require max_discount".to_string(),
            ));
        }

        let coupon = Coupon {
            id: None,
            name: data.name,
            discount_type: data.discount_type,
            value: data.value,
            max_discount: data.max_discount,
            min_order_amount: data.min_order_amount,
            is_active: true,
            location_id: data.location_id,
            created_at: now_millis(),
        };

        let created: Option<Coupon> = self.base.db().create(COUPON_TABLE).content(coupon).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create coupon".to_string()))
    }

    pub async fn update(&self, id: &str, data: CouponUpdate) -> RepoResult<Coupon> {
        let thing = parse_record_id(id)?;
        let existing = self.get(id).await?;

        let name = data.name.unwrap_or(existing.name);
        let value = data.value.unwrap_or(existing.value);
        let max_discount = data.max_discount.or(existing.max_discount);
        let min_order_amount = data.min_order_amount.or(existing.min_order_amount);
        let is_active = data.is_active.unwrap_or(existing.is_active);

        if existing.discount_type == DiscountType::Percentage && max_discount.is_none() {
            return Err(RepoError::Validation(
                "Percentage coupons require max_discount".to_string(),
            ));
        }
        if existing.discount_type == DiscountType::Percentage && !(value > 0.0 && value <= 100.0) {
            return Err(RepoError::Validation(format!(
                "Percentage must be between 0 and 100 (got {})",
                value
            )));
        }

        self.base
            .db()
            .query(
                "UPDATE $thing SET name = $name, value = $value, max_discount = $max_discount, \
                 min_order_amount = $min_order_amount, is_active = $is_active",
            )
            .bind(("thing", thing))
            .bind(("name", name))
            .bind(("value", value))
            .bind(("max_discount", max_discount))
            .bind(("min_order_amount", min_order_amount))
            .bind(("is_active", is_active))
            .await?;

        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_id(id)?;
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }

    // ========== Dish coupons ==========

    /// All dish coupons, newest first
    pub async fn find_all_dish(&self) -> RepoResult<Vec<DishCoupon>> {
        let coupons: Vec<DishCoupon> = self
            .base
            .db()
            .query("SELECT * FROM dish_coupon ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(coupons)
    }

    pub async fn find_dish_by_id(&self, id: &str) -> RepoResult<Option<DishCoupon>> {
        let thing = parse_record_id(id)?;
        let coupon: Option<DishCoupon> = self.base.db().select(thing).await?;
        Ok(coupon)
    }

    /// Active dish coupons for a (location, dish) pair.
    ///
    /// Dish name matching is case-insensitive; the stored name keeps its
    /// original casing for display.
    pub async fn find_active_dish_coupons(
        &self,
        location_id: Option<&str>,
        dish_name: &str,
    ) -> RepoResult<Vec<DishCoupon>> {
        let coupons: Vec<DishCoupon> = self
            .base
            .db()
            .query(
                "SELECT * FROM dish_coupon \
                 WHERE is_active = true \
                 AND string::lowercase(dish_name) = string::lowercase($dish) \
                 AND location_id = $location",
            )
            .bind(("dish", dish_name.to_string()))
            .bind(("location", location_id.map(str::to_string)))
            .await?
            .take(0)?;
        Ok(coupons)
    }

    /// Bulk-create dish coupons for one dish.
    ///
    /// Percentages already covered by an active coupon for the same
    /// (location, dish) pair are silently skipped. If every requested
    /// percentage is a duplicate, fails with an error listing the existing
    /// percentages — the uniqueness key is (location, dish, percentage),
    /// never the generated display code.
    pub async fn create_dish_coupons(
        &self,
        location_id: Option<String>,
        dish_name: &str,
        percentages: &[f64],
    ) -> RepoResult<DishCouponBatchResult> {
        if dish_name.trim().is_empty() {
            return Err(RepoError::Validation(
                "Dish name must not be empty".to_string(),
            ));
        }
        for pct in percentages {
            if !(*pct > 0.0 && *pct <= 100.0) {
                return Err(RepoError::Validation(format!(
                    "Percentage must be between 0 and 100 (got {})",
                    pct
                )));
            }
        }

        let existing = self
            .find_active_dish_coupons(location_id.as_deref(), dish_name)
            .await?;
        let existing_pcts: Vec<f64> = existing.iter().map(|c| c.percentage).collect();

        let (fresh, skipped): (Vec<f64>, Vec<f64>) = percentages
            .iter()
            .copied()
            .partition(|p| !existing_pcts.iter().any(|e| (e - p).abs() < f64::EPSILON));

        if fresh.is_empty() {
            return Err(RepoError::Duplicate(format!(
                "All requested percentages already exist for '{}': {:?}",
                dish_name, existing_pcts
            )));
        }

        let now = now_millis();
        let mut created = Vec::with_capacity(fresh.len());
        for pct in fresh {
            let coupon = DishCoupon {
                id: None,
                code: generate_code(dish_name, pct),
                dish_name: dish_name.to_string(),
                percentage: pct,
                is_active: true,
                location_id: location_id.clone(),
                created_at: now,
            };
            let row: Option<DishCoupon> = self
                .base
                .db()
                .create(DISH_COUPON_TABLE)
                .content(coupon)
                .await?;
            created.push(
                row.ok_or_else(|| RepoError::Database("Failed to create dish coupon".to_string()))?,
            );
        }

        Ok(DishCouponBatchResult { created, skipped })
    }

    /// Deactivate a dish coupon
    pub async fn deactivate_dish(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_id(id)?;
        self.base
            .db()
            .query("UPDATE $thing SET is_active = false")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn repo() -> CouponRepository {
        let db = DbService::new_mem().await.unwrap();
        CouponRepository::new(db.db.clone())
    }

    #[tokio::test]
    async fn test_percentage_coupon_requires_cap() {
        let repo = repo().await;
        let result = repo
            .create(CouponCreate {
                name: "Ten Percent".to_string(),
                discount_type: DiscountType::Percentage,
                value: 10.0,
                max_discount: None,
                min_order_amount: None,
                location_id: None,
            })
            .await;
        assert!(matches!(result, Err(RepoError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_out_of_range_values() {
        let repo = repo().await;

        // 150% 折扣率
        let result = repo
            .create(CouponCreate {
                name: "TOOBIG".to_string(),
                discount_type: DiscountType::Percentage,
                value: 150.0,
                max_discount: Some(20.0),
                min_order_amount: None,
                location_id: None,
            })
            .await;
        assert!(matches!(result, Err(RepoError::Validation(_))));

        // 空名称
        let result = repo
            .create(CouponCreate {
                name: "  ".to_string(),
                discount_type: DiscountType::Fixed,
                value: 50.0,
                max_discount: None,
                min_order_amount: None,
                location_id: None,
            })
            .await;
        assert!(matches!(result, Err(RepoError::Validation(_))));

        // 负面值
        let result = repo
            .create(CouponCreate {
                name: "NEG".to_string(),
                discount_type: DiscountType::Fixed,
                value: -5.0,
                max_discount: None,
                min_order_amount: None,
                location_id: None,
            })
            .await;
        assert!(matches!(result, Err(RepoError::Validation(_))));
    }

    #[tokio::test]
    async fn test_dish_coupon_rejects_invalid_input_before_write() {
        let repo = repo().await;

        let result = repo.create_dish_coupons(None, "Paneer Tikka", &[150.0]).await;
        assert!(matches!(result, Err(RepoError::Validation(_))));

        let result = repo.create_dish_coupons(None, "", &[8.0]).await;
        assert!(matches!(result, Err(RepoError::Validation(_))));

        // Nothing was persisted by the rejected calls
        assert!(repo.find_all_dish().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dish_coupon_bulk_skips_duplicates() {
        let repo = repo().await;
        repo.create_dish_coupons(None, "Paneer Tikka", &[8.0])
            .await
            .unwrap();

        // 8% exists, so only the 10% coupon is created
        let batch = repo
            .create_dish_coupons(None, "Paneer Tikka", &[8.0, 10.0])
            .await
            .unwrap();
        assert_eq!(batch.created.len(), 1);
        assert_eq!(batch.created[0].percentage, 10.0);
        assert_eq!(batch.skipped, vec![8.0]);
    }

    #[tokio::test]
    async fn test_dish_coupon_all_duplicates_is_error() {
        let repo = repo().await;
        repo.create_dish_coupons(None, "Dal Makhani", &[12.5])
            .await
            .unwrap();

        let result = repo.create_dish_coupons(None, "Dal Makhani", &[12.5]).await;
        assert!(matches!(result, Err(RepoError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_deactivated_coupon_frees_percentage() {
        let repo = repo().await;
        let batch = repo
            .create_dish_coupons(None, "Veg Biryani", &[10.0])
            .await
            .unwrap();
        let id = batch.created[0].id_string();

        repo.deactivate_dish(&id).await.unwrap();

        // 停用后同折扣率可重新创建
        let batch = repo
            .create_dish_coupons(None, "Veg Biryani", &[10.0])
            .await
            .unwrap();
        assert_eq!(batch.created.len(), 1);
        assert!(batch.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_dish_match_is_case_insensitive() {
        let repo = repo().await;
        repo.create_dish_coupons(None, "Paneer Tikka", &[8.0])
            .await
            .unwrap();

        let found = repo
            .find_active_dish_coupons(None, "PANEER TIKKA")
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].dish_name, "Paneer Tikka");
    }
}
