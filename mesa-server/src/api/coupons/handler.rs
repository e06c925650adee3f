//! Coupon API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::models::{
    Coupon, CouponCreate, CouponUpdate, DishCoupon, DishCouponBatchCreate,
};
use crate::db::repository::CouponRepository;
use crate::db::repository::coupon::DishCouponBatchResult;
use crate::utils::validation::{
    MAX_NAME_LEN, validate_amount, validate_percentage, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::order::DiscountType;

fn validate_create(payload: &CouponCreate) -> AppResult<()> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    match payload.discount_type {
        DiscountType::Fixed => validate_amount(payload.value, "value")?,
        DiscountType::Percentage => validate_percentage(payload.value, "value")?,
    }
    if let Some(cap) = payload.max_discount {
        validate_amount(cap, "max_discount")?;
    }
    if let Some(min) = payload.min_order_amount {
        validate_amount(min, "min_order_amount")?;
    }
    Ok(())
}

fn validate_update(payload: &CouponUpdate) -> AppResult<()> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(cap) = payload.max_discount {
        validate_amount(cap, "max_discount")?;
    }
    if let Some(min) = payload.min_order_amount {
        validate_amount(min, "min_order_amount")?;
    }
    Ok(())
}

fn validate_dish_create(payload: &DishCouponBatchCreate) -> AppResult<()> {
    validate_required_text(&payload.dish_name, "dish_name", MAX_NAME_LEN)?;
    if payload.percentages.is_empty() {
        return Err(AppError::validation("percentages must not be empty"));
    }
    for pct in &payload.percentages {
        validate_percentage(*pct, "percentage")?;
    }
    Ok(())
}

/// GET /api/coupons - 获取所有订单级优惠券
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Coupon>>> {
    let repo = CouponRepository::new(state.db.clone());
    Ok(Json(repo.find_all().await?))
}

/// GET /api/coupons/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Coupon>> {
    let repo = CouponRepository::new(state.db.clone());
    let coupon = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Coupon {} not found", id)))?;
    Ok(Json(coupon))
}

/// POST /api/coupons - 创建优惠券
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CouponCreate>,
) -> AppResult<Json<Coupon>> {
    validate_create(&payload)?;
    let repo = CouponRepository::new(state.db.clone());
    Ok(Json(repo.create(payload).await?))
}

/// PUT /api/coupons/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CouponUpdate>,
) -> AppResult<Json<Coupon>> {
    validate_update(&payload)?;
    let repo = CouponRepository::new(state.db.clone());
    Ok(Json(repo.update(&id, payload).await?))
}

/// DELETE /api/coupons/:id
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = CouponRepository::new(state.db.clone());
    Ok(Json(repo.delete(&id).await?))
}

/// GET /api/coupons/dish - 获取所有菜品优惠券
pub async fn list_dish(State(state): State<ServerState>) -> AppResult<Json<Vec<DishCoupon>>> {
    let repo = CouponRepository::new(state.db.clone());
    Ok(Json(repo.find_all_dish().await?))
}

/// POST /api/coupons/dish - 批量创建菜品优惠券 (重复折扣率静默跳过)
pub async fn create_dish(
    State(state): State<ServerState>,
    Json(payload): Json<DishCouponBatchCreate>,
) -> AppResult<Json<DishCouponBatchResult>> {
    validate_dish_create(&payload)?;
    let repo = CouponRepository::new(state.db.clone());
    let result = repo
        .create_dish_coupons(payload.location_id, &payload.dish_name, &payload.percentages)
        .await?;
    Ok(Json(result))
}

/// DELETE /api/coupons/dish/:id - 停用菜品优惠券
pub async fn deactivate_dish(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = CouponRepository::new(state.db.clone());
    Ok(Json(repo.deactivate_dish(&id).await?))
}
