//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::order::OrderItem;

use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate};
use crate::orders::{SettleRequest, SettleResult};
use crate::utils::AppResult;

#[derive(Deserialize)]
pub struct ItemsUpdate {
    pub items: Vec<OrderItem>,
}

#[derive(Deserialize)]
pub struct ApplyCoupon {
    pub coupon_id: String,
}

#[derive(Deserialize)]
pub struct ApplyDishCoupon {
    pub dish_coupon_id: String,
}

#[derive(Deserialize, Default)]
pub struct CancelRequest {
    #[serde(default)]
    pub operator_id: Option<String>,
}

/// GET /api/orders - 全部订单 (新建在前)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.list().await?))
}

/// GET /api/orders/active - 活跃订单 (redb 缓存)
pub async fn active(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.active()?))
}

/// GET /api/orders/pending - 经理结账队列 (已转交，先进先出)
pub async fn pending(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.pending().await?))
}

/// GET /api/orders/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.get(&id).await?))
}

/// POST /api/orders - 开单 (可同时占桌)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.create(payload).await?))
}

/// PUT /api/orders/:id/items - 整单替换菜品行
pub async fn update_items(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ItemsUpdate>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.update_items(&id, payload.items).await?))
}

/// POST /api/orders/:id/coupon
pub async fn apply_coupon(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ApplyCoupon>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.apply_coupon(&id, &payload.coupon_id).await?))
}

/// DELETE /api/orders/:id/coupon
pub async fn remove_coupon(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.remove_coupon(&id).await?))
}

/// POST /api/orders/:id/dish-coupons
pub async fn apply_dish_coupon(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ApplyDishCoupon>,
) -> AppResult<Json<Order>> {
    Ok(Json(
        state
            .orders
            .apply_dish_coupon(&id, &payload.dish_coupon_id)
            .await?,
    ))
}

/// DELETE /api/orders/:id/dish-coupons/:code
pub async fn remove_dish_coupon(
    State(state): State<ServerState>,
    Path((id, code)): Path<(String, String)>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.remove_dish_coupon(&id, &code).await?))
}

/// POST /api/orders/:id/transfer - 转交经理结账
pub async fn transfer(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.transfer(&id).await?))
}

/// POST /api/orders/:id/settle - 结账
pub async fn settle(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<SettleRequest>,
) -> AppResult<Json<SettleResult>> {
    Ok(Json(state.orders.settle(&id, payload).await?))
}

/// POST /api/orders/:id/cancel - 取消订单 (body 可省略)
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Option<Json<CancelRequest>>,
) -> AppResult<Json<SettleResult>> {
    let operator = payload.and_then(|Json(p)| p.operator_id);
    Ok(Json(state.orders.cancel(&id, operator).await?))
}
