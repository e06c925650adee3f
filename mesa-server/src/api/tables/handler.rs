//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::{DiningTable, DiningTableCreate, DiningTableUpdate};
use crate::tables::{BatchOutcome, MergeResult};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

#[derive(Deserialize)]
pub struct ReserveRequest {
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
}

#[derive(Deserialize)]
pub struct SwitchRequest {
    pub order_id: String,
    pub from_table_id: String,
    pub to_table_id: String,
}

#[derive(Deserialize)]
pub struct MergeRequest {
    pub table_ids: Vec<String>,
}

#[derive(Deserialize)]
pub struct SplitRequest {
    pub merge_group: String,
}

/// GET /api/tables - 获取所有桌台
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<DiningTable>>> {
    Ok(Json(state.tables.repository().find_all().await?))
}

/// GET /api/tables/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<DiningTable>> {
    let table = state
        .tables
        .repository()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Table {} not found", id)))?;
    Ok(Json(table))
}

/// POST /api/tables - 创建桌台
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<Json<DiningTable>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    Ok(Json(state.tables.repository().create(payload).await?))
}

/// PUT /api/tables/:id - 更新桌台
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<DiningTable>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    Ok(Json(state.tables.repository().update(&id, payload).await?))
}

/// DELETE /api/tables/:id
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    Ok(Json(state.tables.repository().delete(&id).await?))
}

/// POST /api/tables/:id/reserve - 预订桌台
pub async fn reserve(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ReserveRequest>,
) -> AppResult<Json<DiningTable>> {
    validate_required_text(&payload.customer_name, "customer_name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.customer_phone, "customer_phone", MAX_SHORT_TEXT_LEN)?;
    Ok(Json(
        state
            .tables
            .reserve(&id, payload.customer_name, payload.customer_phone)
            .await?,
    ))
}

/// POST /api/tables/:id/release - 释放桌台
pub async fn release(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<DiningTable>> {
    Ok(Json(state.tables.release(&id).await?))
}

/// POST /api/tables/switch - 换桌
pub async fn switch(
    State(state): State<ServerState>,
    Json(payload): Json<SwitchRequest>,
) -> AppResult<Json<DiningTable>> {
    Ok(Json(
        state
            .tables
            .switch_table(
                &payload.order_id,
                &payload.from_table_id,
                &payload.to_table_id,
            )
            .await?,
    ))
}

/// POST /api/tables/merge - 合桌
pub async fn merge(
    State(state): State<ServerState>,
    Json(payload): Json<MergeRequest>,
) -> AppResult<Json<MergeResult>> {
    Ok(Json(state.tables.merge(&payload.table_ids).await?))
}

/// POST /api/tables/split - 拆桌
pub async fn split(
    State(state): State<ServerState>,
    Json(payload): Json<SplitRequest>,
) -> AppResult<Json<BatchOutcome>> {
    Ok(Json(state.tables.split(&payload.merge_group).await?))
}
