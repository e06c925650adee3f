//! Customer API Handlers

use axum::{Json, extract::State, http::header, response::IntoResponse};

use crate::core::ServerState;
use crate::db::models::CustomerData;
use crate::db::repository::CustomerRepository;
use crate::export::customers_to_csv;
use crate::utils::{AppError, AppResult};

/// GET /api/customers - 收集到的客户资料 (新的在前)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<CustomerData>>> {
    let repo = CustomerRepository::new(state.db.clone());
    Ok(Json(repo.find_all().await?))
}

/// GET /api/customers/export - 客户名单 CSV 下载
pub async fn export(State(state): State<ServerState>) -> Result<impl IntoResponse, AppError> {
    let repo = CustomerRepository::new(state.db.clone());
    let customers = repo.find_all().await?;
    let csv = customers_to_csv(&customers);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"customers.csv\"",
            ),
        ],
        csv,
    ))
}
