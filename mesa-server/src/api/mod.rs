//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 订单生命周期接口
//! - [`tables`] - 桌台管理接口
//! - [`coupons`] - 优惠券管理接口
//! - [`customers`] - 客户资料与导出接口

use axum::Router;

use crate::core::ServerState;

pub mod coupons;
pub mod customers;
pub mod health;
pub mod orders;
pub mod tables;

/// 汇总所有资源路由
pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(tables::router())
        .merge(coupons::router())
        .merge(customers::router())
}
