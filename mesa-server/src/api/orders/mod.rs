//! Order API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/active", get(handler::active))
        .route("/pending", get(handler::pending))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/items", put(handler::update_items))
        .route(
            "/{id}/coupon",
            post(handler::apply_coupon).delete(handler::remove_coupon),
        )
        .route("/{id}/dish-coupons", post(handler::apply_dish_coupon))
        .route(
            "/{id}/dish-coupons/{code}",
            axum::routing::delete(handler::remove_dish_coupon),
        )
        .route("/{id}/transfer", post(handler::transfer))
        .route("/{id}/settle", post(handler::settle))
        .route("/{id}/cancel", post(handler::cancel))
}
