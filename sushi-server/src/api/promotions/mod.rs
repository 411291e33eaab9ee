//! Promotion API 模块 (按星期/时段的自动折扣)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/promotions/active", get(handler::list_active))
        .route("/api/restaurants/{id}/promoted-prices", get(handler::promoted_prices))
        .nest("/api/admin/promotions", admin_routes())
}

fn admin_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route_layer(middleware::from_fn(require_permission("promotions:manage")))
}
