//! Promo code API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/promo-codes/validate", post(handler::validate))
        .nest("/api/admin/promo-codes", admin_routes())
}

fn admin_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route_layer(middleware::from_fn(require_permission("promotions:manage")))
}
