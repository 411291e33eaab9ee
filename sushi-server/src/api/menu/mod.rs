//! Menu API 模块 (分类和商品)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/restaurants/{id}/categories", get(handler::list_categories))
        .route("/api/restaurants/{id}/products", get(handler::list_products))
        .route("/api/products/{id}", get(handler::get_product))
        .merge(admin_routes())
}

fn admin_routes() -> Router<ServerState> {
    Router::new()
        .route("/api/admin/restaurants/{id}/categories", post(handler::create_category))
        .route(
            "/api/admin/restaurants/{id}/products",
            get(handler::list_all_products).post(handler::create_product),
        )
        .route(
            "/api/admin/categories/{id}",
            put(handler::update_category).delete(handler::delete_category),
        )
        .route(
            "/api/admin/products/{id}",
            put(handler::update_product).delete(handler::delete_product),
        )
        .route_layer(middleware::from_fn(require_permission("menu:manage")))
}
