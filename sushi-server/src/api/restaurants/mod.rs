//! Restaurant API 模块
//!
//! 门店信息、营业时间、临时闭店和接单开关。

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/restaurants", public_routes())
        .nest("/api/admin/restaurants", admin_routes())
}

fn public_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/hours", get(handler::get_hours))
        .route("/{id}/ordering-status", get(handler::ordering_status))
        .route("/{id}/open-status", get(handler::open_status))
        .route("/{id}/closures", get(handler::list_closures))
}

fn admin_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_all).post(handler::create))
        .route("/{id}", put(handler::update))
        .route("/{id}/settings", put(handler::update_settings))
        .route("/{id}/hours", put(handler::set_hours))
        .route("/{id}/closures", get(handler::list_closures).post(handler::create_closure))
        .route("/{id}/closures/{closure_id}", delete(handler::delete_closure))
        .route_layer(middleware::from_fn(require_permission("restaurants:manage")))
}
