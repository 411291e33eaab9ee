//! Order API 模块
//!
//! | 路径 | 方法 | 权限 |
//! |------|------|------|
//! | /api/orders/quote | POST | 无 |
//! | /api/orders | POST | 无 |
//! | /api/orders/{id} | GET | 无 |
//! | /api/admin/orders | GET | orders:read |
//! | /api/admin/orders/{id} | GET | orders:read |
//! | /api/admin/orders/{id}/status | PUT | orders:update |
//! | /api/admin/orders/{id}/payment | PUT | orders:update |
//! | /api/admin/orders/{id}/delay | POST | orders:update |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/orders", public_routes())
        .nest("/api/admin/orders", read_routes().merge(manage_routes()))
}

fn public_routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/quote", post(handler::quote))
        .route("/{id}", get(handler::get_by_id))
}

fn read_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_for_admin))
        .route_layer(middleware::from_fn(require_permission("orders:read")))
}

fn manage_routes() -> Router<ServerState> {
    Router::new()
        .route("/{id}/status", put(handler::update_status))
        .route("/{id}/payment", put(handler::update_payment))
        .route("/{id}/delay", post(handler::notify_delay))
        .route_layer(middleware::from_fn(require_permission("orders:update")))
}
