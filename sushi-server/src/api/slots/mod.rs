//! Time slot API 模块
//!
//! 门店前台: 校验和预占时段, 以及下单时间选择器。未使用的预占由 TTL 回收。
//! 后台: 屏蔽时段和特殊活动容量。

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/slots/verify", post(handler::verify))
        .route("/api/slots/reserve", post(handler::reserve))
        .route("/api/restaurants/{id}/slots", get(handler::available))
        .merge(admin_routes())
}

fn admin_routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/admin/restaurants/{id}/blocked-slots",
            get(handler::list_blocked).post(handler::block),
        )
        .route(
            "/api/admin/restaurants/{id}/blocked-slots/{slot_id}",
            delete(handler::unblock),
        )
        .route(
            "/api/admin/special-events",
            get(handler::list_events).post(handler::create_event),
        )
        .route(
            "/api/admin/special-events/{id}",
            put(handler::update_event).delete(handler::delete_event),
        )
        .route_layer(middleware::from_fn(require_permission("slots:manage")))
}
