//! Delivery API 模块 (配送区域和邮编)

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/delivery/check", get(handler::check))
        .route("/api/restaurants/{id}/delivery-zones", get(handler::list_available_zones))
        .merge(admin_routes())
}

fn admin_routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/admin/restaurants/{id}/delivery-zones",
            get(handler::list_zones).post(handler::create_zone),
        )
        .route(
            "/api/admin/delivery-zones/{id}",
            put(handler::update_zone).delete(handler::delete_zone),
        )
        .route(
            "/api/admin/restaurants/{id}/delivery-locations",
            get(handler::list_locations).post(handler::create_location),
        )
        .route(
            "/api/admin/restaurants/{id}/delivery-locations/{location_id}",
            delete(handler::delete_location),
        )
        .route_layer(middleware::from_fn(require_permission("delivery:manage")))
}
