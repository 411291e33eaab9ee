//! Back-office API 模块
//!
//! | 路径 | 方法 | 权限 |
//! |------|------|------|
//! | /api/admin/auth/login | POST | 无 (按 IP 限流) |
//! | /api/admin/auth/me | GET | 已登录 |
//! | /api/admin/users | GET/POST | admin_users:manage |
//! | /api/admin/users/{id} | PUT/DELETE | admin_users:manage |
//! | /api/admin/notifications | GET | notifications:read |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::rate_limit::login_rate_limit;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .nest("/api/admin/auth", auth_routes(state))
        .nest("/api/admin/users", user_routes())
        .route(
            "/api/admin/notifications",
            get(handler::list_notifications)
                .route_layer(middleware::from_fn(require_permission("notifications:read"))),
        )
}

fn auth_routes(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route(
            "/login",
            post(handler::login).route_layer(middleware::from_fn_with_state(
                state.clone(),
                login_rate_limit,
            )),
        )
        .route("/me", get(handler::me))
}

fn user_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_users).post(handler::create_user))
        .route("/{id}", put(handler::update_user).delete(handler::delete_user))
        .route_layer(middleware::from_fn(require_permission("admin_users:manage")))
}
