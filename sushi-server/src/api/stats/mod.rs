//! Statistics API 模块
//!
//! | 路径 | 方法 | 权限 |
//! |------|------|------|
//! | /api/admin/stats/daily | GET | stats:view |
//! | /api/admin/stats/popular | GET | stats:view |
//! | /api/admin/stats/export | GET | stats:view (CSV) |

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest(
        "/api/admin/stats",
        Router::new()
            .route("/daily", get(handler::daily))
            .route("/popular", get(handler::popular))
            .route("/export", get(handler::export_csv))
            .route_layer(middleware::from_fn(require_permission("stats:view"))),
    )
}
