//! Back-office API Handlers (auth, accounts, notifications)

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    AdminUser, AdminUserCreate, AdminUserUpdate, LoginRequest, LoginResponse, Notification,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{admin_user, notification};
use crate::services::admin;
use crate::utils::{ApiResponse, AppResult, ok};

const DEFAULT_NOTIFICATION_LIMIT: i64 = 100;
const MAX_NOTIFICATION_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    pub order_id: Option<String>,
    pub limit: Option<i64>,
}

/// POST /api/admin/auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    Ok(ok(admin::login(&state, req).await?))
}

/// GET /api/admin/auth/me
pub async fn me(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<AdminUser>>> {
    Ok(ok(admin::current_user(&state, &user).await?))
}

/// GET /api/admin/users
pub async fn list_users(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<AdminUser>>>> {
    Ok(ok(admin_user::find_all(&state.pool).await?))
}

/// POST /api/admin/users
pub async fn create_user(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<AdminUserCreate>,
) -> AppResult<Json<ApiResponse<AdminUser>>> {
    let user = admin::create_user(&state, payload).await?;
    tracing::info!(user_id = user.id, email = %user.email, by = %current.email, "Admin user created");
    Ok(ok(user))
}

/// PUT /api/admin/users/{id}
pub async fn update_user(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AdminUserUpdate>,
) -> AppResult<Json<ApiResponse<AdminUser>>> {
    Ok(ok(admin::update_user(&state, id, payload).await?))
}

/// DELETE /api/admin/users/{id} - self-deletion is refused
pub async fn delete_user(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    Ok(ok(admin::delete_user(&state, id, &current).await?))
}

/// GET /api/admin/notifications?order_id=&limit=
pub async fn list_notifications(
    State(state): State<ServerState>,
    Query(query): Query<NotificationQuery>,
) -> AppResult<Json<ApiResponse<Vec<Notification>>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_NOTIFICATION_LIMIT)
        .clamp(1, MAX_NOTIFICATION_LIMIT);
    let rows = notification::list(&state.pool, query.order_id.as_deref(), limit).await?;
    Ok(ok(rows))
}
