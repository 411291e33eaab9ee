//! Order API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Serialize;
use shared::models::{
    Order, OrderCreate, OrderDelayNotice, OrderListQuery, OrderPage, OrderQuote, OrderStatusUpdate,
    PaymentStatusUpdate,
};

use crate::api::ensure_restaurant_access;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::orders;
use crate::utils::{ApiResponse, AppResult, ok};

#[derive(Debug, Serialize)]
pub struct DelayQueued {
    pub order_id: String,
    pub notification_ids: Vec<i64>,
}

async fn load_scoped(state: &ServerState, user: &CurrentUser, id: &str) -> AppResult<Order> {
    let order = orders::get(&state.pool, id).await?;
    ensure_restaurant_access(user, order.restaurant_id)?;
    Ok(order)
}

/// POST /api/orders/quote - dry run, nothing is stored
pub async fn quote(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<ApiResponse<OrderQuote>>> {
    Ok(ok(orders::quote(&state, &payload).await?))
}

/// POST /api/orders - place an order
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<ApiResponse<Order>>> {
    Ok(ok(orders::create(&state, payload).await?))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    Ok(ok(orders::get(&state.pool, &id).await?))
}

/// GET /api/admin/orders?restaurant_id=&status=&date=&page=&per_page=
///
/// Staff bound to a restaurant always see that restaurant only.
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(mut query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderPage>>> {
    if !user.is_admin()
        && let Some(own) = user.restaurant_id
    {
        query.restaurant_id = Some(own);
    }
    Ok(ok(orders::list(&state, &query).await?))
}

/// GET /api/admin/orders/{id}
pub async fn get_for_admin(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    Ok(ok(load_scoped(&state, &user, &id).await?))
}

/// PUT /api/admin/orders/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<ApiResponse<Order>>> {
    load_scoped(&state, &user, &id).await?;
    let order = orders::update_status(&state, &id, payload.status).await?;
    Ok(ok(order))
}

/// PUT /api/admin/orders/{id}/payment
pub async fn update_payment(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<PaymentStatusUpdate>,
) -> AppResult<Json<ApiResponse<Order>>> {
    load_scoped(&state, &user, &id).await?;
    let order = orders::update_payment(&state, &id, payload.payment_status).await?;
    Ok(ok(order))
}

/// POST /api/admin/orders/{id}/delay - tell the customer about a delay
pub async fn notify_delay(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<OrderDelayNotice>,
) -> AppResult<Json<ApiResponse<DelayQueued>>> {
    load_scoped(&state, &user, &id).await?;
    let notification_ids =
        orders::notify_delay(&state, &id, payload.delay_minutes, payload.delay_reason.as_deref()).await?;
    Ok(ok(DelayQueued {
        order_id: id,
        notification_ids,
    }))
}
