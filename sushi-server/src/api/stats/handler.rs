//! Statistics API Handlers

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use shared::models::{DailyStats, PopularProduct, StatsQuery};

use crate::api::ensure_restaurant_access;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::stats;
use crate::utils::{ApiResponse, AppResult, ok};

/// GET /api/admin/stats/daily?restaurant_id=&from=&to=
pub async fn daily(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<ApiResponse<Vec<DailyStats>>>> {
    ensure_restaurant_access(&user, query.restaurant_id)?;
    Ok(ok(stats::daily(&state, &query).await?))
}

/// GET /api/admin/stats/popular?restaurant_id=&from=&to=&limit=
pub async fn popular(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<ApiResponse<Vec<PopularProduct>>>> {
    ensure_restaurant_access(&user, query.restaurant_id)?;
    Ok(ok(stats::popular(&state, &query).await?))
}

/// GET /api/admin/stats/export?restaurant_id=&from=&to=
pub async fn export_csv(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<StatsQuery>,
) -> AppResult<impl IntoResponse> {
    ensure_restaurant_access(&user, query.restaurant_id)?;
    let body = stats::export_orders_csv(&state, query.restaurant_id, &query.from, &query.to).await?;
    let filename = format!(
        "attachment; filename=\"commandes_{}_{}_{}.csv\"",
        query.restaurant_id, query.from, query.to
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        body,
    ))
}
