//! Promotion API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{DayPromotion, DayPromotionCreate, DayPromotionUpdate, PromotedPrice};

use crate::core::ServerState;
use crate::db::repository::{product, promotion};
use crate::pricing::promotion::{active_promotions, promoted_price, promotion_for_product};
use crate::services::restaurant as restaurants;
use crate::utils::time::to_local;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_amount, validate_hhmm, validate_optional_text,
    validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

const RESOURCE: &str = "promotion";

#[derive(Debug, Deserialize)]
pub struct ActiveQuery {
    pub restaurant_id: Option<i64>,
}

fn check_discount(discount: f64, is_percentage: bool) -> AppResult<()> {
    validate_amount(discount, "discount")?;
    if is_percentage && discount > 100.0 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "A percentage discount cannot exceed 100",
        ));
    }
    Ok(())
}

fn check_days(days: &[u8]) -> AppResult<()> {
    if days.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "applicable_days must not be empty",
        ));
    }
    if let Some(day) = days.iter().find(|d| **d > 6) {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("Invalid day {day}, expected 0 (Sunday) to 6 (Saturday)"),
        ));
    }
    Ok(())
}

fn check_window(start: Option<&str>, end: Option<&str>) -> AppResult<()> {
    if let Some(start) = start {
        validate_hhmm(start, "start_time")?;
    }
    if let Some(end) = end {
        validate_hhmm(end, "end_time")?;
    }
    Ok(())
}

fn now_local(state: &ServerState) -> AppResult<chrono::DateTime<chrono::FixedOffset>> {
    to_local(shared::util::now_millis(), state.config.timezone())
        .ok_or_else(|| AppError::internal("Clock out of range"))
}

/// GET /api/promotions/active?restaurant_id= - promotions in effect now
pub async fn list_active(
    State(state): State<ServerState>,
    Query(query): Query<ActiveQuery>,
) -> AppResult<Json<ApiResponse<Vec<DayPromotion>>>> {
    let now = now_local(&state)?;
    let promotions = promotion::find_enabled(&state.pool).await?;
    let active = active_promotions(&promotions, query.restaurant_id, &now)
        .into_iter()
        .cloned()
        .collect();
    Ok(ok(active))
}

/// GET /api/restaurants/{id}/promoted-prices - current discounted prices
pub async fn promoted_prices(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<PromotedPrice>>>> {
    restaurants::load(&state.pool, restaurant_id).await?;
    let now = now_local(&state)?;
    let promotions = promotion::find_enabled(&state.pool).await?;
    let active = active_promotions(&promotions, Some(restaurant_id), &now);
    if active.is_empty() {
        return Ok(ok(Vec::new()));
    }

    let products = product::find_by_restaurant(&state.pool, restaurant_id, None, false).await?;
    let prices = products
        .iter()
        .filter_map(|p| promotion_for_product(&active, p.id, &p.category).map(|promo| promoted_price(p, promo)))
        .collect();
    Ok(ok(prices))
}

/// GET /api/admin/promotions
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<DayPromotion>>>> {
    Ok(ok(promotion::find_all(&state.pool).await?))
}

/// POST /api/admin/promotions
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DayPromotionCreate>,
) -> AppResult<Json<ApiResponse<DayPromotion>>> {
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    check_discount(payload.discount, payload.is_percentage)?;
    check_days(&payload.applicable_days)?;
    check_window(payload.start_time.as_deref(), payload.end_time.as_deref())?;

    let created = promotion::create(&state.pool, payload).await?;
    tracing::info!(promotion_id = created.id, title = %created.title, "Promotion created");
    state.broadcast_sync(RESOURCE, "created", &created.id.to_string(), Some(&created));
    Ok(ok(created))
}

/// PUT /api/admin/promotions/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<DayPromotionUpdate>,
) -> AppResult<Json<ApiResponse<DayPromotion>>> {
    let existing = promotion::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PromotionNotFound))?;
    if let Some(title) = &payload.title {
        validate_required_text(title, "title", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    check_discount(
        payload.discount.unwrap_or(existing.discount),
        payload.is_percentage.unwrap_or(existing.is_percentage),
    )?;
    if let Some(days) = &payload.applicable_days {
        check_days(days)?;
    }
    check_window(payload.start_time.as_deref(), payload.end_time.as_deref())?;

    let updated = promotion::update(&state.pool, id, payload).await?;
    state.broadcast_sync(RESOURCE, "updated", &id.to_string(), Some(&updated));
    Ok(ok(updated))
}

/// DELETE /api/admin/promotions/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    if !promotion::delete(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::PromotionNotFound));
    }
    state.broadcast_sync::<()>(RESOURCE, "deleted", &id.to_string(), None);
    Ok(ok(true))
}
