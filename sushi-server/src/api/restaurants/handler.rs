//! Restaurant API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    Closure, ClosureCreate, OpenStatus, OpeningHours, OrderingStatus, Restaurant, RestaurantCreate,
    RestaurantSettings, RestaurantUpdate,
};

use crate::api::ensure_restaurant_access;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{RepoError, closure, opening_hours, restaurant};
use crate::services::restaurant as restaurants;
use crate::slots::hours;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_date,
    validate_hhmm, validate_optional_text, validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

const RESOURCE: &str = "restaurant";

#[derive(Debug, Deserialize)]
pub struct OpenStatusQuery {
    /// Unix millis; now when absent
    pub at: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ClosureQuery {
    /// YYYY-MM-DD
    pub from: Option<String>,
}

fn validate_create(data: &RestaurantCreate) -> AppResult<()> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&data.address, "address", MAX_ADDRESS_LEN)?;
    validate_required_text(&data.city, "city", MAX_NAME_LEN)?;
    validate_required_text(&data.postal_code, "postal_code", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.email, "email", MAX_EMAIL_LEN)?;
    Ok(())
}

fn validate_update(data: &RestaurantUpdate) -> AppResult<()> {
    if let Some(name) = &data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(address) = &data.address {
        validate_required_text(address, "address", MAX_ADDRESS_LEN)?;
    }
    validate_optional_text(&data.city, "city", MAX_NAME_LEN)?;
    validate_optional_text(&data.postal_code, "postal_code", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.email, "email", MAX_EMAIL_LEN)?;
    Ok(())
}

fn validate_closure(data: &ClosureCreate) -> AppResult<()> {
    validate_date(&data.closure_date, "closure_date")?;
    validate_optional_text(&data.reason, "reason", MAX_NOTE_LEN)?;
    if data.is_all_day {
        return Ok(());
    }
    match (&data.start_time, &data.end_time) {
        (Some(start), Some(end)) => {
            validate_hhmm(start, "start_time")?;
            validate_hhmm(end, "end_time")?;
            if start > end {
                return Err(AppError::validation("start_time must not be after end_time"));
            }
            Ok(())
        }
        _ => Err(AppError::with_message(
            ErrorCode::RequiredField,
            "start_time and end_time are required for a partial closure",
        )),
    }
}

/// GET /api/restaurants - active restaurants
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<Restaurant>>>> {
    let restaurants = restaurant::find_active(&state.pool).await?;
    Ok(ok(restaurants))
}

/// GET /api/admin/restaurants - every restaurant, inactive ones included
pub async fn list_all(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<Vec<Restaurant>>>> {
    let restaurants = restaurant::find_all(&state.pool)
        .await?
        .into_iter()
        .filter(|r| user.can_access_restaurant(r.id))
        .collect();
    Ok(ok(restaurants))
}

/// GET /api/restaurants/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Restaurant>>> {
    Ok(ok(restaurants::load(&state.pool, id).await?))
}

/// GET /api/restaurants/{id}/hours - opening hours (defaults when none are stored)
pub async fn get_hours(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<OpeningHours>>>> {
    restaurants::load(&state.pool, id).await?;
    Ok(ok(restaurants::effective_hours(&state.pool, id).await?))
}

/// GET /api/restaurants/{id}/ordering-status
pub async fn ordering_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderingStatus>>> {
    let restaurant = restaurants::load(&state.pool, id).await?;
    Ok(ok(OrderingStatus::from(restaurant.settings)))
}

/// GET /api/restaurants/{id}/open-status?at=
pub async fn open_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<OpenStatusQuery>,
) -> AppResult<Json<ApiResponse<OpenStatus>>> {
    restaurants::load(&state.pool, id).await?;
    let at = query.at.unwrap_or_else(shared::util::now_millis);
    Ok(ok(restaurants::open_status_at(&state, id, at).await?))
}

/// GET /api/restaurants/{id}/closures?from=
pub async fn list_closures(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<ClosureQuery>,
) -> AppResult<Json<ApiResponse<Vec<Closure>>>> {
    if let Some(from) = &query.from {
        validate_date(from, "from")?;
    }
    let closures = closure::find_by_restaurant(&state.pool, id, query.from.as_deref()).await?;
    Ok(ok(closures))
}

/// POST /api/admin/restaurants
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<RestaurantCreate>,
) -> AppResult<Json<ApiResponse<Restaurant>>> {
    if !user.is_admin() {
        return Err(AppError::new(ErrorCode::AdminRequired));
    }
    validate_create(&payload)?;
    let created = restaurant::create(&state.pool, payload).await?;

    tracing::info!(restaurant_id = created.id, name = %created.name, "Restaurant created");
    state.broadcast_sync(RESOURCE, "created", &created.id.to_string(), Some(&created));
    Ok(ok(created))
}

/// PUT /api/admin/restaurants/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<RestaurantUpdate>,
) -> AppResult<Json<ApiResponse<Restaurant>>> {
    ensure_restaurant_access(&user, id)?;
    validate_update(&payload)?;
    let updated = restaurant::update(&state.pool, id, payload)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => AppError::new(ErrorCode::RestaurantNotFound),
            other => other.into(),
        })?;

    state.broadcast_sync(RESOURCE, "updated", &id.to_string(), Some(&updated));
    Ok(ok(updated))
}

/// PUT /api/admin/restaurants/{id}/settings - ordering switches
pub async fn update_settings(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(settings): Json<RestaurantSettings>,
) -> AppResult<Json<ApiResponse<Restaurant>>> {
    ensure_restaurant_access(&user, id)?;
    let updated = restaurant::update_settings(&state.pool, id, settings)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => AppError::new(ErrorCode::RestaurantNotFound),
            other => other.into(),
        })?;

    tracing::info!(
        restaurant_id = id,
        ordering_locked = settings.ordering_locked,
        delivery_blocked = settings.delivery_blocked,
        pickup_blocked = settings.pickup_blocked,
        "Ordering settings updated"
    );
    state.broadcast_sync(RESOURCE, "updated", &id.to_string(), Some(&updated));
    Ok(ok(updated))
}

/// PUT /api/admin/restaurants/{id}/hours - replaces every opening hours row
pub async fn set_hours(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(rows): Json<Vec<OpeningHours>>,
) -> AppResult<Json<ApiResponse<Vec<OpeningHours>>>> {
    ensure_restaurant_access(&user, id)?;
    restaurants::load(&state.pool, id).await?;
    hours::validate_rows(&rows).map_err(AppError::validation)?;

    let stored = opening_hours::replace(&state.pool, id, &rows).await?;
    state.broadcast_sync("opening_hours", "updated", &id.to_string(), Some(&stored));
    Ok(ok(stored))
}

/// POST /api/admin/restaurants/{id}/closures
pub async fn create_closure(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<ClosureCreate>,
) -> AppResult<Json<ApiResponse<Closure>>> {
    ensure_restaurant_access(&user, id)?;
    restaurants::load(&state.pool, id).await?;
    validate_closure(&payload)?;

    let created = closure::create(&state.pool, id, payload).await?;
    tracing::info!(restaurant_id = id, closure_id = created.id, date = %created.closure_date, "Closure created");
    state.broadcast_sync("closure", "created", &created.id.to_string(), Some(&created));
    Ok(ok(created))
}

/// DELETE /api/admin/restaurants/{id}/closures/{closure_id}
pub async fn delete_closure(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path((id, closure_id)): Path<(i64, i64)>,
) -> AppResult<Json<ApiResponse<bool>>> {
    ensure_restaurant_access(&user, id)?;
    if !closure::delete(&state.pool, id, closure_id).await? {
        return Err(AppError::new(ErrorCode::ClosureNotFound));
    }
    state.broadcast_sync::<()>("closure", "deleted", &closure_id.to_string(), None);
    Ok(ok(true))
}
