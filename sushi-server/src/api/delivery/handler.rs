//! Delivery API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    DeliveryEligibility, DeliveryLocation, DeliveryLocationCreate, DeliveryZone, DeliveryZoneCreate,
    DeliveryZoneUpdate,
};

use crate::api::ensure_restaurant_access;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{RepoError, delivery};
use crate::services::{delivery as eligibility, restaurant as restaurants};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_amount, validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

const RESOURCE_ZONE: &str = "delivery_zone";
const RESOURCE_LOCATION: &str = "delivery_location";

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub restaurant_id: i64,
    pub postal_code: String,
}

fn zone_error(e: RepoError) -> AppError {
    match e {
        RepoError::Duplicate(_) => AppError::new(ErrorCode::DeliveryZoneNameExists),
        RepoError::NotFound(_) => AppError::new(ErrorCode::DeliveryZoneNotFound),
        other => other.into(),
    }
}

fn check_postal_codes(codes: &[String]) -> AppResult<()> {
    for code in codes {
        validate_required_text(code, "postal_codes", MAX_SHORT_TEXT_LEN)?;
    }
    Ok(())
}

async fn load_zone(state: &ServerState, id: i64) -> AppResult<DeliveryZone> {
    delivery::find_zone(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::DeliveryZoneNotFound))
}

/// GET /api/delivery/check?restaurant_id=&postal_code=
pub async fn check(
    State(state): State<ServerState>,
    Query(query): Query<CheckQuery>,
) -> AppResult<Json<ApiResponse<DeliveryEligibility>>> {
    restaurants::load_active(&state.pool, query.restaurant_id).await?;
    let result = eligibility::check_eligibility(&state.pool, query.restaurant_id, &query.postal_code).await?;
    Ok(ok(result))
}

/// GET /api/restaurants/{id}/delivery-zones - available zones only
pub async fn list_available_zones(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<DeliveryZone>>>> {
    let zones = delivery::find_zones(&state.pool, restaurant_id)
        .await?
        .into_iter()
        .filter(|z| z.available)
        .collect();
    Ok(ok(zones))
}

/// GET /api/admin/restaurants/{id}/delivery-zones
pub async fn list_zones(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(restaurant_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<DeliveryZone>>>> {
    ensure_restaurant_access(&user, restaurant_id)?;
    Ok(ok(delivery::find_zones(&state.pool, restaurant_id).await?))
}

/// POST /api/admin/restaurants/{id}/delivery-zones
pub async fn create_zone(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<DeliveryZoneCreate>,
) -> AppResult<Json<ApiResponse<DeliveryZone>>> {
    ensure_restaurant_access(&user, restaurant_id)?;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_amount(payload.min_order, "min_order")?;
    validate_amount(payload.delivery_fee, "delivery_fee")?;
    check_postal_codes(&payload.postal_codes)?;
    restaurants::load(&state.pool, restaurant_id).await?;

    let created = delivery::create_zone(&state.pool, restaurant_id, payload)
        .await
        .map_err(zone_error)?;
    tracing::info!(zone_id = created.id, restaurant_id, name = %created.name, "Delivery zone created");
    state.broadcast_sync(RESOURCE_ZONE, "created", &created.id.to_string(), Some(&created));
    Ok(ok(created))
}

/// PUT /api/admin/delivery-zones/{id}
pub async fn update_zone(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<DeliveryZoneUpdate>,
) -> AppResult<Json<ApiResponse<DeliveryZone>>> {
    let existing = load_zone(&state, id).await?;
    ensure_restaurant_access(&user, existing.restaurant_id)?;
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(min) = payload.min_order {
        validate_amount(min, "min_order")?;
    }
    if let Some(fee) = payload.delivery_fee {
        validate_amount(fee, "delivery_fee")?;
    }
    if let Some(codes) = &payload.postal_codes {
        check_postal_codes(codes)?;
    }

    let updated = delivery::update_zone(&state.pool, id, payload)
        .await
        .map_err(zone_error)?;
    state.broadcast_sync(RESOURCE_ZONE, "updated", &id.to_string(), Some(&updated));
    Ok(ok(updated))
}

/// DELETE /api/admin/delivery-zones/{id}
pub async fn delete_zone(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let existing = load_zone(&state, id).await?;
    ensure_restaurant_access(&user, existing.restaurant_id)?;

    let deleted = delivery::delete_zone(&state.pool, id).await?;
    if deleted {
        state.broadcast_sync::<()>(RESOURCE_ZONE, "deleted", &id.to_string(), None);
    }
    Ok(ok(deleted))
}

/// GET /api/admin/restaurants/{id}/delivery-locations
pub async fn list_locations(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(restaurant_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<DeliveryLocation>>>> {
    ensure_restaurant_access(&user, restaurant_id)?;
    Ok(ok(delivery::find_locations(&state.pool, restaurant_id).await?))
}

/// POST /api/admin/restaurants/{id}/delivery-locations
pub async fn create_location(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<DeliveryLocationCreate>,
) -> AppResult<Json<ApiResponse<DeliveryLocation>>> {
    ensure_restaurant_access(&user, restaurant_id)?;
    validate_required_text(&payload.postal_code, "postal_code", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.city, "city", MAX_NAME_LEN)?;
    restaurants::load(&state.pool, restaurant_id).await?;

    let created = delivery::create_location(&state.pool, restaurant_id, payload)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => AppError::with_message(
                ErrorCode::AlreadyExists,
                "Postal code already served by this restaurant",
            ),
            other => other.into(),
        })?;
    state.broadcast_sync(RESOURCE_LOCATION, "created", &created.id.to_string(), Some(&created));
    Ok(ok(created))
}

/// DELETE /api/admin/restaurants/{id}/delivery-locations/{location_id}
pub async fn delete_location(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path((restaurant_id, location_id)): Path<(i64, i64)>,
) -> AppResult<Json<ApiResponse<bool>>> {
    ensure_restaurant_access(&user, restaurant_id)?;
    if !delivery::delete_location(&state.pool, restaurant_id, location_id).await? {
        return Err(AppError::not_found(format!("Delivery location {location_id}")));
    }
    state.broadcast_sync::<()>(RESOURCE_LOCATION, "deleted", &location_id.to_string(), None);
    Ok(ok(true))
}
