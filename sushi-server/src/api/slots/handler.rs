//! Time Slot API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    AvailableSlot, AvailableSlotsQuery, BlockedSlot, BlockedSlotCreate, EventTimeSlot, SlotCheck,
    SlotRequest, SpecialEvent, SpecialEventCreate, SpecialEventUpdate,
};

use crate::api::ensure_restaurant_access;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{RepoError, time_slot};
use crate::services::restaurant as restaurants;
use crate::services::slots::{self, Reservation, SlotTarget};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_date, validate_hhmm, validate_optional_text,
    validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

const RESOURCE_BLOCKED: &str = "blocked_slot";
const RESOURCE_EVENT: &str = "special_event";

#[derive(Debug, Deserialize)]
pub struct BlockedQuery {
    /// YYYY-MM-DD
    pub date: Option<String>,
}

fn check_event_slots(slots: &[EventTimeSlot]) -> AppResult<()> {
    for slot in slots {
        validate_hhmm(&slot.time, "time_slots.time")?;
        if slot.max_orders.is_some_and(|m| m < 0) {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                "max_orders must not be negative",
            ));
        }
    }
    Ok(())
}

async fn target_for(state: &ServerState, req: &SlotRequest) -> AppResult<SlotTarget> {
    let target = SlotTarget::from_request(req, state.config.timezone())?;
    restaurants::load_active(&state.pool, target.restaurant_id).await?;
    Ok(target)
}

/// POST /api/slots/verify - read only
pub async fn verify(
    State(state): State<ServerState>,
    Json(req): Json<SlotRequest>,
) -> AppResult<Json<ApiResponse<SlotCheck>>> {
    let target = target_for(&state, &req).await?;
    Ok(ok(slots::verify(&state, &target).await?))
}

/// POST /api/slots/reserve - atomic hold
///
/// A full or blocked slot answers with its error code and the check as
/// `data`, so the storefront can show the occupancy.
pub async fn reserve(
    State(state): State<ServerState>,
    Json(req): Json<SlotRequest>,
) -> AppResult<ApiResponse<SlotCheck>> {
    let target = target_for(&state, &req).await?;
    match slots::reserve(&state, &target).await? {
        Reservation::Held(check) => Ok(ApiResponse::success(check)),
        Reservation::Rejected(code, check) => {
            let message = check.message.clone();
            Ok(ApiResponse::rejected(code, message, check))
        }
    }
}

/// GET /api/restaurants/{id}/slots?order_type=&date=
pub async fn available(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<i64>,
    Query(query): Query<AvailableSlotsQuery>,
) -> AppResult<Json<ApiResponse<Vec<AvailableSlot>>>> {
    restaurants::load_active(&state.pool, restaurant_id).await?;
    let slots = slots::available(
        &state,
        restaurant_id,
        query.order_type,
        query.date.as_deref(),
        shared::util::now_millis(),
    )
    .await?;
    Ok(ok(slots))
}

// =============================================================================
// Blocked slots
// =============================================================================

/// GET /api/admin/restaurants/{id}/blocked-slots?date=
pub async fn list_blocked(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(restaurant_id): Path<i64>,
    Query(query): Query<BlockedQuery>,
) -> AppResult<Json<ApiResponse<Vec<BlockedSlot>>>> {
    ensure_restaurant_access(&user, restaurant_id)?;
    if let Some(date) = &query.date {
        validate_date(date, "date")?;
    }
    let slots = time_slot::find_blocked(&state.pool, restaurant_id, query.date.as_deref()).await?;
    Ok(ok(slots))
}

/// POST /api/admin/restaurants/{id}/blocked-slots
pub async fn block(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<BlockedSlotCreate>,
) -> AppResult<Json<ApiResponse<BlockedSlot>>> {
    ensure_restaurant_access(&user, restaurant_id)?;
    validate_date(&payload.blocked_date, "blocked_date")?;
    validate_hhmm(&payload.blocked_time, "blocked_time")?;
    validate_optional_text(&payload.reason, "reason", MAX_NOTE_LEN)?;
    restaurants::load(&state.pool, restaurant_id).await?;

    let blocked = time_slot::block(&state.pool, restaurant_id, payload)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => {
                AppError::with_message(ErrorCode::AlreadyExists, "Slot is already blocked")
            }
            other => other.into(),
        })?;
    tracing::info!(
        restaurant_id,
        date = %blocked.blocked_date,
        time = %blocked.blocked_time,
        by = %user.email,
        "Slot blocked"
    );
    state.broadcast_sync(RESOURCE_BLOCKED, "created", &blocked.id.to_string(), Some(&blocked));
    Ok(ok(blocked))
}

/// DELETE /api/admin/restaurants/{id}/blocked-slots/{slot_id}
pub async fn unblock(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path((restaurant_id, slot_id)): Path<(i64, i64)>,
) -> AppResult<Json<ApiResponse<bool>>> {
    ensure_restaurant_access(&user, restaurant_id)?;
    if !time_slot::unblock(&state.pool, restaurant_id, slot_id).await? {
        return Err(AppError::not_found(format!("Blocked slot {slot_id}")));
    }
    state.broadcast_sync::<()>(RESOURCE_BLOCKED, "deleted", &slot_id.to_string(), None);
    Ok(ok(true))
}

// =============================================================================
// Special events
// =============================================================================

/// GET /api/admin/special-events
pub async fn list_events(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<SpecialEvent>>>> {
    Ok(ok(time_slot::find_events(&state.pool).await?))
}

/// POST /api/admin/special-events
pub async fn create_event(
    State(state): State<ServerState>,
    Json(payload): Json<SpecialEventCreate>,
) -> AppResult<Json<ApiResponse<SpecialEvent>>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_date(&payload.event_date, "event_date")?;
    check_event_slots(&payload.time_slots)?;

    let created = time_slot::create_event(&state.pool, payload).await?;
    tracing::info!(event_id = created.id, date = %created.event_date, "Special event created");
    state.broadcast_sync(RESOURCE_EVENT, "created", &created.id.to_string(), Some(&created));
    Ok(ok(created))
}

/// PUT /api/admin/special-events/{id}
pub async fn update_event(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<SpecialEventUpdate>,
) -> AppResult<Json<ApiResponse<SpecialEvent>>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(date) = &payload.event_date {
        validate_date(date, "event_date")?;
    }
    if let Some(slots) = &payload.time_slots {
        check_event_slots(slots)?;
    }

    let updated = time_slot::update_event(&state.pool, id, payload)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => AppError::new(ErrorCode::SpecialEventNotFound),
            other => other.into(),
        })?;
    state.broadcast_sync(RESOURCE_EVENT, "updated", &id.to_string(), Some(&updated));
    Ok(ok(updated))
}

/// DELETE /api/admin/special-events/{id}
pub async fn delete_event(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    if !time_slot::delete_event(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::SpecialEventNotFound));
    }
    state.broadcast_sync::<()>(RESOURCE_EVENT, "deleted", &id.to_string(), None);
    Ok(ok(true))
}
