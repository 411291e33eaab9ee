//! Promo Code API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{PromoCode, PromoCodeCreate, PromoCodeUpdate, PromoValidateRequest, PromoValidation};
use shared::util::normalize_code;

use crate::core::ServerState;
use crate::db::repository::{RepoError, promo_code};
use crate::services::promo;
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_amount, validate_optional_text, validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

const RESOURCE: &str = "promo_code";

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

fn check_dates(start: Option<i64>, end: Option<i64>) -> AppResult<()> {
    if let (Some(start), Some(end)) = (start, end)
        && end < start
    {
        return Err(AppError::validation("end_date must not be before start_date"));
    }
    Ok(())
}

/// POST /api/promo-codes/validate - checks without recording a use
///
/// An unusable code is still a 200 answer with `valid: false`; the message
/// is shown as is by the storefront.
pub async fn validate(
    State(state): State<ServerState>,
    Json(req): Json<PromoValidateRequest>,
) -> AppResult<Json<ApiResponse<PromoValidation>>> {
    validate_amount(req.subtotal, "subtotal")?;
    let check = promo::validate(
        &state.pool,
        &req.code,
        req.subtotal,
        req.email.as_deref(),
        req.restaurant_id,
        shared::util::now_millis(),
    )
    .await?;

    if let Some(code) = check.rejection {
        tracing::debug!(code = %normalize_code(&req.code), reason = ?code, "Promo code rejected");
    }
    Ok(ok(check.validation))
}

/// GET /api/admin/promo-codes
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<PromoCode>>>> {
    Ok(ok(promo_code::find_all(&state.pool).await?))
}

/// POST /api/admin/promo-codes - codes are stored upper-case
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PromoCodeCreate>,
) -> AppResult<Json<ApiResponse<PromoCode>>> {
    validate_required_text(&payload.code, "code", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    check_discount(payload.discount, payload.is_percentage)?;
    if let Some(min) = payload.min_order {
        validate_amount(min, "min_order")?;
    }
    check_dates(payload.start_date, payload.end_date)?;

    let created = promo_code::create(&state.pool, payload).await.map_err(|e| match e {
        RepoError::Duplicate(_) => AppError::new(ErrorCode::PromoCodeExists),
        other => other.into(),
    })?;
    tracing::info!(promo_code = %created.code, "Promo code created");
    state.broadcast_sync(RESOURCE, "created", &created.id.to_string(), Some(&created));
    Ok(ok(created))
}

/// PUT /api/admin/promo-codes/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PromoCodeUpdate>,
) -> AppResult<Json<ApiResponse<PromoCode>>> {
    let existing = promo_code::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Promo code {id}")))?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    check_discount(
        payload.discount.unwrap_or(existing.discount),
        payload.is_percentage.unwrap_or(existing.is_percentage),
    )?;
    if let Some(min) = payload.min_order {
        validate_amount(min, "min_order")?;
    }
    check_dates(
        payload.start_date.or(existing.start_date),
        payload.end_date.or(existing.end_date),
    )?;

    let updated = promo_code::update(&state.pool, id, payload).await?;
    state.broadcast_sync(RESOURCE, "updated", &id.to_string(), Some(&updated));
    Ok(ok(updated))
}

/// DELETE /api/admin/promo-codes/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    if !promo_code::delete(&state.pool, id).await? {
        return Err(AppError::not_found(format!("Promo code {id}")));
    }
    state.broadcast_sync::<()>(RESOURCE, "deleted", &id.to_string(), None);
    Ok(ok(true))
}
