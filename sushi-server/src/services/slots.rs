//! Slot verification, reservation and the checkout time picker

use std::collections::HashSet;

use chrono::{Duration, NaiveTime, Timelike};
use shared::models::{AvailableSlot, BlockedSlot, OrderType, SlotCheck, SlotRequest};

use crate::core::ServerState;
use crate::db::repository::{closure, opening_hours, time_slot};
use crate::db::repository::time_slot::HoldOutcome;
use crate::slots::{self, SlotCapacity, hours};
use crate::utils::time::{
    MINUTE_MS, day_bounds, format_hhmm, local_to_millis, minute_start, parse_date, parse_hhmm, to_local,
    weekday_index,
};
use crate::utils::{AppError, AppResult, ErrorCode};

/// One slot, resolved on the restaurant clock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTarget {
    pub restaurant_id: i64,
    pub order_type: OrderType,
    /// Unix millis, truncated to the minute
    pub slot_start: i64,
    /// YYYY-MM-DD local
    pub date: String,
    /// HH:MM local
    pub hhmm: String,
}

impl SlotTarget {
    pub fn new(
        restaurant_id: i64,
        order_type: OrderType,
        millis: i64,
        tz: chrono::FixedOffset,
    ) -> AppResult<Self> {
        let slot_start = minute_start(millis);
        let local = to_local(slot_start, tz).ok_or_else(|| AppError::validation("Timestamp out of range"))?;
        Ok(Self {
            restaurant_id,
            order_type,
            slot_start,
            date: local.format("%Y-%m-%d").to_string(),
            hhmm: local.format("%H:%M").to_string(),
        })
    }

    /// Target from a verify/reserve request; every field is required
    pub fn from_request(req: &SlotRequest, tz: chrono::FixedOffset) -> AppResult<Self> {
        let (Some(restaurant_id), Some(order_type), Some(scheduled_for)) =
            (req.restaurant_id, req.order_type, req.scheduled_for)
        else {
            return Err(AppError::with_message(
                ErrorCode::RequiredField,
                "restaurant_id, order_type and scheduled_for are required",
            ));
        };
        Self::new(restaurant_id, order_type, scheduled_for.timestamp_millis(), tz)
    }
}

/// Result of a reservation attempt
#[derive(Debug, Clone)]
pub enum Reservation {
    /// Hold taken (or no hold needed for dine-in)
    Held(SlotCheck),
    /// Slot blocked or full; the check explains why
    Rejected(ErrorCode, SlotCheck),
}

async fn capacity_at(
    state: &ServerState,
    target: &SlotTarget,
) -> AppResult<(SlotCapacity, Option<BlockedSlot>)> {
    let event = time_slot::find_active_event_on(&state.pool, &target.date).await?;
    let capacity = slots::resolve_capacity(target.order_type, event.as_ref(), &target.hhmm);
    let blocked =
        time_slot::find_blocked_at(&state.pool, target.restaurant_id, &target.date, &target.hhmm).await?;
    Ok((capacity, blocked))
}

/// Availability of one slot, read-only
pub async fn verify(state: &ServerState, target: &SlotTarget) -> AppResult<SlotCheck> {
    if !slots::is_limited(target.order_type) {
        return Ok(slots::dine_in_check());
    }

    let (capacity, blocked) = capacity_at(state, target).await?;
    let current = time_slot::count_occupancy(
        &state.pool,
        target.restaurant_id,
        target.order_type,
        target.slot_start,
        shared::util::now_millis(),
    )
    .await?;

    Ok(slots::evaluate(target.order_type, capacity, blocked.as_ref(), current))
}

/// Take a hold on one slot
///
/// The hold is a single conditional insert, so two concurrent requests for
/// the last place cannot both succeed.
pub async fn reserve(state: &ServerState, target: &SlotTarget) -> AppResult<Reservation> {
    if !slots::is_limited(target.order_type) {
        return Ok(Reservation::Held(slots::dine_in_check()));
    }

    let (capacity, blocked) = capacity_at(state, target).await?;
    let now = shared::util::now_millis();

    if let Some(block) = blocked {
        let check = slots::evaluate(target.order_type, capacity, Some(&block), 0);
        return Ok(Reservation::Rejected(ErrorCode::SlotBlocked, check));
    }

    let ttl_ms = state.config.slot_hold_minutes.max(1) * MINUTE_MS;
    let outcome = time_slot::try_hold(
        &state.pool,
        target.restaurant_id,
        target.order_type,
        target.slot_start,
        capacity.max_allowed,
        now,
        ttl_ms,
    )
    .await?;

    match outcome {
        HoldOutcome::Reserved(hold) => {
            tracing::debug!(
                reservation_id = hold.id,
                restaurant_id = target.restaurant_id,
                slot = %target.hhmm,
                "Slot hold taken"
            );
            Ok(Reservation::Held(SlotCheck {
                available: true,
                message: slots::RESERVED_MESSAGE.to_string(),
                max_allowed: Some(capacity.max_allowed),
                is_event_slot: capacity.is_event_slot,
                reserved: true,
                reservation_id: Some(hold.id),
                expires_at: Some(hold.expires_at),
                ..Default::default()
            }))
        }
        HoldOutcome::Full { current_count } => {
            tracing::info!(
                restaurant_id = target.restaurant_id,
                order_type = %target.order_type,
                slot = %target.hhmm,
                current_count,
                max_allowed = capacity.max_allowed,
                "Slot full"
            );
            let check = SlotCheck {
                available: false,
                message: slots::full_message(target.order_type),
                current_count: Some(current_count),
                max_allowed: Some(capacity.max_allowed),
                is_event_slot: capacity.is_event_slot,
                ..Default::default()
            };
            Ok(Reservation::Rejected(ErrorCode::SlotUnavailable, check))
        }
    }
}

fn rejection_error(code: ErrorCode, check: SlotCheck) -> AppError {
    let mut err = AppError::with_message(code, check.message.clone());
    if let Some(current) = check.current_count {
        err = err.with_detail("current_count", current);
    }
    if let Some(max) = check.max_allowed {
        err = err.with_detail("max_allowed", max);
    }
    err.with_detail("is_event_slot", check.is_event_slot)
}

/// Capacity for a new order: consume the client's hold, or take one now.
///
/// Returns the hold to bind to the order (none for dine-in) and whether it
/// was taken by this call, so the caller can release it on failure.
pub async fn secure_for_order(
    state: &ServerState,
    target: &SlotTarget,
    reservation_id: Option<i64>,
) -> AppResult<(Option<i64>, bool)> {
    if !slots::is_limited(target.order_type) {
        return Ok((None, false));
    }

    let mut expired_hold = None;
    if let Some(id) = reservation_id {
        let hold = time_slot::find_reservation(&state.pool, id)
            .await?
            .filter(|h| {
                h.restaurant_id == target.restaurant_id
                    && h.order_type == target.order_type
                    && h.slot_start == target.slot_start
                    && h.order_id.is_none()
            })
            .ok_or_else(|| AppError::new(ErrorCode::ReservationNotFound))?;

        if hold.expires_at > shared::util::now_millis() {
            let (_, blocked) = capacity_at(state, target).await?;
            if let Some(block) = blocked {
                return Err(AppError::with_message(
                    ErrorCode::SlotBlocked,
                    slots::blocked_message(block.reason.as_deref()),
                ));
            }
            return Ok((Some(hold.id), false));
        }

        // Expired: the place may still be free
        tracing::debug!(reservation_id = id, "Slot hold expired, taking a new one");
        time_slot::release(&state.pool, id).await?;
        expired_hold = Some(id);
    }

    match reserve(state, target).await? {
        Reservation::Held(check) => Ok((check.reservation_id, check.reservation_id.is_some())),
        // The expired hold's place went to someone else
        Reservation::Rejected(ErrorCode::SlotUnavailable, check) if expired_hold.is_some() => {
            Err(rejection_error(ErrorCode::ReservationExpired, check))
        }
        Reservation::Rejected(code, check) => Err(rejection_error(code, check)),
    }
}

/// Selectable times for a date, blocked and full slots excluded
pub async fn available(
    state: &ServerState,
    restaurant_id: i64,
    order_type: OrderType,
    date: Option<&str>,
    now: i64,
) -> AppResult<Vec<AvailableSlot>> {
    let tz = state.config.timezone();
    let now_local = to_local(now, tz).ok_or_else(|| AppError::internal("Clock out of range"))?;
    let today = now_local.date_naive();

    let day = match date {
        Some(d) => parse_date(d).ok_or_else(|| AppError::validation(format!("Invalid date: {d}")))?,
        None => today,
    };
    if day < today {
        return Ok(Vec::new());
    }
    let day_str = day.format("%Y-%m-%d").to_string();

    let stored = opening_hours::find_by_restaurant(&state.pool, restaurant_id).await?;
    let times: Vec<NaiveTime> = if stored.is_empty() {
        let current = (day == today).then(|| now_local.time());
        slots::fallback_times(current)
    } else {
        let weekday = day
            .and_time(NaiveTime::MIN)
            .and_local_timezone(tz)
            .single()
            .map(|dt| weekday_index(&dt))
            .unwrap_or_default();
        let rows = hours::rows_for_day(&stored, weekday);
        let earliest = if day == today {
            let lead = now_local + Duration::minutes(state.config.slot_lead_minutes.max(0));
            if lead.date_naive() != today {
                return Ok(Vec::new());
            }
            NaiveTime::from_hms_opt(lead.hour(), lead.minute(), 0)
        } else {
            None
        };
        slots::picker_times(&rows, earliest)
    };

    let closures = closure::find_on_date(&state.pool, restaurant_id, &day_str).await?;
    let blocked: HashSet<String> = time_slot::find_blocked(&state.pool, restaurant_id, Some(&day_str))
        .await?
        .into_iter()
        .filter_map(|b| parse_hhmm(&b.blocked_time).map(format_hhmm))
        .collect();

    let (from, to) = day_bounds(day, tz).ok_or_else(|| AppError::internal("Date out of range"))?;
    let occupancy = if slots::is_limited(order_type) {
        time_slot::occupancy_between(&state.pool, restaurant_id, order_type, from, to, now).await?
    } else {
        Default::default()
    };
    let event = time_slot::find_active_event_on(&state.pool, &day_str).await?;

    let mut out = Vec::with_capacity(times.len());
    for time in times {
        let hhmm = format_hhmm(time);
        if blocked.contains(&hhmm) || hours::closure_at(&closures, day, time).is_some() {
            continue;
        }
        let Some(starts_at) = local_to_millis(day, time, tz) else {
            continue;
        };
        if starts_at <= now {
            continue;
        }

        let capacity = slots::resolve_capacity(order_type, event.as_ref(), &hhmm);
        let taken = occupancy.get(&starts_at).copied().unwrap_or(0);
        let remaining = capacity.max_allowed - taken;
        if slots::is_limited(order_type) && remaining <= 0 {
            continue;
        }
        out.push(AvailableSlot {
            time: hhmm,
            starts_at,
            remaining: remaining.max(0),
        });
    }
    Ok(out)
}
