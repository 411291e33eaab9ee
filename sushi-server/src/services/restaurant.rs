//! Restaurant lookups and the opening-hours check

use chrono::{NaiveTime, Timelike};
use shared::models::{OpenStatus, OpeningHours, Restaurant};
use sqlx::SqlitePool;

use crate::core::ServerState;
use crate::db::repository::{closure, opening_hours, restaurant};
use crate::slots::hours;
use crate::utils::time::{to_local, weekday_index};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Restaurant by id, `RestaurantNotFound` otherwise
pub async fn load(pool: &SqlitePool, id: i64) -> AppResult<Restaurant> {
    restaurant::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::RestaurantNotFound, format!("Restaurant {id} not found")))
}

/// Restaurant that accepts orders: it exists and is active
pub async fn load_active(pool: &SqlitePool, id: i64) -> AppResult<Restaurant> {
    let restaurant = load(pool, id).await?;
    if !restaurant.is_active {
        return Err(AppError::new(ErrorCode::RestaurantInactive));
    }
    Ok(restaurant)
}

/// Stored opening hours, or the default week when none are stored
pub async fn effective_hours(pool: &SqlitePool, restaurant_id: i64) -> AppResult<Vec<OpeningHours>> {
    let rows = opening_hours::find_by_restaurant(pool, restaurant_id).await?;
    if rows.is_empty() {
        return Ok(hours::default_opening_hours());
    }
    Ok(rows)
}

/// Open/closed answer at an instant, on the restaurant clock
pub async fn open_status_at(state: &ServerState, restaurant_id: i64, millis: i64) -> AppResult<OpenStatus> {
    let local = to_local(millis, state.config.timezone())
        .ok_or_else(|| AppError::validation("Timestamp out of range"))?;
    let date = local.date_naive();
    let time = NaiveTime::from_hms_opt(local.hour(), local.minute(), 0).unwrap_or(NaiveTime::MIN);

    let hours = effective_hours(&state.pool, restaurant_id).await?;
    let closures = closure::find_on_date(&state.pool, restaurant_id, &date.format("%Y-%m-%d").to_string()).await?;

    Ok(hours::open_status(&hours, &closures, date, weekday_index(&local), time))
}
