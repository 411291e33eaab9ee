//! Time Slot Repository
//!
//! Special events, admin-blocked slots and capacity holds.
//!
//! Occupancy of a one-minute slot is the number of live orders scheduled in
//! it plus the unexpired holds not yet bound to an order. A hold is taken
//! with a single conditional `INSERT ... SELECT ... WHERE occupancy < max`,
//! so the count and the insert run under the same SQLite write lock and two
//! concurrent requests can never both take the last place.

use std::collections::HashMap;

use super::{RepoError, RepoResult};
use shared::models::{
    BlockedSlot, BlockedSlotCreate, OrderType, SlotReservation, SpecialEvent, SpecialEventCreate,
    SpecialEventUpdate,
};
use sqlx::types::Json;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::slots::SLOT_MS;

const EVENT_COLUMNS: &str = "id, name, event_date, is_active, time_slots";
const BLOCKED_COLUMNS: &str = "id, restaurant_id, blocked_date, blocked_time, reason";
const RESERVATION_COLUMNS: &str =
    "id, restaurant_id, order_type, slot_start, expires_at, order_id, created_at";

/// Orders holding a place in their slot
const LIVE_ORDER_FILTER: &str =
    "payment_status IN ('paid', 'pending') AND status != 'cancelled'";

// ========== Special events ==========

pub async fn find_events(pool: &SqlitePool) -> RepoResult<Vec<SpecialEvent>> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM special_events ORDER BY event_date");
    let events = sqlx::query_as::<_, SpecialEvent>(&sql).fetch_all(pool).await?;
    Ok(events)
}

pub async fn find_event(pool: &SqlitePool, id: i64) -> RepoResult<Option<SpecialEvent>> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM special_events WHERE id = ?");
    let event = sqlx::query_as::<_, SpecialEvent>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(event)
}

/// Active event on a local date (YYYY-MM-DD)
pub async fn find_active_event_on(pool: &SqlitePool, date: &str) -> RepoResult<Option<SpecialEvent>> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM special_events WHERE event_date = ? AND is_active = 1 ORDER BY id LIMIT 1"
    );
    let event = sqlx::query_as::<_, SpecialEvent>(&sql)
        .bind(date)
        .fetch_optional(pool)
        .await?;
    Ok(event)
}

pub async fn create_event(pool: &SqlitePool, data: SpecialEventCreate) -> RepoResult<SpecialEvent> {
    let id = shared::util::snowflake_id();
    sqlx::query("INSERT INTO special_events (id, name, event_date, is_active, time_slots) VALUES (?, ?, ?, 1, ?)")
        .bind(id)
        .bind(&data.name)
        .bind(&data.event_date)
        .bind(Json(&data.time_slots))
        .execute(pool)
        .await?;
    find_event(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create special event".into()))
}

pub async fn update_event(pool: &SqlitePool, id: i64, data: SpecialEventUpdate) -> RepoResult<SpecialEvent> {
    let rows = sqlx::query(
        "UPDATE special_events SET name = COALESCE(?1, name), event_date = COALESCE(?2, event_date), \
         is_active = COALESCE(?3, is_active), time_slots = COALESCE(?4, time_slots) WHERE id = ?5",
    )
    .bind(data.name)
    .bind(data.event_date)
    .bind(data.is_active)
    .bind(data.time_slots.map(Json))
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Special event {id} not found")));
    }
    find_event(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Special event {id} not found")))
}

pub async fn delete_event(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM special_events WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

// ========== Blocked slots ==========

/// Blocked slots of a restaurant, optionally on one date
pub async fn find_blocked(
    pool: &SqlitePool,
    restaurant_id: i64,
    date: Option<&str>,
) -> RepoResult<Vec<BlockedSlot>> {
    let sql = format!(
        "SELECT {BLOCKED_COLUMNS} FROM blocked_time_slots \
         WHERE restaurant_id = ? AND (? IS NULL OR blocked_date = ?) ORDER BY blocked_date, blocked_time"
    );
    let slots = sqlx::query_as::<_, BlockedSlot>(&sql)
        .bind(restaurant_id)
        .bind(date)
        .bind(date)
        .fetch_all(pool)
        .await?;
    Ok(slots)
}

pub async fn find_blocked_at(
    pool: &SqlitePool,
    restaurant_id: i64,
    date: &str,
    time: &str,
) -> RepoResult<Option<BlockedSlot>> {
    let sql = format!(
        "SELECT {BLOCKED_COLUMNS} FROM blocked_time_slots \
         WHERE restaurant_id = ? AND blocked_date = ? AND blocked_time = ?"
    );
    let slot = sqlx::query_as::<_, BlockedSlot>(&sql)
        .bind(restaurant_id)
        .bind(date)
        .bind(time)
        .fetch_optional(pool)
        .await?;
    Ok(slot)
}

/// Blocking the same slot twice is a `Duplicate`
pub async fn block(pool: &SqlitePool, restaurant_id: i64, data: BlockedSlotCreate) -> RepoResult<BlockedSlot> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO blocked_time_slots (id, restaurant_id, blocked_date, blocked_time, reason) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(&data.blocked_date)
    .bind(&data.blocked_time)
    .bind(&data.reason)
    .execute(pool)
    .await?;
    let sql = format!("SELECT {BLOCKED_COLUMNS} FROM blocked_time_slots WHERE id = ?");
    sqlx::query_as::<_, BlockedSlot>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to block slot".into()))
}

pub async fn unblock(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM blocked_time_slots WHERE id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

// ========== Occupancy and holds ==========

/// Places taken in the slot starting at `slot_start`
pub async fn count_occupancy<'e, E>(
    executor: E,
    restaurant_id: i64,
    order_type: OrderType,
    slot_start: i64,
    now: i64,
) -> RepoResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT \
           (SELECT COUNT(*) FROM orders WHERE restaurant_id = ?1 AND order_type = ?2 AND {LIVE_ORDER_FILTER} \
              AND scheduled_for >= ?3 AND scheduled_for < ?3 + {SLOT_MS}) \
         + (SELECT COUNT(*) FROM slot_reservations WHERE restaurant_id = ?1 AND order_type = ?2 \
              AND slot_start = ?3 AND order_id IS NULL AND expires_at > ?4)"
    );
    let count: i64 = sqlx::query_scalar(&sql)
        .bind(restaurant_id)
        .bind(order_type)
        .bind(slot_start)
        .bind(now)
        .fetch_one(executor)
        .await?;
    Ok(count)
}

/// Occupancy of every slot in `[from, to)`, keyed by slot start
pub async fn occupancy_between(
    pool: &SqlitePool,
    restaurant_id: i64,
    order_type: OrderType,
    from: i64,
    to: i64,
    now: i64,
) -> RepoResult<HashMap<i64, i64>> {
    let sql = format!(
        "SELECT slot, COUNT(*) FROM ( \
           SELECT (scheduled_for / {SLOT_MS}) * {SLOT_MS} AS slot FROM orders \
             WHERE restaurant_id = ?1 AND order_type = ?2 AND {LIVE_ORDER_FILTER} \
               AND scheduled_for >= ?3 AND scheduled_for < ?4 \
           UNION ALL \
           SELECT slot_start AS slot FROM slot_reservations \
             WHERE restaurant_id = ?1 AND order_type = ?2 AND slot_start >= ?3 AND slot_start < ?4 \
               AND order_id IS NULL AND expires_at > ?5 \
         ) GROUP BY slot"
    );
    let rows: Vec<(i64, i64)> = sqlx::query_as(&sql)
        .bind(restaurant_id)
        .bind(order_type)
        .bind(from)
        .bind(to)
        .bind(now)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().collect())
}

/// Outcome of a hold attempt
#[derive(Debug, Clone)]
pub enum HoldOutcome {
    Reserved(SlotReservation),
    Full { current_count: i64 },
}

/// Take one place in a slot when `occupancy < max_allowed`
///
/// The conditional insert is the first statement of its transaction, so it
/// starts with the write lock held and the count it checks cannot go stale.
pub async fn try_hold(
    pool: &SqlitePool,
    restaurant_id: i64,
    order_type: OrderType,
    slot_start: i64,
    max_allowed: i64,
    now: i64,
    ttl_ms: i64,
) -> RepoResult<HoldOutcome> {
    let id = shared::util::snowflake_id();
    let mut tx = pool.begin().await?;

    let sql = format!(
        "INSERT INTO slot_reservations (id, restaurant_id, order_type, slot_start, expires_at, order_id, created_at) \
         SELECT ?1, ?2, ?3, ?4, ?5, NULL, ?6 \
         WHERE ( \
           (SELECT COUNT(*) FROM orders WHERE restaurant_id = ?2 AND order_type = ?3 AND {LIVE_ORDER_FILTER} \
              AND scheduled_for >= ?4 AND scheduled_for < ?4 + {SLOT_MS}) \
         + (SELECT COUNT(*) FROM slot_reservations WHERE restaurant_id = ?2 AND order_type = ?3 \
              AND slot_start = ?4 AND order_id IS NULL AND expires_at > ?6) \
         ) < ?7"
    );
    let inserted = sqlx::query(&sql)
        .bind(id)
        .bind(restaurant_id)
        .bind(order_type)
        .bind(slot_start)
        .bind(now + ttl_ms)
        .bind(now)
        .bind(max_allowed)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if inserted == 0 {
        let current_count = count_occupancy(&mut *tx, restaurant_id, order_type, slot_start, now).await?;
        tx.commit().await?;
        return Ok(HoldOutcome::Full { current_count });
    }

    let sql = format!("SELECT {RESERVATION_COLUMNS} FROM slot_reservations WHERE id = ?");
    let reservation = sqlx::query_as::<_, SlotReservation>(&sql)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(HoldOutcome::Reserved(reservation))
}

pub async fn find_reservation(pool: &SqlitePool, id: i64) -> RepoResult<Option<SlotReservation>> {
    let sql = format!("SELECT {RESERVATION_COLUMNS} FROM slot_reservations WHERE id = ?");
    let reservation = sqlx::query_as::<_, SlotReservation>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(reservation)
}

/// Attach an unbound hold to its order; false when it was already consumed
pub async fn bind_reservation<'e, E>(executor: E, id: i64, order_id: &str) -> RepoResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("UPDATE slot_reservations SET order_id = ? WHERE id = ? AND order_id IS NULL")
        .bind(order_id)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Drop a hold that was never bound
pub async fn release(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM slot_reservations WHERE id = ? AND order_id IS NULL")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Purge expired unbound holds, returns how many were removed
pub async fn purge_expired(pool: &SqlitePool, now: i64) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM slot_reservations WHERE order_id IS NULL AND expires_at <= ?")
        .bind(now)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}
