//! Notification Outbox Repository

use super::RepoResult;
use shared::models::{Notification, NotificationDraft, NotificationState};
use sqlx::{Executor, Sqlite, SqlitePool};

const COLUMNS: &str = "id, order_id, channel, recipient, subject, content, status_update, state, attempts, \
     last_error, created_at, sent_at";

/// Queue a notification, returns its id
pub async fn enqueue<'e, E>(executor: E, draft: &NotificationDraft) -> RepoResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO order_notifications (id, order_id, channel, recipient, subject, content, status_update, \
         state, attempts, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, 'queued', 0, ?)",
    )
    .bind(id)
    .bind(&draft.order_id)
    .bind(draft.channel)
    .bind(&draft.recipient)
    .bind(&draft.subject)
    .bind(&draft.content)
    .bind(&draft.status_update)
    .bind(shared::util::now_millis())
    .execute(executor)
    .await?;
    Ok(id)
}

/// Oldest queued notifications
pub async fn find_queued(pool: &SqlitePool, limit: i64) -> RepoResult<Vec<Notification>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM order_notifications WHERE state = 'queued' ORDER BY created_at LIMIT ?"
    );
    let rows = sqlx::query_as::<_, Notification>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Notifications of one order, or the latest ones
pub async fn list(pool: &SqlitePool, order_id: Option<&str>, limit: i64) -> RepoResult<Vec<Notification>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM order_notifications WHERE (? IS NULL OR order_id = ?) \
         ORDER BY created_at DESC LIMIT ?"
    );
    let rows = sqlx::query_as::<_, Notification>(&sql)
        .bind(order_id)
        .bind(order_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn mark_sent(pool: &SqlitePool, id: i64, now: i64) -> RepoResult<()> {
    sqlx::query(
        "UPDATE order_notifications SET state = 'sent', attempts = attempts + 1, sent_at = ?, last_error = NULL \
         WHERE id = ?",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Count a failed attempt; the row turns `failed` once `max_attempts` is
/// reached. Returns the new state.
pub async fn mark_attempt_failed(
    pool: &SqlitePool,
    id: i64,
    error: &str,
    max_attempts: i64,
) -> RepoResult<NotificationState> {
    let state: NotificationState = sqlx::query_scalar(
        "UPDATE order_notifications SET attempts = attempts + 1, last_error = ?1, \
         state = CASE WHEN attempts + 1 >= ?2 THEN 'failed' ELSE 'queued' END \
         WHERE id = ?3 RETURNING state",
    )
    .bind(error)
    .bind(max_attempts)
    .bind(id)
    .fetch_one(pool)
    .await?;
    Ok(state)
}
