//! Payment Repository

use super::{RepoError, RepoResult};
use shared::models::{Payment, PaymentStatus};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, order_id, amount, status, provider_ref, checkout_url, created_at";

pub async fn create(
    pool: &SqlitePool,
    order_id: &str,
    amount: f64,
    provider_ref: Option<&str>,
    checkout_url: Option<&str>,
) -> RepoResult<Payment> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO payments (id, order_id, amount, status, provider_ref, checkout_url, created_at) \
         VALUES (?, ?, ?, 'pending', ?, ?, ?)",
    )
    .bind(id)
    .bind(order_id)
    .bind(amount)
    .bind(provider_ref)
    .bind(checkout_url)
    .bind(shared::util::now_millis())
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create payment".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Payment>> {
    let sql = format!("SELECT {COLUMNS} FROM payments WHERE id = ?");
    let payment = sqlx::query_as::<_, Payment>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(payment)
}

pub async fn find_by_order(pool: &SqlitePool, order_id: &str) -> RepoResult<Vec<Payment>> {
    let sql = format!("SELECT {COLUMNS} FROM payments WHERE order_id = ? ORDER BY created_at DESC");
    let payments = sqlx::query_as::<_, Payment>(&sql)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(payments)
}

/// Settle the pending attempts of an order
pub async fn settle_pending(pool: &SqlitePool, order_id: &str, status: PaymentStatus) -> RepoResult<u64> {
    let rows = sqlx::query("UPDATE payments SET status = ? WHERE order_id = ? AND status = 'pending'")
        .bind(status)
        .bind(order_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}
