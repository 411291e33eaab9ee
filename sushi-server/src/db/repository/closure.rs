//! Closure Repository

use super::{RepoError, RepoResult};
use shared::models::{Closure, ClosureCreate};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, restaurant_id, closure_date, is_all_day, start_time, end_time, reason";

/// Closures of a restaurant, optionally from a date onwards
pub async fn find_by_restaurant(
    pool: &SqlitePool,
    restaurant_id: i64,
    from_date: Option<&str>,
) -> RepoResult<Vec<Closure>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM restaurant_closures \
         WHERE restaurant_id = ? AND (? IS NULL OR closure_date >= ?) ORDER BY closure_date, start_time"
    );
    let closures = sqlx::query_as::<_, Closure>(&sql)
        .bind(restaurant_id)
        .bind(from_date)
        .bind(from_date)
        .fetch_all(pool)
        .await?;
    Ok(closures)
}

pub async fn find_on_date(pool: &SqlitePool, restaurant_id: i64, date: &str) -> RepoResult<Vec<Closure>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM restaurant_closures WHERE restaurant_id = ? AND closure_date = ?"
    );
    let closures = sqlx::query_as::<_, Closure>(&sql)
        .bind(restaurant_id)
        .bind(date)
        .fetch_all(pool)
        .await?;
    Ok(closures)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Closure>> {
    let sql = format!("SELECT {COLUMNS} FROM restaurant_closures WHERE id = ?");
    let closure = sqlx::query_as::<_, Closure>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(closure)
}

pub async fn create(pool: &SqlitePool, restaurant_id: i64, data: ClosureCreate) -> RepoResult<Closure> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO restaurant_closures (id, restaurant_id, closure_date, is_all_day, start_time, end_time, reason) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(&data.closure_date)
    .bind(data.is_all_day)
    .bind(&data.start_time)
    .bind(&data.end_time)
    .bind(&data.reason)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create closure".into()))
}

pub async fn delete(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM restaurant_closures WHERE id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
