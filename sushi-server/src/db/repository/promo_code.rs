//! Promo Code Repository
//!
//! Codes are stored upper-case; lookups normalise their input the same way.

use super::{RepoError, RepoResult};
use shared::models::{PromoCode, PromoCodeCreate, PromoCodeUpdate};
use shared::util::normalize_code;
use sqlx::types::Json;
use sqlx::{Executor, Sqlite, SqlitePool};

const COLUMNS: &str = "id, code, description, discount, is_percentage, min_order, start_date, end_date, \
     is_one_time_use, applicable_categories, restaurant_id, is_active";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<PromoCode>> {
    let sql = format!("SELECT {COLUMNS} FROM promo_codes ORDER BY code");
    let codes = sqlx::query_as::<_, PromoCode>(&sql).fetch_all(pool).await?;
    Ok(codes)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<PromoCode>> {
    let sql = format!("SELECT {COLUMNS} FROM promo_codes WHERE id = ?");
    let code = sqlx::query_as::<_, PromoCode>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(code)
}

pub async fn find_by_code(pool: &SqlitePool, code: &str) -> RepoResult<Option<PromoCode>> {
    let sql = format!("SELECT {COLUMNS} FROM promo_codes WHERE code = ?");
    let code = sqlx::query_as::<_, PromoCode>(&sql)
        .bind(normalize_code(code))
        .fetch_optional(pool)
        .await?;
    Ok(code)
}

/// An existing code is a `Duplicate`
pub async fn create(pool: &SqlitePool, data: PromoCodeCreate) -> RepoResult<PromoCode> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO promo_codes (id, code, description, discount, is_percentage, min_order, start_date, end_date, \
         is_one_time_use, applicable_categories, restaurant_id, is_active, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?)",
    )
    .bind(id)
    .bind(normalize_code(&data.code))
    .bind(&data.description)
    .bind(data.discount)
    .bind(data.is_percentage)
    .bind(data.min_order)
    .bind(data.start_date)
    .bind(data.end_date)
    .bind(data.is_one_time_use)
    .bind(Json(&data.applicable_categories))
    .bind(data.restaurant_id)
    .bind(shared::util::now_millis())
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create promo code".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: PromoCodeUpdate) -> RepoResult<PromoCode> {
    let rows = sqlx::query(
        "UPDATE promo_codes SET description = COALESCE(?1, description), discount = COALESCE(?2, discount), \
         is_percentage = COALESCE(?3, is_percentage), min_order = COALESCE(?4, min_order), \
         start_date = COALESCE(?5, start_date), end_date = COALESCE(?6, end_date), \
         is_one_time_use = COALESCE(?7, is_one_time_use), \
         applicable_categories = COALESCE(?8, applicable_categories), is_active = COALESCE(?9, is_active) \
         WHERE id = ?10",
    )
    .bind(data.description)
    .bind(data.discount)
    .bind(data.is_percentage)
    .bind(data.min_order)
    .bind(data.start_date)
    .bind(data.end_date)
    .bind(data.is_one_time_use)
    .bind(data.applicable_categories.map(Json))
    .bind(data.is_active)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Promo code {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Promo code {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM promo_codes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Whether `email` already used `code`
pub async fn has_used(pool: &SqlitePool, code: &str, email: &str) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM promo_code_usage WHERE promo_code = ? AND user_email = ?",
    )
    .bind(normalize_code(code))
    .bind(email.trim().to_lowercase())
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

/// Record a usage; returns false when it was already recorded
pub async fn record_usage<'e, E>(executor: E, code: &str, email: &str) -> RepoResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "INSERT OR IGNORE INTO promo_code_usage (promo_code, user_email, used_at) VALUES (?, ?, ?)",
    )
    .bind(normalize_code(code))
    .bind(email.trim().to_lowercase())
    .bind(shared::util::now_millis())
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() > 0)
}
