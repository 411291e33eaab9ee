//! Day Promotion Repository

use super::{RepoError, RepoResult};
use shared::models::{DayPromotion, DayPromotionCreate, DayPromotionUpdate};
use sqlx::SqlitePool;
use sqlx::types::Json;

const COLUMNS: &str = "id, title, description, discount, is_percentage, applicable_days, \
     applicable_categories, applicable_products, applicable_restaurants, start_time, end_time, is_active";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<DayPromotion>> {
    let sql = format!("SELECT {COLUMNS} FROM day_promotions ORDER BY created_at, id");
    let promotions = sqlx::query_as::<_, DayPromotion>(&sql).fetch_all(pool).await?;
    Ok(promotions)
}

/// Enabled promotions, oldest first so that "first match" is stable
pub async fn find_enabled(pool: &SqlitePool) -> RepoResult<Vec<DayPromotion>> {
    let sql = format!("SELECT {COLUMNS} FROM day_promotions WHERE is_active = 1 ORDER BY created_at, id");
    let promotions = sqlx::query_as::<_, DayPromotion>(&sql).fetch_all(pool).await?;
    Ok(promotions)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DayPromotion>> {
    let sql = format!("SELECT {COLUMNS} FROM day_promotions WHERE id = ?");
    let promotion = sqlx::query_as::<_, DayPromotion>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(promotion)
}

pub async fn create(pool: &SqlitePool, data: DayPromotionCreate) -> RepoResult<DayPromotion> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO day_promotions (id, title, description, discount, is_percentage, applicable_days, \
         applicable_categories, applicable_products, applicable_restaurants, start_time, end_time, is_active, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?)",
    )
    .bind(id)
    .bind(&data.title)
    .bind(&data.description)
    .bind(data.discount)
    .bind(data.is_percentage)
    .bind(Json(&data.applicable_days))
    .bind(Json(&data.applicable_categories))
    .bind(Json(&data.applicable_products))
    .bind(Json(&data.applicable_restaurants))
    .bind(&data.start_time)
    .bind(&data.end_time)
    .bind(shared::util::now_millis())
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create promotion".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: DayPromotionUpdate) -> RepoResult<DayPromotion> {
    let rows = sqlx::query(
        "UPDATE day_promotions SET title = COALESCE(?1, title), description = COALESCE(?2, description), \
         discount = COALESCE(?3, discount), is_percentage = COALESCE(?4, is_percentage), \
         applicable_days = COALESCE(?5, applicable_days), applicable_categories = COALESCE(?6, applicable_categories), \
         applicable_products = COALESCE(?7, applicable_products), \
         applicable_restaurants = COALESCE(?8, applicable_restaurants), start_time = COALESCE(?9, start_time), \
         end_time = COALESCE(?10, end_time), is_active = COALESCE(?11, is_active) WHERE id = ?12",
    )
    .bind(data.title)
    .bind(data.description)
    .bind(data.discount)
    .bind(data.is_percentage)
    .bind(data.applicable_days.map(Json))
    .bind(data.applicable_categories.map(Json))
    .bind(data.applicable_products.map(Json))
    .bind(data.applicable_restaurants.map(Json))
    .bind(data.start_time)
    .bind(data.end_time)
    .bind(data.is_active)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Promotion {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Promotion {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM day_promotions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
