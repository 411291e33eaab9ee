//! Restaurant Repository

use super::{RepoError, RepoResult};
use shared::models::{Restaurant, RestaurantCreate, RestaurantSettings, RestaurantUpdate};
use sqlx::SqlitePool;
use sqlx::types::Json;

const COLUMNS: &str =
    "id, name, address, city, postal_code, phone, email, is_active, settings, created_at";

/// Active restaurants, by name
pub async fn find_active(pool: &SqlitePool) -> RepoResult<Vec<Restaurant>> {
    let sql = format!("SELECT {COLUMNS} FROM restaurants WHERE is_active = 1 ORDER BY name");
    let restaurants = sqlx::query_as::<_, Restaurant>(&sql).fetch_all(pool).await?;
    Ok(restaurants)
}

/// Every restaurant, inactive ones included
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Restaurant>> {
    let sql = format!("SELECT {COLUMNS} FROM restaurants ORDER BY name");
    let restaurants = sqlx::query_as::<_, Restaurant>(&sql).fetch_all(pool).await?;
    Ok(restaurants)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Restaurant>> {
    let sql = format!("SELECT {COLUMNS} FROM restaurants WHERE id = ?");
    let restaurant = sqlx::query_as::<_, Restaurant>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(restaurant)
}

pub async fn create(pool: &SqlitePool, data: RestaurantCreate) -> RepoResult<Restaurant> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO restaurants (id, name, address, city, postal_code, phone, email, is_active, settings, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, 1, '{}', ?)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.address)
    .bind(&data.city)
    .bind(&data.postal_code)
    .bind(&data.phone)
    .bind(&data.email)
    .bind(shared::util::now_millis())
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create restaurant".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: RestaurantUpdate) -> RepoResult<Restaurant> {
    let rows = sqlx::query(
        "UPDATE restaurants SET name = COALESCE(?1, name), address = COALESCE(?2, address), \
         city = COALESCE(?3, city), postal_code = COALESCE(?4, postal_code), phone = COALESCE(?5, phone), \
         email = COALESCE(?6, email), is_active = COALESCE(?7, is_active) WHERE id = ?8",
    )
    .bind(data.name)
    .bind(data.address)
    .bind(data.city)
    .bind(data.postal_code)
    .bind(data.phone)
    .bind(data.email)
    .bind(data.is_active)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Restaurant {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Restaurant {id} not found")))
}

/// Replace the ordering switches
pub async fn update_settings(
    pool: &SqlitePool,
    id: i64,
    settings: RestaurantSettings,
) -> RepoResult<Restaurant> {
    let rows = sqlx::query("UPDATE restaurants SET settings = ? WHERE id = ?")
        .bind(Json(settings))
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Restaurant {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Restaurant {id} not found")))
}
