//! Delivery Repository (zones and served postal codes)

use super::{RepoError, RepoResult};
use shared::models::{
    DeliveryLocation, DeliveryLocationCreate, DeliveryZone, DeliveryZoneCreate, DeliveryZoneUpdate,
};
use sqlx::SqlitePool;
use sqlx::types::Json;

const ZONE_COLUMNS: &str = "id, restaurant_id, name, available, min_order, delivery_fee, postal_codes";
const LOCATION_COLUMNS: &str = "id, restaurant_id, postal_code, city, is_active";

// ========== Zones ==========

pub async fn find_zones(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<DeliveryZone>> {
    let sql = format!("SELECT {ZONE_COLUMNS} FROM delivery_zones WHERE restaurant_id = ? ORDER BY name");
    let zones = sqlx::query_as::<_, DeliveryZone>(&sql)
        .bind(restaurant_id)
        .fetch_all(pool)
        .await?;
    Ok(zones)
}

pub async fn find_zone(pool: &SqlitePool, id: i64) -> RepoResult<Option<DeliveryZone>> {
    let sql = format!("SELECT {ZONE_COLUMNS} FROM delivery_zones WHERE id = ?");
    let zone = sqlx::query_as::<_, DeliveryZone>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(zone)
}

/// First available zone listing the postal code
pub async fn find_zone_for_postal_code(
    pool: &SqlitePool,
    restaurant_id: i64,
    postal_code: &str,
) -> RepoResult<Option<DeliveryZone>> {
    let sql = format!(
        "SELECT {ZONE_COLUMNS} FROM delivery_zones z WHERE restaurant_id = ? AND available = 1 \
         AND EXISTS (SELECT 1 FROM json_each(z.postal_codes) WHERE json_each.value = ?) \
         ORDER BY delivery_fee, name LIMIT 1"
    );
    let zone = sqlx::query_as::<_, DeliveryZone>(&sql)
        .bind(restaurant_id)
        .bind(postal_code)
        .fetch_optional(pool)
        .await?;
    Ok(zone)
}

pub async fn create_zone(
    pool: &SqlitePool,
    restaurant_id: i64,
    data: DeliveryZoneCreate,
) -> RepoResult<DeliveryZone> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO delivery_zones (id, restaurant_id, name, available, min_order, delivery_fee, postal_codes) \
         VALUES (?, ?, ?, 1, ?, ?, ?)",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(data.name.trim())
    .bind(data.min_order)
    .bind(data.delivery_fee)
    .bind(Json(&data.postal_codes))
    .execute(pool)
    .await?;
    find_zone(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create delivery zone".into()))
}

pub async fn update_zone(pool: &SqlitePool, id: i64, data: DeliveryZoneUpdate) -> RepoResult<DeliveryZone> {
    let rows = sqlx::query(
        "UPDATE delivery_zones SET name = COALESCE(?1, name), available = COALESCE(?2, available), \
         min_order = COALESCE(?3, min_order), delivery_fee = COALESCE(?4, delivery_fee), \
         postal_codes = COALESCE(?5, postal_codes) WHERE id = ?6",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.available)
    .bind(data.min_order)
    .bind(data.delivery_fee)
    .bind(data.postal_codes.map(Json))
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Delivery zone {id} not found")));
    }
    find_zone(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Delivery zone {id} not found")))
}

pub async fn delete_zone(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM delivery_zones WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

// ========== Locations ==========

pub async fn find_locations(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<DeliveryLocation>> {
    let sql = format!(
        "SELECT {LOCATION_COLUMNS} FROM delivery_locations WHERE restaurant_id = ? ORDER BY postal_code"
    );
    let locations = sqlx::query_as::<_, DeliveryLocation>(&sql)
        .bind(restaurant_id)
        .fetch_all(pool)
        .await?;
    Ok(locations)
}

pub async fn find_active_location(
    pool: &SqlitePool,
    restaurant_id: i64,
    postal_code: &str,
) -> RepoResult<Option<DeliveryLocation>> {
    let sql = format!(
        "SELECT {LOCATION_COLUMNS} FROM delivery_locations \
         WHERE restaurant_id = ? AND postal_code = ? AND is_active = 1"
    );
    let location = sqlx::query_as::<_, DeliveryLocation>(&sql)
        .bind(restaurant_id)
        .bind(postal_code)
        .fetch_optional(pool)
        .await?;
    Ok(location)
}

pub async fn create_location(
    pool: &SqlitePool,
    restaurant_id: i64,
    data: DeliveryLocationCreate,
) -> RepoResult<DeliveryLocation> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO delivery_locations (id, restaurant_id, postal_code, city, is_active) VALUES (?, ?, ?, ?, 1)",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(data.postal_code.trim())
    .bind(data.city.trim())
    .execute(pool)
    .await?;
    let sql = format!("SELECT {LOCATION_COLUMNS} FROM delivery_locations WHERE id = ?");
    sqlx::query_as::<_, DeliveryLocation>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create delivery location".into()))
}

pub async fn delete_location(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM delivery_locations WHERE id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
