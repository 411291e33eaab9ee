//! Opening Hours Repository

use super::RepoResult;
use shared::models::OpeningHours;
use sqlx::SqlitePool;

pub async fn find_by_restaurant(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<OpeningHours>> {
    let rows = sqlx::query_as::<_, OpeningHours>(
        "SELECT day_of_week, slot_number, is_open, open_time, close_time \
         FROM restaurant_opening_hours WHERE restaurant_id = ? ORDER BY day_of_week, slot_number",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Replace every row of a restaurant in one transaction
pub async fn replace(
    pool: &SqlitePool,
    restaurant_id: i64,
    rows: &[OpeningHours],
) -> RepoResult<Vec<OpeningHours>> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM restaurant_opening_hours WHERE restaurant_id = ?")
        .bind(restaurant_id)
        .execute(&mut *tx)
        .await?;
    for row in rows {
        sqlx::query(
            "INSERT INTO restaurant_opening_hours (restaurant_id, day_of_week, slot_number, is_open, open_time, close_time) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(restaurant_id)
        .bind(row.day_of_week)
        .bind(row.slot_number)
        .bind(row.is_open)
        .bind(&row.open_time)
        .bind(&row.close_time)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    find_by_restaurant(pool, restaurant_id).await
}
