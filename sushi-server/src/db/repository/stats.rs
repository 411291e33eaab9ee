//! Sales Statistics Repository
//!
//! Only paid orders count. Days are local to the restaurant: the UTC offset
//! is added to `created_at` before SQLite extracts the date.

use super::RepoResult;
use shared::models::{DailyStats, PopularProduct};
use sqlx::SqlitePool;

use crate::pricing::round2;

/// Per-day order count and revenue for orders created in `[from, to)`
pub async fn daily_stats(
    pool: &SqlitePool,
    restaurant_id: i64,
    from: i64,
    to: i64,
    offset_ms: i64,
) -> RepoResult<Vec<DailyStats>> {
    let rows: Vec<(String, i64, f64)> = sqlx::query_as(
        "SELECT date((created_at + ?1) / 1000, 'unixepoch') AS day, COUNT(*), COALESCE(SUM(total), 0.0) \
         FROM orders WHERE restaurant_id = ?2 AND payment_status = 'paid' \
           AND created_at >= ?3 AND created_at < ?4 \
         GROUP BY day ORDER BY day",
    )
    .bind(offset_ms)
    .bind(restaurant_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(date, order_count, revenue)| DailyStats {
            date,
            order_count,
            revenue: round2(revenue),
            average_basket: if order_count > 0 {
                round2(revenue / order_count as f64)
            } else {
                0.0
            },
        })
        .collect())
}

/// Best sellers over `[from, to)`, by quantity
pub async fn popular_products(
    pool: &SqlitePool,
    restaurant_id: i64,
    from: i64,
    to: i64,
    limit: i64,
) -> RepoResult<Vec<PopularProduct>> {
    let rows = sqlx::query_as::<_, PopularProduct>(
        "SELECT i.product_id, i.name, SUM(i.quantity) AS quantity, \
                COALESCE(SUM(i.quantity * i.price), 0.0) AS revenue \
         FROM order_items i JOIN orders o ON o.id = i.order_id \
         WHERE o.restaurant_id = ? AND o.payment_status = 'paid' AND o.created_at >= ? AND o.created_at < ? \
         GROUP BY i.product_id, i.name ORDER BY quantity DESC, revenue DESC LIMIT ?",
    )
    .bind(restaurant_id)
    .bind(from)
    .bind(to)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|p| PopularProduct {
            revenue: round2(p.revenue),
            ..p
        })
        .collect())
}
