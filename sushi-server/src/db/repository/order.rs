//! Order Repository

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderItem, OrderStatus, PaymentStatus};
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, restaurant_id, user_id, status, payment_status, payment_method, order_type, \
     subtotal, tax, delivery_fee, tip, discount, total, promo_code, scheduled_for, client_name, client_email, \
     client_phone, delivery_street, delivery_city, delivery_postal_code, delivery_instructions, customer_notes, \
     allergies, contact_preference, pickup_time, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, name, quantity, price, special_instructions";

/// Admin list filter, already resolved to a time window
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub restaurant_id: Option<i64>,
    pub status: Option<OrderStatus>,
    /// `[from, to)` on `scheduled_for`
    pub window: Option<(i64, i64)>,
    pub limit: i64,
    pub offset: i64,
}

/// Insert an order and its lines on the caller's transaction
pub async fn insert(conn: &mut SqliteConnection, order: &Order) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO orders (id, restaurant_id, user_id, status, payment_status, payment_method, order_type, \
         subtotal, tax, delivery_fee, tip, discount, total, promo_code, scheduled_for, client_name, client_email, \
         client_phone, delivery_street, delivery_city, delivery_postal_code, delivery_instructions, customer_notes, \
         allergies, contact_preference, pickup_time, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&order.id)
    .bind(order.restaurant_id)
    .bind(&order.user_id)
    .bind(order.status)
    .bind(order.payment_status)
    .bind(order.payment_method)
    .bind(order.order_type)
    .bind(order.subtotal)
    .bind(order.tax)
    .bind(order.delivery_fee)
    .bind(order.tip)
    .bind(order.discount)
    .bind(order.total)
    .bind(&order.promo_code)
    .bind(order.scheduled_for)
    .bind(&order.client_name)
    .bind(&order.client_email)
    .bind(&order.client_phone)
    .bind(&order.delivery_street)
    .bind(&order.delivery_city)
    .bind(&order.delivery_postal_code)
    .bind(&order.delivery_instructions)
    .bind(&order.customer_notes)
    .bind(Json(&order.allergies))
    .bind(&order.contact_preference)
    .bind(&order.pickup_time)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *conn)
    .await?;

    for item in &order.items {
        sqlx::query(
            "INSERT INTO order_items (id, order_id, product_id, name, quantity, price, special_instructions) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(item.id)
        .bind(&order.id)
        .bind(item.product_id)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(item.price)
        .bind(&item.special_instructions)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn find_items(pool: &SqlitePool, order_id: &str) -> RepoResult<Vec<OrderItem>> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ? ORDER BY rowid");
    let items = sqlx::query_as::<_, OrderItem>(&sql)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(items)
}

/// Order with its lines
pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<Order>> {
    let sql = format!("SELECT {COLUMNS} FROM orders WHERE id = ?");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match order {
        Some(mut order) => {
            order.items = find_items(pool, id).await?;
            Ok(Some(order))
        }
        None => Ok(None),
    }
}

/// One page of orders, newest slot first, and the total match count
pub async fn list(pool: &SqlitePool, filter: &OrderFilter) -> RepoResult<(Vec<Order>, i64)> {
    let (from, to) = filter.window.unzip();
    let where_clause = "WHERE (?1 IS NULL OR restaurant_id = ?1) AND (?2 IS NULL OR status = ?2) \
         AND (?3 IS NULL OR scheduled_for >= ?3) AND (?4 IS NULL OR scheduled_for < ?4)";

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM orders {where_clause}"))
        .bind(filter.restaurant_id)
        .bind(filter.status)
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await?;

    let sql = format!(
        "SELECT {COLUMNS} FROM orders {where_clause} ORDER BY scheduled_for DESC, created_at DESC LIMIT ?5 OFFSET ?6"
    );
    let mut orders = sqlx::query_as::<_, Order>(&sql)
        .bind(filter.restaurant_id)
        .bind(filter.status)
        .bind(from)
        .bind(to)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(pool)
        .await?;
    for order in &mut orders {
        order.items = find_items(pool, &order.id).await?;
    }
    Ok((orders, total))
}

/// Orders created in `[from, to)`, oldest first, lines excluded
pub async fn find_created_between(
    pool: &SqlitePool,
    restaurant_id: i64,
    from: i64,
    to: i64,
) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM orders WHERE restaurant_id = ? AND created_at >= ? AND created_at < ? ORDER BY created_at"
    );
    let orders = sqlx::query_as::<_, Order>(&sql)
        .bind(restaurant_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await?;
    Ok(orders)
}

pub async fn update_status(pool: &SqlitePool, id: &str, status: OrderStatus, now: i64) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    Ok(())
}

pub async fn update_payment_status(
    pool: &SqlitePool,
    id: &str,
    payment_status: PaymentStatus,
    now: i64,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE orders SET payment_status = ?, updated_at = ? WHERE id = ?")
        .bind(payment_status)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    Ok(())
}
