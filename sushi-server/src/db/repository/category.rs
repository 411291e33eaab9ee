//! Category Repository

use super::{RepoError, RepoResult};
use shared::models::{Category, CategoryCreate, CategoryUpdate};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, restaurant_id, name, description, display_order";

pub async fn find_by_restaurant(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<Category>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM categories WHERE restaurant_id = ? ORDER BY display_order, name"
    );
    let categories = sqlx::query_as::<_, Category>(&sql)
        .bind(restaurant_id)
        .fetch_all(pool)
        .await?;
    Ok(categories)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Category>> {
    let sql = format!("SELECT {COLUMNS} FROM categories WHERE id = ?");
    let category = sqlx::query_as::<_, Category>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(category)
}

/// Same name in the same restaurant is a `Duplicate`
pub async fn create(pool: &SqlitePool, restaurant_id: i64, data: CategoryCreate) -> RepoResult<Category> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO categories (id, restaurant_id, name, description, display_order) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(data.name.trim())
    .bind(&data.description)
    .bind(data.display_order)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create category".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: CategoryUpdate) -> RepoResult<Category> {
    let rows = sqlx::query(
        "UPDATE categories SET name = COALESCE(?1, name), description = COALESCE(?2, description), \
         display_order = COALESCE(?3, display_order) WHERE id = ?4",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.description)
    .bind(data.display_order)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Category {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
}

/// Refused while products still reference the category
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Err(RepoError::Validation(format!(
            "Cannot delete category with {count} products"
        )));
    }
    let rows = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
