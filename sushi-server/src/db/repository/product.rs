//! Product Repository
//!
//! Products are read with their category name joined in, which cart and
//! promotion matching work on.

use super::{RepoError, RepoResult, placeholders};
use shared::models::{Product, ProductCreate, ProductUpdate};
use sqlx::SqlitePool;
use sqlx::types::Json;

const SELECT: &str = "SELECT p.id, p.restaurant_id, p.category_id, c.name AS category, p.name, \
     p.description, p.price, p.image_url, p.is_vegetarian, p.is_spicy, p.is_new, p.is_best_seller, \
     p.is_gluten_free, p.allergens, p.pieces, p.prep_time, p.is_active \
     FROM products p JOIN categories c ON c.id = p.category_id";

/// Products of a restaurant, optionally of one category
pub async fn find_by_restaurant(
    pool: &SqlitePool,
    restaurant_id: i64,
    category_id: Option<i64>,
    include_inactive: bool,
) -> RepoResult<Vec<Product>> {
    let sql = format!(
        "{SELECT} WHERE p.restaurant_id = ? AND (? IS NULL OR p.category_id = ?) \
         AND (? OR p.is_active = 1) ORDER BY c.display_order, p.name"
    );
    let products = sqlx::query_as::<_, Product>(&sql)
        .bind(restaurant_id)
        .bind(category_id)
        .bind(category_id)
        .bind(include_inactive)
        .fetch_all(pool)
        .await?;
    Ok(products)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let sql = format!("{SELECT} WHERE p.id = ?");
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(product)
}

/// Active products of a restaurant among `ids`
pub async fn find_by_ids(pool: &SqlitePool, restaurant_id: i64, ids: &[i64]) -> RepoResult<Vec<Product>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "{SELECT} WHERE p.restaurant_id = ? AND p.is_active = 1 AND p.id IN ({})",
        placeholders(ids.len())
    );
    let mut query = sqlx::query_as::<_, Product>(&sql).bind(restaurant_id);
    for id in ids {
        query = query.bind(id);
    }
    Ok(query.fetch_all(pool).await?)
}

async fn ensure_category(pool: &SqlitePool, restaurant_id: i64, category_id: i64) -> RepoResult<()> {
    let owner: Option<i64> = sqlx::query_scalar("SELECT restaurant_id FROM categories WHERE id = ?")
        .bind(category_id)
        .fetch_optional(pool)
        .await?;
    match owner {
        Some(owner) if owner == restaurant_id => Ok(()),
        Some(_) => Err(RepoError::Validation(format!(
            "Category {category_id} belongs to another restaurant"
        ))),
        None => Err(RepoError::NotFound(format!("Category {category_id} not found"))),
    }
}

pub async fn create(pool: &SqlitePool, restaurant_id: i64, data: ProductCreate) -> RepoResult<Product> {
    ensure_category(pool, restaurant_id, data.category_id).await?;
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO products (id, restaurant_id, category_id, name, description, price, image_url, \
         is_vegetarian, is_spicy, is_new, is_best_seller, is_gluten_free, allergens, pieces, prep_time, is_active) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1)",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(data.category_id)
    .bind(data.name.trim())
    .bind(&data.description)
    .bind(data.price)
    .bind(&data.image_url)
    .bind(data.is_vegetarian)
    .bind(data.is_spicy)
    .bind(data.is_new)
    .bind(data.is_best_seller)
    .bind(data.is_gluten_free)
    .bind(Json(&data.allergens))
    .bind(data.pieces)
    .bind(data.prep_time)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ProductUpdate) -> RepoResult<Product> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))?;
    if let Some(category_id) = data.category_id {
        ensure_category(pool, existing.restaurant_id, category_id).await?;
    }

    sqlx::query(
        "UPDATE products SET category_id = COALESCE(?1, category_id), name = COALESCE(?2, name), \
         description = COALESCE(?3, description), price = COALESCE(?4, price), image_url = COALESCE(?5, image_url), \
         is_vegetarian = COALESCE(?6, is_vegetarian), is_spicy = COALESCE(?7, is_spicy), is_new = COALESCE(?8, is_new), \
         is_best_seller = COALESCE(?9, is_best_seller), is_gluten_free = COALESCE(?10, is_gluten_free), \
         allergens = COALESCE(?11, allergens), pieces = COALESCE(?12, pieces), prep_time = COALESCE(?13, prep_time), \
         is_active = COALESCE(?14, is_active) WHERE id = ?15",
    )
    .bind(data.category_id)
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.description)
    .bind(data.price)
    .bind(data.image_url)
    .bind(data.is_vegetarian)
    .bind(data.is_spicy)
    .bind(data.is_new)
    .bind(data.is_best_seller)
    .bind(data.is_gluten_free)
    .bind(data.allergens.map(Json))
    .bind(data.pieces)
    .bind(data.prep_time)
    .bind(data.is_active)
    .bind(id)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
