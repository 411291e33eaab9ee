//! Configurator Repository (box formats, sushi options, poke ingredients)
//!
//! Options without a restaurant are shared by every restaurant.

use super::{RepoResult, placeholders};
use shared::models::{BoxOption, PokeIngredient, SushiOption};
use sqlx::SqlitePool;

pub async fn find_boxes(pool: &SqlitePool) -> RepoResult<Vec<BoxOption>> {
    let boxes = sqlx::query_as::<_, BoxOption>(
        "SELECT id, name, description, pieces, creations, price FROM box_options ORDER BY pieces",
    )
    .fetch_all(pool)
    .await?;
    Ok(boxes)
}

pub async fn find_box(pool: &SqlitePool, id: i64) -> RepoResult<Option<BoxOption>> {
    let box_option = sqlx::query_as::<_, BoxOption>(
        "SELECT id, name, description, pieces, creations, price FROM box_options WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(box_option)
}

pub async fn find_sushi_options(pool: &SqlitePool, restaurant_id: Option<i64>) -> RepoResult<Vec<SushiOption>> {
    let options = sqlx::query_as::<_, SushiOption>(
        "SELECT id, name, price, included, category FROM sushi_options \
         WHERE is_active = 1 AND (restaurant_id IS NULL OR restaurant_id = ?) ORDER BY category, id",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(options)
}

pub async fn find_sushi_options_by_ids(pool: &SqlitePool, ids: &[i64]) -> RepoResult<Vec<SushiOption>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT id, name, price, included, category FROM sushi_options WHERE is_active = 1 AND id IN ({})",
        placeholders(ids.len())
    );
    let mut query = sqlx::query_as::<_, SushiOption>(&sql);
    for id in ids {
        query = query.bind(id);
    }
    Ok(query.fetch_all(pool).await?)
}

pub async fn find_poke_ingredients(
    pool: &SqlitePool,
    restaurant_id: Option<i64>,
) -> RepoResult<Vec<PokeIngredient>> {
    let ingredients = sqlx::query_as::<_, PokeIngredient>(
        "SELECT id, name, price, included, ingredient_type FROM poke_ingredients \
         WHERE is_active = 1 AND (restaurant_id IS NULL OR restaurant_id = ?) ORDER BY ingredient_type, id",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(ingredients)
}

pub async fn find_poke_ingredients_by_ids(pool: &SqlitePool, ids: &[i64]) -> RepoResult<Vec<PokeIngredient>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT id, name, price, included, ingredient_type FROM poke_ingredients WHERE is_active = 1 AND id IN ({})",
        placeholders(ids.len())
    );
    let mut query = sqlx::query_as::<_, PokeIngredient>(&sql);
    for id in ids {
        query = query.bind(id);
    }
    Ok(query.fetch_all(pool).await?)
}
