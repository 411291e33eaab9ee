//! Menu API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{Category, CategoryCreate, CategoryUpdate, Product, ProductCreate, ProductUpdate};

use crate::api::ensure_restaurant_access;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{RepoError, category, product};
use crate::services::restaurant as restaurants;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

const RESOURCE_CATEGORY: &str = "category";
const RESOURCE_PRODUCT: &str = "product";

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub category_id: Option<i64>,
}

fn check_price(price: f64) -> AppResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::with_message(
            ErrorCode::ProductInvalidPrice,
            "Price must be a non-negative amount",
        ));
    }
    Ok(())
}

fn category_error(e: RepoError) -> AppError {
    match e {
        RepoError::Duplicate(_) => AppError::new(ErrorCode::CategoryNameExists),
        RepoError::NotFound(_) => AppError::new(ErrorCode::CategoryNotFound),
        RepoError::Validation(msg) => AppError::with_message(ErrorCode::CategoryHasProducts, msg),
        other => other.into(),
    }
}

/// Unknown category on create/update, or a category of another restaurant
fn product_category_error(e: RepoError) -> AppError {
    match e {
        RepoError::NotFound(msg) => AppError::with_message(ErrorCode::CategoryNotFound, msg),
        RepoError::Validation(msg) => AppError::validation(msg),
        other => other.into(),
    }
}

async fn load_product(state: &ServerState, id: i64) -> AppResult<Product> {
    product::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))
}

async fn load_category(state: &ServerState, id: i64) -> AppResult<Category> {
    category::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CategoryNotFound))
}

// =============================================================================
// Storefront
// =============================================================================

/// GET /api/restaurants/{id}/categories - sorted by display_order
pub async fn list_categories(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<Category>>>> {
    restaurants::load(&state.pool, restaurant_id).await?;
    Ok(ok(category::find_by_restaurant(&state.pool, restaurant_id).await?))
}

/// GET /api/restaurants/{id}/products?category_id= - available products only
pub async fn list_products(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<i64>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    restaurants::load(&state.pool, restaurant_id).await?;
    let products = product::find_by_restaurant(&state.pool, restaurant_id, query.category_id, false).await?;
    Ok(ok(products))
}

/// GET /api/products/{id}
pub async fn get_product(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Product>>> {
    Ok(ok(load_product(&state, id).await?))
}

// =============================================================================
// Back-office
// =============================================================================

/// GET /api/admin/restaurants/{id}/products - unavailable products included
pub async fn list_all_products(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(restaurant_id): Path<i64>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    ensure_restaurant_access(&user, restaurant_id)?;
    let products = product::find_by_restaurant(&state.pool, restaurant_id, query.category_id, true).await?;
    Ok(ok(products))
}

/// POST /api/admin/restaurants/{id}/categories
pub async fn create_category(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<ApiResponse<Category>>> {
    ensure_restaurant_access(&user, restaurant_id)?;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    restaurants::load(&state.pool, restaurant_id).await?;

    let created = category::create(&state.pool, restaurant_id, payload)
        .await
        .map_err(category_error)?;
    state.broadcast_sync(RESOURCE_CATEGORY, "created", &created.id.to_string(), Some(&created));
    Ok(ok(created))
}

/// PUT /api/admin/categories/{id}
pub async fn update_category(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let existing = load_category(&state, id).await?;
    ensure_restaurant_access(&user, existing.restaurant_id)?;
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let updated = category::update(&state.pool, id, payload)
        .await
        .map_err(category_error)?;
    state.broadcast_sync(RESOURCE_CATEGORY, "updated", &id.to_string(), Some(&updated));
    Ok(ok(updated))
}

/// DELETE /api/admin/categories/{id} - refused while the category still has products
pub async fn delete_category(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let existing = load_category(&state, id).await?;
    ensure_restaurant_access(&user, existing.restaurant_id)?;

    let deleted = category::delete(&state.pool, id).await.map_err(category_error)?;
    if deleted {
        state.broadcast_sync::<()>(RESOURCE_CATEGORY, "deleted", &id.to_string(), None);
    }
    Ok(ok(deleted))
}

/// POST /api/admin/restaurants/{id}/products
pub async fn create_product(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    ensure_restaurant_access(&user, restaurant_id)?;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;
    check_price(payload.price)?;

    let created = product::create(&state.pool, restaurant_id, payload)
        .await
        .map_err(product_category_error)?;
    tracing::info!(product_id = created.id, restaurant_id, name = %created.name, "Product created");
    state.broadcast_sync(RESOURCE_PRODUCT, "created", &created.id.to_string(), Some(&created));
    Ok(ok(created))
}

/// PUT /api/admin/products/{id}
pub async fn update_product(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let existing = load_product(&state, id).await?;
    ensure_restaurant_access(&user, existing.restaurant_id)?;
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;
    if let Some(price) = payload.price {
        check_price(price)?;
    }

    let updated = product::update(&state.pool, id, payload)
        .await
        .map_err(product_category_error)?;
    state.broadcast_sync(RESOURCE_PRODUCT, "updated", &id.to_string(), Some(&updated));
    Ok(ok(updated))
}

/// DELETE /api/admin/products/{id}
pub async fn delete_product(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let existing = load_product(&state, id).await?;
    ensure_restaurant_access(&user, existing.restaurant_id)?;

    let deleted = product::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(product_id = id, "Product deleted");
        state.broadcast_sync::<()>(RESOURCE_PRODUCT, "deleted", &id.to_string(), None);
    }
    Ok(ok(deleted))
}
