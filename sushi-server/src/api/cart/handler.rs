//! Cart API Handlers

use std::collections::HashMap;

use axum::{Json, extract::State};
use shared::models::{CartOperation, CartRequest, CartSummary, Product};

use crate::cart::{self, Cart, CartError};
use crate::core::ServerState;
use crate::db::repository::product;
use crate::services::restaurant as restaurants;
use crate::utils::{ApiResponse, AppResult, ok};

/// POST /api/cart - replays the cart on the server
///
/// Submitted lines are re-priced from the menu, then the operations are
/// replayed in order. Plateaux are added before desserts so free desserts
/// they unlock are accepted whatever the submitted order.
pub async fn evaluate(
    State(state): State<ServerState>,
    Json(req): Json<CartRequest>,
) -> AppResult<Json<ApiResponse<CartSummary>>> {
    let restaurant = restaurants::load_active(&state.pool, req.restaurant_id).await?;

    let mut ids: Vec<i64> = req.items.iter().map(|i| i.product_id).collect();
    ids.extend(req.operations.iter().filter_map(|op| match op {
        CartOperation::Add { product_id, .. } => Some(*product_id),
        _ => None,
    }));
    ids.sort_unstable();
    ids.dedup();

    let products: HashMap<i64, Product> = product::find_by_ids(&state.pool, restaurant.id, &ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut lines = Vec::with_capacity(req.items.len());
    for item in req.items {
        let menu = products
            .get(&item.product_id)
            .ok_or(CartError::ProductNotFound(item.product_id))?;
        lines.push(cart::item_from_product(menu, item.quantity, item.special_instructions));
    }
    lines.sort_by_key(cart::is_free_dessert);

    let mut cart = Cart::new(restaurant.settings.is_locked());
    for line in lines {
        cart.add(line)?;
    }
    for op in req.operations {
        cart.apply(op, &products)?;
    }

    Ok(ok(cart.summary()))
}
