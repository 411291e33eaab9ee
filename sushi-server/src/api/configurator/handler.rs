//! Configurator API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use shared::models::{
    BoxOption, ConfiguratorQuote, PokeIngredient, PokeQuoteRequest, SushiOption, SushiQuoteRequest,
};

use crate::core::ServerState;
use crate::db::repository::configurator;
use crate::services::configurator as quotes;
use crate::utils::{ApiResponse, AppResult, ok};

/// Options shared by every restaurant, plus the restaurant's own when given
#[derive(Debug, Deserialize)]
pub struct OptionsQuery {
    pub restaurant_id: Option<i64>,
}

/// GET /api/configurator/boxes
pub async fn list_boxes(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<BoxOption>>>> {
    Ok(ok(configurator::find_boxes(&state.pool).await?))
}

/// GET /api/configurator/sushi-options?restaurant_id=
pub async fn list_sushi_options(
    State(state): State<ServerState>,
    Query(query): Query<OptionsQuery>,
) -> AppResult<Json<ApiResponse<Vec<SushiOption>>>> {
    Ok(ok(configurator::find_sushi_options(&state.pool, query.restaurant_id).await?))
}

/// GET /api/configurator/poke-ingredients?restaurant_id=
pub async fn list_poke_ingredients(
    State(state): State<ServerState>,
    Query(query): Query<OptionsQuery>,
) -> AppResult<Json<ApiResponse<Vec<PokeIngredient>>>> {
    Ok(ok(configurator::find_poke_ingredients(&state.pool, query.restaurant_id).await?))
}

/// POST /api/configurator/sushi/quote
pub async fn quote_sushi(
    State(state): State<ServerState>,
    Json(payload): Json<SushiQuoteRequest>,
) -> AppResult<Json<ApiResponse<ConfiguratorQuote>>> {
    Ok(ok(quotes::quote_sushi(&state.pool, &payload).await?))
}

/// POST /api/configurator/poke/quote
pub async fn quote_poke(
    State(state): State<ServerState>,
    Json(payload): Json<PokeQuoteRequest>,
) -> AppResult<Json<ApiResponse<ConfiguratorQuote>>> {
    let quote = quotes::quote_poke(&state.pool, &payload, state.config.poke_base_price).await?;
    Ok(ok(quote))
}
