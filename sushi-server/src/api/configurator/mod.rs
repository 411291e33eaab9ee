//! Configurator API 模块 (寿司盒 / Poke 碗)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/configurator", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/boxes", get(handler::list_boxes))
        .route("/sushi-options", get(handler::list_sushi_options))
        .route("/poke-ingredients", get(handler::list_poke_ingredients))
        .route("/sushi/quote", post(handler::quote_sushi))
        .route("/poke/quote", post(handler::quote_poke))
}
