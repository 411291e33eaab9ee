//! Payment API 模块

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/session", post(handler::create_session))
        .route("/webhook", post(handler::webhook))
}
