use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::api;
use crate::auth::require_auth;
use crate::core::ServerState;

pub mod logging;

pub use logging::logging_middleware;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        // A uuid string is always a valid header value
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        // Public storefront API
        .merge(api::health::router())
        .merge(api::restaurants::router())
        .merge(api::menu::router())
        .merge(api::configurator::router())
        .merge(api::cart::router())
        .merge(api::promotions::router())
        .merge(api::promo_codes::router())
        .merge(api::delivery::router())
        .merge(api::slots::router())
        .merge(api::orders::router())
        .merge(api::payments::router())
        // Back-office API - authentication required (except login / ws)
        .merge(api::admin::router(state))
        .merge(api::stats::router())
        .merge(api::live::router())
}

/// Build a fully configured application with all middleware and state
///
/// Used by the HTTP server and by the integration tests (oneshot)
pub fn build_app(state: ServerState) -> Router {
    build_router(&state)
        // ========== Tower HTTP Middleware ==========
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        // ========== Application Middleware ==========
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        // JWT auth injects CurrentUser and has to run before routing
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
        .with_state(state)
}
