//! Payment API Handlers

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};
use shared::models::{OrderStatus, PaymentSession, PaymentStatus};

use crate::core::ServerState;
use crate::payment::SIGNATURE_HEADER;
use crate::services::payments;
use crate::utils::{ApiResponse, AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub order_id: String,
}

/// Webhook acknowledgement; `handled` is false for ignored event types
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub handled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
}

/// POST /api/payments/session
pub async fn create_session(
    State(state): State<ServerState>,
    Json(payload): Json<SessionRequest>,
) -> AppResult<Json<ApiResponse<PaymentSession>>> {
    Ok(ok(payments::create_session(&state, &payload.order_id).await?))
}

/// POST /api/payments/webhook - the signature covers the raw body
pub async fn webhook(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<ApiResponse<WebhookAck>>> {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    let order = payments::handle_webhook(&state, &body, signature).await?;

    Ok(ok(match order {
        Some(order) => WebhookAck {
            handled: true,
            order_id: Some(order.id),
            status: Some(order.status),
            payment_status: Some(order.payment_status),
        },
        None => WebhookAck {
            handled: false,
            order_id: None,
            status: None,
            payment_status: None,
        },
    }))
}
