//! Payment Model

use serde::{Deserialize, Serialize};

use super::PaymentStatus;

/// Payment attempt for an order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i64,
    pub order_id: String,
    pub amount: f64,
    pub status: PaymentStatus,
    /// Session id returned by the payment provider relay
    pub provider_ref: Option<String>,
    pub checkout_url: Option<String>,
    pub created_at: i64,
}

/// Payment session handed to the storefront
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSession {
    pub payment_id: i64,
    pub order_id: String,
    pub amount: f64,
    pub session_id: String,
    pub checkout_url: Option<String>,
}

/// Webhook event body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentWebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub order_id: String,
    pub session_id: Option<String>,
}
