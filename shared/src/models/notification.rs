//! Notification Model (outbox rows)

use serde::{Deserialize, Serialize};

/// Delivery channel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum NotificationChannel {
    Email,
    Sms,
    Push,
}

/// Outbox state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum NotificationState {
    Queued,
    Sent,
    Failed,
}

/// Customer notification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Notification {
    pub id: i64,
    pub order_id: String,
    pub channel: NotificationChannel,
    pub recipient: String,
    pub subject: String,
    pub content: String,
    pub status_update: Option<String>,
    pub state: NotificationState,
    pub attempts: i64,
    pub last_error: Option<String>,
    pub created_at: i64,
    pub sent_at: Option<i64>,
}

/// Notification ready to be queued
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationDraft {
    pub order_id: String,
    pub channel: NotificationChannel,
    pub recipient: String,
    pub subject: String,
    pub content: String,
    pub status_update: Option<String>,
}
