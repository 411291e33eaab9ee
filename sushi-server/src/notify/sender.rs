//! Notification senders
//!
//! The dispatcher only knows the [`NotificationSender`] trait. Without a
//! relay URL notifications are written to the log.

use async_trait::async_trait;
use serde::Serialize;
use shared::models::{Notification, NotificationChannel};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SendError {
    #[error("relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("relay rejected the notification: HTTP {0}")]
    Rejected(u16),
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), SendError>;

    fn name(&self) -> &'static str;
}

/// Logs notifications instead of delivering them
#[derive(Debug, Clone, Default)]
pub struct LogSender;

#[async_trait]
impl NotificationSender for LogSender {
    async fn send(&self, notification: &Notification) -> Result<(), SendError> {
        tracing::info!(
            notification_id = notification.id,
            order_id = %notification.order_id,
            channel = ?notification.channel,
            recipient = %notification.recipient,
            subject = %notification.subject,
            "Notification delivered to log"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    channel: NotificationChannel,
    to: &'a str,
    subject: &'a str,
    content: &'a str,
    order_id: &'a str,
}

/// POSTs notifications as JSON to an email/SMS/push relay
#[derive(Debug, Clone)]
pub struct HttpRelaySender {
    client: reqwest::Client,
    url: String,
}

impl HttpRelaySender {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl NotificationSender for HttpRelaySender {
    async fn send(&self, notification: &Notification) -> Result<(), SendError> {
        let payload = RelayPayload {
            channel: notification.channel,
            to: &notification.recipient,
            subject: &notification.subject,
            content: &notification.content,
            order_id: &notification.order_id,
        };
        let resp = self.client.post(&self.url).json(&payload).send().await?;
        if !resp.status().is_success() {
            return Err(SendError::Rejected(resp.status().as_u16()));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http-relay"
    }
}
