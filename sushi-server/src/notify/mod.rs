//! Customer notifications
//!
//! Handlers never talk to a provider directly: they queue rows in the
//! `order_notifications` outbox (in the same transaction as the change that
//! triggered them) and the [`NotificationDispatcher`] delivers them.

pub mod dispatcher;
pub mod sender;
pub mod templates;

pub use dispatcher::{MAX_ATTEMPTS, NotificationDispatcher, OutboxStats, SharedOutboxStats};
pub use sender::{HttpRelaySender, LogSender, NotificationSender, SendError};

use std::sync::Arc;

/// Relay sender when a URL is configured, log sender otherwise
pub fn sender_from_config(
    config: &crate::core::Config,
    client: reqwest::Client,
) -> Arc<dyn NotificationSender> {
    match &config.notify_relay_url {
        Some(url) => Arc::new(HttpRelaySender::new(client, url.clone())),
        None => Arc::new(LogSender),
    }
}
