//! Notification outbox dispatcher
//!
//! Periodically reads `queued` notifications and sends them through a
//! [`NotificationSender`]. Failures count up `attempts`; at
//! [`MAX_ATTEMPTS`] the row is marked failed.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use shared::models::NotificationState;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use super::NotificationSender;
use crate::db::repository::notification;

/// Attempts before a notification is given up
pub const MAX_ATTEMPTS: i64 = 3;
/// Rows drained per tick
const BATCH_SIZE: i64 = 50;

/// Counters since start, reported by the detailed health check
#[derive(Debug, Clone, Default, Serialize)]
pub struct OutboxStats {
    pub sent: u64,
    pub retried: u64,
    pub failed: u64,
    pub last_run: Option<i64>,
}

pub type SharedOutboxStats = Arc<Mutex<OutboxStats>>;

pub struct NotificationDispatcher {
    pool: SqlitePool,
    sender: Arc<dyn NotificationSender>,
    interval: Duration,
    stats: SharedOutboxStats,
}

impl NotificationDispatcher {
    pub fn new(
        pool: SqlitePool,
        sender: Arc<dyn NotificationSender>,
        interval: Duration,
        stats: SharedOutboxStats,
    ) -> Self {
        Self {
            pool,
            sender,
            interval,
            stats,
        }
    }

    /// Run until the shutdown signal fires
    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(
            sender = self.sender.name(),
            interval_secs = self.interval.as_secs(),
            "Notification dispatcher started"
        );
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Notification dispatcher received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.drain_once().await {
                        tracing::error!(error = %e, "Notification outbox drain failed");
                    }
                }
            }
        }
    }

    /// Send every queued notification once. Returns how many were sent.
    pub async fn drain_once(&self) -> Result<usize, crate::db::repository::RepoError> {
        let queued = notification::find_queued(&self.pool, BATCH_SIZE).await?;
        let mut sent = 0;

        for item in &queued {
            match self.sender.send(item).await {
                Ok(()) => {
                    notification::mark_sent(&self.pool, item.id, shared::util::now_millis()).await?;
                    self.stats.lock().sent += 1;
                    sent += 1;
                    tracing::debug!(notification_id = item.id, order_id = %item.order_id, "Notification sent");
                }
                Err(e) => {
                    let state = notification::mark_attempt_failed(
                        &self.pool,
                        item.id,
                        &e.to_string(),
                        MAX_ATTEMPTS,
                    )
                    .await?;
                    let mut stats = self.stats.lock();
                    if state == NotificationState::Failed {
                        stats.failed += 1;
                        tracing::error!(
                            notification_id = item.id,
                            order_id = %item.order_id,
                            error = %e,
                            "Notification failed permanently"
                        );
                    } else {
                        stats.retried += 1;
                        tracing::warn!(
                            notification_id = item.id,
                            attempts = item.attempts + 1,
                            error = %e,
                            "Notification attempt failed, will retry"
                        );
                    }
                }
            }
        }

        self.stats.lock().last_run = Some(shared::util::now_millis());
        Ok(sent)
    }
}
