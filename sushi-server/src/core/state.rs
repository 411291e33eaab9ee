//! 服务器状态
//!
//! [`ServerState`] 在所有请求处理器之间共享 (Clone 廉价, 内部为 Arc/池句柄)。

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use sqlx::SqlitePool;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::auth::{JwtConfig, JwtService, RateLimiter};
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::time_slot;
use crate::live::LiveHub;
use crate::notify::{self, NotificationDispatcher, NotificationSender, SharedOutboxStats};
use crate::utils::AppError;

/// 出站中继调用超时 (支付会话、通知)
const RELAY_TIMEOUT: Duration = Duration::from_secs(10);
/// 过期时段预占的清理间隔
const HOLD_PURGE_INTERVAL: Duration = Duration::from_secs(60);
/// 限流窗口的清理间隔
const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// JWT 认证服务
    pub jwt: Arc<JwtService>,
    /// 后台实时推送
    pub live: LiveHub,
    /// 登录限流
    pub rate_limiter: RateLimiter,
    /// 出站 HTTP 客户端 (支付/通知中转)
    pub http: reqwest::Client,
    /// 通知发送器
    pub notifier: Arc<dyn NotificationSender>,
    pub outbox_stats: SharedOutboxStats,
    /// 后台任务关闭信号
    pub shutdown: CancellationToken,
}

impl ServerState {
    /// 按配置打开数据库并构建状态
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db = DbService::new(&config.database_path).await?;
        Self::with_pool(config.clone(), db.pool)
    }

    /// 基于现有连接池构建状态 (测试使用内存数据库)
    pub fn with_pool(config: Config, pool: SqlitePool) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(RELAY_TIMEOUT)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;
        let notifier = notify::sender_from_config(&config, http.clone());
        let jwt = Arc::new(JwtService::with_config(JwtConfig::from_config(&config)));

        Ok(Self {
            config,
            pool,
            jwt,
            live: LiveHub::new(),
            rate_limiter: RateLimiter::new(),
            http,
            notifier,
            outbox_stats: Arc::new(Mutex::new(notify::OutboxStats::default())),
            shutdown: CancellationToken::new(),
        })
    }

    /// 在实时推送上发布一条资源变更
    ///
    /// 自动递增资源版本号; 没有订阅者时事件被丢弃。
    pub fn broadcast_sync<T: serde::Serialize>(
        &self,
        resource: &str,
        action: &str,
        id: &str,
        data: Option<&T>,
    ) {
        let data = data.and_then(|d| serde_json::to_value(d).ok());
        let event = self.live.publish(resource, action, id, data);
        tracing::debug!(
            resource = %event.resource,
            action = %event.action,
            id = %event.id,
            version = event.version,
            "Live event published"
        );
    }

    /// 启动通知分发器和定期清理任务。
    ///
    /// [`ServerState::shutdown`] 取消后所有任务停止。
    pub fn start_background_tasks(&self) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::with_capacity(3);

        let dispatcher = NotificationDispatcher::new(
            self.pool.clone(),
            self.notifier.clone(),
            Duration::from_secs(self.config.notify_interval_secs.max(1)),
            self.outbox_stats.clone(),
        );
        handles.push(tokio::spawn(dispatcher.run(self.shutdown.clone())));

        let pool = self.pool.clone();
        let shutdown = self.shutdown.clone();
        handles.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(HOLD_PURGE_INTERVAL);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        match time_slot::purge_expired(&pool, shared::util::now_millis()).await {
                            Ok(0) => {}
                            Ok(n) => tracing::debug!(purged = n, "Expired slot holds purged"),
                            Err(e) => tracing::warn!(error = %e, "Failed to purge slot holds"),
                        }
                    }
                }
            }
        }));

        let limiter = self.rate_limiter.clone();
        let shutdown = self.shutdown.clone();
        handles.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(RATE_LIMIT_CLEANUP_INTERVAL);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => limiter.cleanup().await,
                }
            }
        }));

        tracing::info!(count = handles.len(), "Background tasks started");
        handles
    }
}
