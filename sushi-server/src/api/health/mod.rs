//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/health | GET | 简单健康检查 | 无 |
//! | /api/health/detailed | GET | 数据库、通知队列和实时推送状态 | 无 |

use std::time::{Instant, SystemTime};

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::notify::OutboxStats;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/health/detailed", get(detailed_health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    /// ok | error
    status: &'static str,
    version: &'static str,
    environment: String,
}

#[derive(Serialize)]
pub struct DetailedHealthResponse {
    status: &'static str,
    version: &'static str,
    /// 运行时间 (秒)
    uptime_seconds: u64,
    checks: HealthChecks,
    outbox: OutboxStats,
    /// 已连接的后台 WebSocket 会话
    live_sessions: usize,
}

#[derive(Serialize)]
pub struct HealthChecks {
    database: CheckResult,
}

/// 单项检查结果
#[derive(Serialize)]
pub struct CheckResult {
    status: &'static str,
    latency_ms: Option<u64>,
    message: Option<String>,
}

impl CheckResult {
    fn ok_with_latency(latency_ms: u64) -> Self {
        Self {
            status: "ok",
            latency_ms: Some(latency_ms),
            message: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            latency_ms: None,
            message: Some(message.into()),
        }
    }
}

// 服务器启动时间
static START_TIME: std::sync::OnceLock<SystemTime> = std::sync::OnceLock::new();

/// 记录运行时长起点, 启动时调用一次
pub fn mark_started() {
    START_TIME.get_or_init(SystemTime::now);
}

fn get_uptime_seconds() -> u64 {
    let start = START_TIME.get_or_init(SystemTime::now);
    SystemTime::now()
        .duration_since(*start)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// GET /api/health
pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
    })
}

/// GET /api/health/detailed
pub async fn detailed_health(State(state): State<ServerState>) -> Json<DetailedHealthResponse> {
    let started = Instant::now();
    let database = match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.pool)
        .await
    {
        Ok(_) => CheckResult::ok_with_latency(started.elapsed().as_millis() as u64),
        Err(e) => {
            tracing::error!(error = %e, "Health check: database unreachable");
            CheckResult::error(e.to_string())
        }
    };

    let status = if database.status == "ok" { "ok" } else { "error" };
    Json(DetailedHealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: get_uptime_seconds(),
        checks: HealthChecks { database },
        outbox: state.outbox_stats.lock().clone(),
        live_sessions: state.live.subscriber_count(),
    })
}
