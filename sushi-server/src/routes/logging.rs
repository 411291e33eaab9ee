//! 请求日志中间件
//!
//! 记录所有进入的 HTTP 请求，包含时间、后台用户和状态码

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};

use crate::auth::CurrentUser;

/// 请求日志中间件
///
/// 请求 ID 取自 x-request-id, 缺失时生成一个。已认证的后台请求额外记录
/// 用户邮箱和 ID。
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();

    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let user = req
        .extensions()
        .get::<CurrentUser>()
        .map(|u| format!("{}({})", u.email, u.id));

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        user_agent = %user_agent,
        user = ?user,
        "Request started"
    );

    let response = next.run(req).await;

    let latency_ms = start.elapsed().as_millis();
    let status = response.status();

    if status.is_server_error() {
        warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            latency_ms = %latency_ms,
            user = ?user,
            "Request completed with server error"
        );
    } else if status.is_client_error() {
        warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            latency_ms = %latency_ms,
            user = ?user,
            "Request completed with client error"
        );
    } else {
        info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            latency_ms = %latency_ms,
            "Request completed successfully"
        );
    }

    response
}
