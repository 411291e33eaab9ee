//! 后台 WebSocket 端点 (实时变更推送)
//!
//! GET /api/admin/ws?token=<JWT>
//! 浏览器 WebSocket 不支持自定义 headers, JWT 通过 query parameter 传递。
//!
//! 协议 (Server → Back-office):
//! - `ready`: 连接时及落后 (lagged) 后发送, 包含所有资源的当前版本号
//! - `sync`: 单条资源变更

use axum::Router;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast;
use tokio::time::Duration;

use crate::auth::{CurrentUser, JwtError};
use crate::core::ServerState;
use crate::live::{LiveEvent, LiveMessage};
use crate::utils::AppError;

const PING_INTERVAL: Duration = Duration::from_secs(30);

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/admin/ws", get(handle_live_ws))
}

#[derive(Deserialize)]
pub struct WsAuthQuery {
    token: String,
}

/// GET /api/admin/ws?token=<JWT>
pub async fn handle_live_ws(
    State(state): State<ServerState>,
    Query(query): Query<WsAuthQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let claims = state.jwt.validate_token(&query.token).map_err(|e| {
        tracing::debug!("Live WS JWT validation failed: {e}");
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            other => AppError::invalid_token(other.to_string()),
        }
    })?;
    let user = CurrentUser::from(claims);

    Ok(ws.on_upgrade(move |socket| live_session(socket, state, user)))
}

async fn live_session(socket: WebSocket, state: ServerState, user: CurrentUser) {
    let (mut sink, mut stream) = socket.split();
    let mut hub_rx = state.live.subscribe();

    tracing::info!(user_id = %user.id, email = %user.email, "Live WS connected");

    if send_message(&mut sink, &state.live.ready_message()).await.is_err() {
        return;
    }

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // 跳过立即触发的第一次

    loop {
        tokio::select! {
            _ = state.shutdown.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                break;
            }

            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            event = hub_rx.recv() => {
                match event {
                    Ok(event) => {
                        if !visible_to(&user, &event) {
                            continue;
                        }
                        if send_message(&mut sink, &LiveMessage::Sync(event)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(user_id = %user.id, lagged = n, "Live subscriber lagged, resending versions");
                        hub_rx = state.live.subscribe();
                        if send_message(&mut sink, &state.live.ready_message()).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    tracing::info!(user_id = %user.id, "Live WS disconnected");
}

/// 绑定门店的员工只收到本门店的变更
fn visible_to(user: &CurrentUser, event: &LiveEvent) -> bool {
    let restaurant_id = event
        .data
        .as_ref()
        .and_then(|d| d.get("restaurant_id"))
        .and_then(|v| v.as_i64());
    match restaurant_id {
        Some(id) => user.can_access_restaurant(id),
        None => true,
    }
}

async fn send_message(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &LiveMessage,
) -> Result<(), ()> {
    let json = serde_json::to_string(msg).map_err(|e| {
        tracing::error!("Failed to serialize live message: {e}");
    })?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str, restaurant_id: Option<i64>) -> CurrentUser {
        CurrentUser {
            id: "7".into(),
            email: "staff@sushieats.fr".into(),
            role: role.into(),
            permissions: vec![],
            restaurant_id,
        }
    }

    fn event(data: Option<serde_json::Value>) -> LiveEvent {
        LiveEvent {
            resource: "order".into(),
            action: "updated".into(),
            id: "abc".into(),
            data,
            version: 1,
        }
    }

    #[test]
    fn staff_filtered_by_restaurant() {
        let staff = user("staff", Some(1));
        assert!(visible_to(&staff, &event(Some(serde_json::json!({"restaurant_id": 1})))));
        assert!(!visible_to(&staff, &event(Some(serde_json::json!({"restaurant_id": 2})))));
        assert!(visible_to(&staff, &event(None)));
    }

    #[test]
    fn admin_sees_everything() {
        let admin = user("admin", None);
        assert!(visible_to(&admin, &event(Some(serde_json::json!({"restaurant_id": 2})))));
    }
}
