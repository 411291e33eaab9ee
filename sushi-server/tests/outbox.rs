//! Notification outbox: delivery, retries and permanent failure

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use common::*;
use http::StatusCode;
use shared::models::{Notification, NotificationState, OrderCreate};
use sushi_server::ServerState;
use sushi_server::db::repository::notification;
use sushi_server::notify::{LogSender, MAX_ATTEMPTS, NotificationDispatcher, NotificationSender, SendError};
use sushi_server::services::orders;

/// Relay that always answers 503
#[derive(Default)]
struct DownRelay {
    calls: AtomicUsize,
}

#[async_trait]
impl NotificationSender for DownRelay {
    async fn send(&self, _notification: &Notification) -> Result<(), SendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SendError::Rejected(503))
    }

    fn name(&self) -> &'static str {
        "down"
    }
}

async fn place_order(state: &ServerState) -> String {
    let request: OrderCreate = serde_json::from_value(pickup_order(&state.config, 1)).unwrap();
    orders::create(state, request).await.unwrap().id
}

fn dispatcher(state: &ServerState, sender: Arc<dyn NotificationSender>) -> NotificationDispatcher {
    NotificationDispatcher::new(
        state.pool.clone(),
        sender,
        Duration::from_secs(60),
        state.outbox_stats.clone(),
    )
}

#[tokio::test]
async fn queued_confirmation_is_delivered_once() {
    let state = state().await;
    let order_id = place_order(&state).await;

    let dispatcher = dispatcher(&state, Arc::new(LogSender));
    let sent = dispatcher.drain_once().await.unwrap();
    assert!(sent >= 1);
    assert_eq!(dispatcher.drain_once().await.unwrap(), 0);

    let rows = notification::list(&state.pool, Some(&order_id), 10).await.unwrap();
    assert!(rows.iter().all(|n| n.state == NotificationState::Sent && n.sent_at.is_some()));
    assert_eq!(state.outbox_stats.lock().sent, sent as u64);
}

#[tokio::test]
async fn failing_relay_gives_up_after_max_attempts() {
    let state = state().await;
    let order_id = place_order(&state).await;
    let relay = Arc::new(DownRelay::default());
    let dispatcher = dispatcher(&state, relay.clone());

    for _ in 0..MAX_ATTEMPTS {
        assert_eq!(dispatcher.drain_once().await.unwrap(), 0);
    }
    let calls_after_max = relay.calls.load(Ordering::SeqCst);

    // Nothing is left to retry
    dispatcher.drain_once().await.unwrap();
    assert_eq!(relay.calls.load(Ordering::SeqCst), calls_after_max);

    let rows = notification::list(&state.pool, Some(&order_id), 10).await.unwrap();
    assert!(!rows.is_empty());
    for row in &rows {
        assert_eq!(row.state, NotificationState::Failed);
        assert_eq!(row.attempts, MAX_ATTEMPTS);
        assert_eq!(row.last_error.as_deref(), Some("relay rejected the notification: HTTP 503"));
    }
    assert_eq!(state.outbox_stats.lock().failed, rows.len() as u64);
}

#[tokio::test]
async fn status_change_and_delay_enqueue_customer_messages() {
    let state = state().await;
    let app = app(&state);
    let order_id = place_order(&state).await;
    let manager = token_for(&state, 3, "manager", Some(RESTAURANT_ID));

    let before = notification::list(&state.pool, Some(&order_id), 50).await.unwrap().len();

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/admin/orders/{order_id}/status"),
            &serde_json::json!({ "status": "ready" }),
            Some(&manager),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/admin/orders/{order_id}/delay"),
            &serde_json::json!({ "delay_minutes": 15, "delay_reason": "Affluence" }),
            Some(&manager),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(!body["data"]["notification_ids"].as_array().unwrap().is_empty());

    let (status, body) = send(
        &app,
        get_request(&format!("/api/admin/notifications?order_id={order_id}"), Some(&manager)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let listed = body["data"].as_array().unwrap();
    assert!(listed.len() > before);
    assert!(listed.iter().any(|n| n["status_update"] == "ready"));

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/admin/orders/{order_id}/delay"),
            &serde_json::json!({ "delay_minutes": 0 }),
            Some(&manager),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
