//! Slot holds under concurrency, on a file-backed database

mod common;

use chrono::DateTime;
use common::*;
use http::StatusCode;
use serde_json::json;
use shared::models::OrderType;
use sushi_server::db::repository::time_slot;
use sushi_server::services::slots::{self, Reservation, SlotTarget};
use sushi_server::{DbService, ServerState};

async fn file_state(dir: &tempfile::TempDir) -> ServerState {
    let path = dir.path().join("sushi.db");
    let db = DbService::new(path.to_str().unwrap()).await.unwrap();
    seed(&db.pool).await;
    ServerState::with_pool(config(), db.pool).unwrap()
}

fn target(state: &ServerState, order_type: OrderType) -> SlotTarget {
    let when = DateTime::parse_from_rfc3339(&tomorrow_evening(&state.config)).unwrap();
    SlotTarget::new(RESTAURANT_ID, order_type, when.timestamp_millis(), state.config.timezone()).unwrap()
}

#[tokio::test]
async fn concurrent_holds_never_exceed_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let state = file_state(&dir).await;
    let target = target(&state, OrderType::Pickup);

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let state = state.clone();
        let target = target.clone();
        tasks.push(tokio::spawn(async move { slots::reserve(&state, &target).await }));
    }

    let mut held = 0;
    let mut full = 0;
    for task in tasks {
        match task.await.unwrap().unwrap() {
            Reservation::Held(check) => {
                assert!(check.reservation_id.is_some());
                held += 1;
            }
            Reservation::Rejected(code, check) => {
                assert_eq!(code, sushi_server::ErrorCode::SlotUnavailable);
                assert!(!check.available);
                full += 1;
            }
        }
    }
    assert_eq!(held, 2, "pickup slots hold two orders");
    assert_eq!(full, 6);

    let check = slots::verify(&state, &target).await.unwrap();
    assert!(!check.available);
    assert_eq!(check.current_count, Some(2));
}

#[tokio::test]
async fn delivery_slot_takes_one_hold_until_it_expires() {
    let state = state().await;
    let app = app(&state);
    let request = json!({
        "restaurant_id": RESTAURANT_ID,
        "order_type": "delivery",
        "scheduled_for": tomorrow_evening(&state.config),
    });

    let (status, body) = send(&app, json_request("POST", "/api/slots/reserve", &request, None)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["reserved"], true);
    assert_eq!(body["data"]["is_event_slot"], false);
    let reservation_id = body["data"]["reservation_id"].as_i64().unwrap();

    let (status, body) = send(&app, json_request("POST", "/api/slots/reserve", &request, None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 7001);
    assert_eq!(body["data"]["available"], false);
    assert_eq!(body["data"]["current_count"], 1);
    assert_eq!(body["data"]["max_allowed"], 1);
    assert_eq!(body["data"]["is_event_slot"], false);

    // Holds cannot be dropped anonymously
    let (status, _) = send(
        &app,
        json_request("DELETE", &format!("/api/slots/reservations/{reservation_id}"), &json!({}), None),
    )
    .await;
    assert!(status.is_client_error());
    let (status, _) = send(&app, json_request("POST", "/api/slots/reserve", &request, None)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let ttl_ms = state.config.slot_hold_minutes * 60_000;
    let purged = time_slot::purge_expired(&state.pool, shared::util::now_millis() + ttl_ms + 1)
        .await
        .unwrap();
    assert_eq!(purged, 1);

    let (status, body) = send(&app, json_request("POST", "/api/slots/verify", &request, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["available"], true);
    assert_eq!(body["data"]["current_count"], 0);
    assert_eq!(body["data"]["blocked_by_admin"], false);
    assert_eq!(body["data"]["is_event_slot"], false);
}

#[tokio::test]
async fn expired_hold_lost_to_other_customers() {
    let state = state().await;
    let app = app(&state);
    let target = target(&state, OrderType::Pickup);

    let Reservation::Held(first) = slots::reserve(&state, &target).await.unwrap() else {
        panic!("first hold rejected");
    };
    let first_id = first.reservation_id.unwrap();
    sqlx::query("UPDATE slot_reservations SET expires_at = 0 WHERE id = ?")
        .bind(first_id)
        .execute(&state.pool)
        .await
        .unwrap();
    for _ in 0..2 {
        assert!(matches!(slots::reserve(&state, &target).await.unwrap(), Reservation::Held(_)));
    }

    let mut order = pickup_order(&state.config, 1);
    order["reservation_id"] = json!(first_id);
    let (status, body) = send(&app, json_request("POST", "/api/orders", &order, None)).await;
    assert_eq!(status, StatusCode::GONE, "{body}");
    assert_eq!(body["code"], 7004);
    assert_eq!(body["details"]["max_allowed"], 2);
    assert_eq!(body["details"]["is_event_slot"], false);
}

#[tokio::test]
async fn available_slots_skip_blocked_and_full_times() {
    let state = state().await;
    let app = app(&state);
    let admin = token_for(&state, 1, "admin", None);
    let when = DateTime::parse_from_rfc3339(&tomorrow_evening(&state.config)).unwrap();
    let date = when.format("%Y-%m-%d").to_string();

    let block = json!({ "blocked_date": date, "blocked_time": "12:00", "reason": null });
    let (status, body) = send(
        &app,
        json_request("POST", "/api/admin/restaurants/1/blocked-slots", &block, Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let delivery = target(&state, OrderType::Delivery);
    assert!(matches!(slots::reserve(&state, &delivery).await.unwrap(), Reservation::Held(_)));

    let uri = format!("/api/restaurants/{RESTAURANT_ID}/slots?order_type=delivery&date={date}");
    let (status, body) = send(&app, get_request(&uri, None)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let times: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["time"].as_str().unwrap())
        .collect();
    assert!(times.contains(&"11:30"));
    assert!(times.contains(&"19:30"));
    assert!(!times.contains(&"12:00"), "blocked slot listed");
    assert!(!times.contains(&"19:00"), "full slot listed");

    // Pickup keeps a place at 19:00
    let uri = format!("/api/restaurants/{RESTAURANT_ID}/slots?order_type=pickup&date={date}");
    let (_, body) = send(&app, get_request(&uri, None)).await;
    let evening = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["time"] == "19:00")
        .cloned()
        .unwrap();
    assert_eq!(evening["remaining"], 2);
}

#[tokio::test]
async fn dine_in_is_never_limited() {
    let state = state().await;
    let target = target(&state, OrderType::DineIn);
    for _ in 0..20 {
        match slots::reserve(&state, &target).await.unwrap() {
            Reservation::Held(check) => assert!(check.reservation_id.is_none()),
            Reservation::Rejected(..) => panic!("dine-in rejected"),
        }
    }
}

#[tokio::test]
async fn missing_fields_are_reported() {
    let state = state().await;
    let app = app(&state);
    let (status, body) = send(
        &app,
        json_request("POST", "/api/slots/verify", &json!({ "restaurant_id": 1 }), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("required"));
}

#[tokio::test]
async fn admin_block_rejects_the_slot() {
    let state = state().await;
    let app = app(&state);
    let admin = token_for(&state, 1, "admin", None);
    let when = DateTime::parse_from_rfc3339(&tomorrow_evening(&state.config)).unwrap();

    let block = json!({
        "blocked_date": when.format("%Y-%m-%d").to_string(),
        "blocked_time": "19:00",
        "reason": "Privatisation",
    });
    let (status, body) = send(
        &app,
        json_request("POST", "/api/admin/restaurants/1/blocked-slots", &block, Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = send(
        &app,
        json_request("POST", "/api/orders", &pickup_order(&state.config, 1), None),
    )
    .await;
    assert!(status.is_client_error(), "{body}");
    assert!(body["message"].as_str().unwrap().contains("Privatisation"));
}
