//! Checkout end to end: menu, quote, order, payment webhook, back-office

mod common;

use axum::body::Body;
use common::*;
use http::{Request, StatusCode};
use sushi_server::payment::{SIGNATURE_HEADER, sign_payload};

fn webhook_request(body: &str, signature: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/payments/webhook")
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, signature)
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_and_public_menu() {
    let state = state().await;
    let app = app(&state);

    let (status, body) = send(&app, get_request("/api/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, get_request("/api/restaurants/1/products", None)).await;
    assert_eq!(status, StatusCode::OK);
    let products = body["data"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "Maki saumon");

    let (status, _) = send(&app, get_request("/api/restaurants/99", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quote_reprices_from_the_menu() {
    let state = state().await;
    let app = app(&state);

    let (status, body) = send(
        &app,
        json_request("POST", "/api/orders/quote", &pickup_order(&state.config, 2), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["subtotal"], 25.0);
    assert_eq!(body["data"]["delivery_fee"], 0.0);
    assert_eq!(body["data"]["total"], 25.0);
}

#[tokio::test]
async fn order_is_created_and_confirmed_by_webhook() {
    let state = state().await;
    let app = app(&state);
    let mut live = state.live.subscribe();

    let (status, body) = send(
        &app,
        json_request("POST", "/api/orders", &pickup_order(&state.config, 2), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let order_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["payment_status"], "pending");
    assert_eq!(body["data"]["total"], 25.0);

    let event = live.recv().await.unwrap();
    assert_eq!((event.resource.as_str(), event.action.as_str()), ("order", "created"));

    // The confirmation is queued in the same transaction as the order
    let queued: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_notifications WHERE order_id = ?")
        .bind(&order_id)
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert!(queued >= 1);

    // A forged signature changes nothing
    let payload = serde_json::json!({ "type": "payment.succeeded", "order_id": order_id }).to_string();
    let (status, _) = send(&app, webhook_request(&payload, "t=1,v1=deadbeef")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let now_secs = chrono::Utc::now().timestamp();
    let signature = sign_payload(payload.as_bytes(), &state.config.payment_webhook_secret, now_secs).unwrap();
    let (status, body) = send(&app, webhook_request(&payload, &signature)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["handled"], true);
    assert_eq!(body["data"]["payment_status"], "paid");
    assert_eq!(body["data"]["status"], "confirmed");

    let (status, body) = send(&app, get_request(&format!("/api/orders/{order_id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["payment_status"], "paid");
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn order_validation_failures() {
    let state = state().await;
    let app = app(&state);

    let mut missing_contact = pickup_order(&state.config, 1);
    missing_contact["client_phone"] = "".into();
    let (status, body) = send(&app, json_request("POST", "/api/orders", &missing_contact, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["fields"][0], "client_phone");

    let mut empty = pickup_order(&state.config, 1);
    empty["items"] = serde_json::json!([]);
    let (status, _) = send(&app, json_request("POST", "/api/orders", &empty, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut unknown = pickup_order(&state.config, 1);
    unknown["items"][0]["product_id"] = 999.into();
    let (status, _) = send(&app, json_request("POST", "/api/orders", &unknown, None)).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn locked_restaurant_refuses_orders() {
    let state = state().await;
    let app = app(&state);
    let admin = token_for(&state, 1, "admin", None);

    let settings = serde_json::json!({
        "ordering_locked": true,
        "delivery_blocked": false,
        "pickup_blocked": false,
    });
    let (status, _) = send(
        &app,
        json_request("PUT", "/api/admin/restaurants/1/settings", &settings, Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        json_request("POST", "/api/orders", &pickup_order(&state.config, 1), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 3003);
}

#[tokio::test]
async fn pickup_slot_fills_after_two_orders() {
    let state = state().await;
    let app = app(&state);

    for _ in 0..2 {
        let (status, body) = send(
            &app,
            json_request("POST", "/api/orders", &pickup_order(&state.config, 1), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    let (status, body) = send(
        &app,
        json_request("POST", "/api/orders", &pickup_order(&state.config, 1), None),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["details"]["max_allowed"], 2);
}

#[tokio::test]
async fn staff_moves_an_order_through_its_lifecycle() {
    let state = state().await;
    let app = app(&state);
    let staff = token_for(&state, 5, "staff", Some(RESTAURANT_ID));
    let outsider = token_for(&state, 6, "staff", Some(OTHER_RESTAURANT_ID));

    let (_, body) = send(
        &app,
        json_request("POST", "/api/orders", &pickup_order(&state.config, 1), None),
    )
    .await;
    let order_id = body["data"]["id"].as_str().unwrap().to_string();
    let status_uri = format!("/api/admin/orders/{order_id}/status");

    let (status, _) = send(
        &app,
        json_request("PUT", &status_uri, &serde_json::json!({ "status": "preparing" }), Some(&outsider)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        json_request("PUT", &status_uri, &serde_json::json!({ "status": "preparing" }), Some(&staff)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "preparing");

    let (status, _) = send(
        &app,
        json_request("PUT", &status_uri, &serde_json::json!({ "status": "cancelled" }), Some(&staff)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Terminal
    let (status, _) = send(
        &app,
        json_request("PUT", &status_uri, &serde_json::json!({ "status": "ready" }), Some(&staff)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, get_request("/api/admin/orders", Some(&staff))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);

    let (status, body) = send(&app, get_request("/api/admin/orders", Some(&outsider))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 0);
}
