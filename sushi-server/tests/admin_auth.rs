//! Back-office authentication, permissions and account management

mod common;

use common::*;
use http::StatusCode;
use serde_json::json;
use shared::models::{AdminRole, AdminUserCreate};
use sushi_server::services::admin;

async fn create_account(state: &sushi_server::ServerState, email: &str, role: AdminRole, restaurant_id: Option<i64>) -> i64 {
    admin::create_user(
        state,
        AdminUserCreate {
            email: email.to_string(),
            display_name: "Équipe".to_string(),
            password: "correct-horse-battery".to_string(),
            role,
            restaurant_id,
        },
    )
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn admin_routes_require_a_token() {
    let state = state().await;
    let app = app(&state);

    let (status, body) = send(&app, get_request("/api/admin/orders", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1001);

    let (status, _) = send(&app, get_request("/api/admin/orders", Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Storefront stays public
    let (status, _) = send(&app, get_request("/api/restaurants", None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_then_me() {
    let state = state().await;
    let app = app(&state);
    create_account(&state, "chef@sushieats.fr", AdminRole::Manager, Some(RESTAURANT_ID)).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/admin/auth/login",
            &json!({ "email": "Chef@SushiEats.fr", "password": "wrong-password" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1002);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/admin/auth/login",
            &json!({ "email": "chef@sushieats.fr", "password": "correct-horse-battery" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["data"]["user"].get("password_hash").is_none());
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, get_request("/api/admin/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "chef@sushieats.fr");
    assert_eq!(body["data"]["role"], "manager");
}

#[tokio::test]
async fn login_is_rate_limited_per_ip() {
    let state = state().await;
    let app = app(&state);
    let attempt = json!({ "email": "nobody@sushieats.fr", "password": "whatever-123" });

    for _ in 0..5 {
        let (status, _) = send(&app, json_request("POST", "/api/admin/auth/login", &attempt, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let (status, body) = send(&app, json_request("POST", "/api/admin/auth/login", &attempt, None)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], 1008);
}

#[tokio::test]
async fn permissions_follow_the_role() {
    let state = state().await;
    let app = app(&state);
    let staff = token_for(&state, 7, "staff", Some(RESTAURANT_ID));
    let manager = token_for(&state, 8, "manager", Some(RESTAURANT_ID));
    let admin = token_for(&state, 9, "admin", None);

    let (status, _) = send(&app, get_request("/api/admin/users", Some(&staff))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, get_request("/api/admin/users", Some(&manager))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, get_request("/api/admin/users", Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);

    // Staff may not edit the menu, managers only their own restaurant
    let category = json!({ "name": "Desserts" });
    let (status, _) = send(
        &app,
        json_request("POST", "/api/admin/restaurants/1/categories", &category, Some(&staff)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = send(
        &app,
        json_request("POST", "/api/admin/restaurants/1/categories", &category, Some(&manager)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let (status, _) = send(
        &app,
        json_request("POST", "/api/admin/restaurants/2/categories", &category, Some(&manager)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Only an admin creates restaurants
    let restaurant = json!({ "name": "SushiEats Antibes", "address": "1 rue", "city": "Antibes", "postal_code": "06600" });
    let (status, _) = send(
        &app,
        json_request("POST", "/api/admin/restaurants", &restaurant, Some(&manager)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn user_management() {
    let state = state().await;
    let app = app(&state);
    let admin_id = create_account(&state, "admin@sushieats.fr", AdminRole::Admin, None).await;
    let admin = token_for(&state, admin_id, "admin", None);

    let new_user = json!({
        "email": "serveur@sushieats.fr",
        "display_name": "Serveur",
        "password": "short",
        "role": "staff",
        "restaurant_id": RESTAURANT_ID,
    });
    let (status, _) = send(&app, json_request("POST", "/api/admin/users", &new_user, Some(&admin))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut valid = new_user.clone();
    valid["password"] = "a-long-enough-password".into();
    let (status, body) = send(&app, json_request("POST", "/api/admin/users", &valid, Some(&admin))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let staff_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = send(&app, json_request("POST", "/api/admin/users", &valid, Some(&admin))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        json_request("DELETE", &format!("/api/admin/users/{admin_id}"), &json!({}), Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        json_request("DELETE", &format!("/api/admin/users/{staff_id}"), &json!({}), Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], true);
}
