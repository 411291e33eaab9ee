//! Shared fixtures for the integration tests
#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use chrono::{Duration, FixedOffset, NaiveTime, TimeZone, Utc};
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use sushi_server::auth::TokenSubject;
use sushi_server::auth::permissions::get_default_permissions;
use sushi_server::{Config, DbService, ServerState, build_app};
use tower::ServiceExt;

pub const RESTAURANT_ID: i64 = 1;
pub const OTHER_RESTAURANT_ID: i64 = 2;
pub const PRODUCT_ID: i64 = 10;
pub const PRODUCT_PRICE: f64 = 12.5;

pub fn config() -> Config {
    Config::with_overrides("sqlite::memory:")
}

/// Fresh in-memory state with two restaurants open every day
pub async fn state() -> ServerState {
    let db = DbService::memory().await.expect("memory db");
    seed(&db.pool).await;
    ServerState::with_pool(config(), db.pool).expect("state")
}

pub async fn seed(pool: &SqlitePool) {
    for (id, name) in [(RESTAURANT_ID, "SushiEats Cagnes"), (OTHER_RESTAURANT_ID, "SushiEats Nice")] {
        sqlx::query("INSERT INTO restaurants (id, name, city, postal_code) VALUES (?, ?, 'Cagnes-sur-Mer', '06800')")
            .bind(id)
            .bind(name)
            .execute(pool)
            .await
            .expect("restaurant");
        for day in 0..7 {
            sqlx::query(
                "INSERT INTO restaurant_opening_hours (restaurant_id, day_of_week, slot_number, open_time, close_time) \
                 VALUES (?, ?, 1, '00:00', '23:59')",
            )
            .bind(id)
            .bind(day)
            .execute(pool)
            .await
            .expect("hours");
        }
    }

    sqlx::query("INSERT INTO categories (id, restaurant_id, name) VALUES (1, ?, 'Makis')")
        .bind(RESTAURANT_ID)
        .execute(pool)
        .await
        .expect("category");
    sqlx::query("INSERT INTO products (id, restaurant_id, category_id, name, price) VALUES (?, ?, 1, 'Maki saumon', ?)")
        .bind(PRODUCT_ID)
        .bind(RESTAURANT_ID)
        .bind(PRODUCT_PRICE)
        .execute(pool)
        .await
        .expect("product");
}

/// Tomorrow 19:00 on the restaurant clock, RFC 3339
pub fn tomorrow_evening(config: &Config) -> String {
    tomorrow_at(config, 19, 0)
}

pub fn tomorrow_at(config: &Config, hour: u32, minute: u32) -> String {
    let tz: FixedOffset = config.timezone();
    let date = (Utc::now().with_timezone(&tz) + Duration::days(1)).date_naive();
    let time = NaiveTime::from_hms_opt(hour, minute, 0).expect("time");
    tz.from_local_datetime(&date.and_time(time))
        .single()
        .expect("local time")
        .to_rfc3339()
}

pub fn pickup_order(config: &Config, quantity: i64) -> Value {
    serde_json::json!({
        "restaurant_id": RESTAURANT_ID,
        "order_type": "pickup",
        "payment_method": "online",
        "items": [{ "kind": "product", "product_id": PRODUCT_ID, "quantity": quantity }],
        "scheduled_for": tomorrow_evening(config),
        "client_name": "Camille Martin",
        "client_email": "camille@example.fr",
        "client_phone": "06 12 34 56 78",
    })
}

/// Bearer token for a role, without going through the login endpoint
pub fn token_for(state: &ServerState, user_id: i64, role: &str, restaurant_id: Option<i64>) -> String {
    let permissions = get_default_permissions(role);
    let user_id = user_id.to_string();
    let email = format!("{role}@sushieats.fr");
    state
        .jwt
        .generate_token(TokenSubject {
            user_id: &user_id,
            email: &email,
            role,
            permissions: &permissions,
            restaurant_id,
        })
        .expect("token")
        .0
}

pub fn app(state: &ServerState) -> Router {
    build_app(state.clone())
}

pub fn json_request(method: &str, uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

/// Run one request and decode the JSON envelope
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}
