//! Promo codes, delivery areas and the restaurant gates at checkout

mod common;

use chrono::Utc;
use common::*;
use http::StatusCode;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sushi_server::ServerState;
use sushi_server::db::repository::admin_user;
use sushi_server::services::admin;

const CLIENT_EMAIL: &str = "camille@example.fr";

async fn add_promo_code(
    pool: &SqlitePool,
    code: &str,
    discount: f64,
    min_order: Option<f64>,
    one_time: bool,
    categories: &str,
    restaurant_id: Option<i64>,
) {
    sqlx::query(
        "INSERT INTO promo_codes (code, discount, is_percentage, min_order, is_one_time_use, applicable_categories, restaurant_id) \
         VALUES (?, ?, 1, ?, ?, ?, ?)",
    )
    .bind(code)
    .bind(discount)
    .bind(min_order)
    .bind(one_time)
    .bind(categories)
    .bind(restaurant_id)
    .execute(pool)
    .await
    .unwrap();
}

async fn validate_code(state: &ServerState, code: &str, subtotal: f64) -> Value {
    let request = json!({
        "code": code,
        "restaurant_id": RESTAURANT_ID,
        "subtotal": subtotal,
        "email": CLIENT_EMAIL,
    });
    let (status, body) = send(
        &app(state),
        json_request("POST", "/api/promo-codes/validate", &request, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"].clone()
}

fn delivery_order(state: &ServerState, quantity: i64, postal_code: &str) -> Value {
    let mut order = pickup_order(&state.config, quantity);
    order["order_type"] = json!("delivery");
    order["delivery_address"] = json!({
        "street": "12 avenue de Nice",
        "city": "Cagnes-sur-Mer",
        "postal_code": postal_code,
    });
    order
}

async fn put_settings(state: &ServerState, settings: Value) {
    let admin = token_for(state, 1, "admin", None);
    let (status, body) = send(
        &app(state),
        json_request("PUT", "/api/admin/restaurants/1/settings", &settings, Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

#[tokio::test]
async fn promo_code_rules() {
    let state = state().await;
    let pool = &state.pool;
    add_promo_code(pool, "BIENVENUE", 10.0, Some(20.0), true, "[]", None).await;
    add_promo_code(pool, "NICE10", 10.0, None, false, "[]", Some(OTHER_RESTAURANT_ID)).await;
    add_promo_code(pool, "HIVER", 10.0, None, false, "[]", None).await;
    add_promo_code(pool, "PAUSE", 10.0, None, false, "[]", None).await;
    sqlx::query("UPDATE promo_codes SET end_date = 1000 WHERE code = 'HIVER'")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("UPDATE promo_codes SET is_active = 0 WHERE code = 'PAUSE'")
        .execute(pool)
        .await
        .unwrap();

    let unknown = validate_code(&state, "INCONNU", 30.0).await;
    assert_eq!(unknown["valid"], false);
    assert_eq!(unknown["message"], "Code promo invalide");

    let inactive = validate_code(&state, "PAUSE", 30.0).await;
    assert_eq!(inactive["message"], "Code promo invalide");

    let expired = validate_code(&state, "HIVER", 30.0).await;
    assert_eq!(expired["valid"], false);
    assert_eq!(expired["message"], "Code promo expiré");

    let elsewhere = validate_code(&state, "NICE10", 30.0).await;
    assert_eq!(elsewhere["valid"], false);
    assert_eq!(elsewhere["message"], "Code promo non valable dans ce restaurant");

    let below_minimum = validate_code(&state, "BIENVENUE", 15.0).await;
    assert_eq!(below_minimum["valid"], false);
    assert!(below_minimum["message"].as_str().unwrap().contains("20.00"));

    // Codes are matched case-insensitively
    let accepted = validate_code(&state, " bienvenue ", 25.0).await;
    assert_eq!(accepted["valid"], true);
    assert_eq!(accepted["discount_amount"], 2.5);
}

#[tokio::test]
async fn one_time_code_is_spent_by_the_order() {
    let state = state().await;
    let app = app(&state);
    add_promo_code(&state.pool, "BIENVENUE", 10.0, Some(20.0), true, "[]", None).await;

    let mut order = pickup_order(&state.config, 2);
    order["promo_code"] = json!("BIENVENUE");
    let (status, body) = send(&app, json_request("POST", "/api/orders", &order, None)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["discount"], 2.5);

    let again = validate_code(&state, "BIENVENUE", 25.0).await;
    assert_eq!(again["valid"], false);
    assert_eq!(again["message"], "Code déjà utilisé");

    let (status, body) = send(&app, json_request("POST", "/api/orders", &order, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 8004);
}

#[tokio::test]
async fn scoped_code_minimum_uses_the_whole_subtotal() {
    let state = state().await;
    let app = app(&state);
    sqlx::query("INSERT INTO categories (id, restaurant_id, name) VALUES (2, ?, 'Boissons')")
        .bind(RESTAURANT_ID)
        .execute(&state.pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO products (id, restaurant_id, category_id, name, price) VALUES (11, ?, 2, 'Thé glacé', 4.0)")
        .bind(RESTAURANT_ID)
        .execute(&state.pool)
        .await
        .unwrap();
    add_promo_code(&state.pool, "MAKIS20", 20.0, Some(20.0), false, r#"["Makis"]"#, None).await;

    let mut order = pickup_order(&state.config, 1);
    order["items"] = json!([
        { "kind": "product", "product_id": PRODUCT_ID, "quantity": 1 },
        { "kind": "product", "product_id": 11, "quantity": 3 },
    ]);
    order["promo_code"] = json!("MAKIS20");

    // 24.50 in total, 12.50 of it in the code's category
    let (status, body) = send(&app, json_request("POST", "/api/orders", &order, None)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["subtotal"], 24.5);
    assert_eq!(body["data"]["discount"], 2.5);
}

#[tokio::test]
async fn delivery_area_and_zone_minimum() {
    let state = state().await;
    let app = app(&state);
    let pool = &state.pool;
    sqlx::query(
        "INSERT INTO delivery_zones (restaurant_id, name, available, min_order, delivery_fee, postal_codes) \
         VALUES (1, 'Centre', 1, 30.0, 3.5, '[\"06800\"]'), (1, 'Nord', 0, 0.0, 0.0, '[\"06000\"]')",
    )
    .execute(pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO delivery_locations (restaurant_id, postal_code, city) VALUES (1, '06270', 'Villeneuve-Loubet')")
        .execute(pool)
        .await
        .unwrap();

    let check = |postal_code: &str| get_request(&format!("/api/delivery/check?restaurant_id=1&postal_code={postal_code}"), None);

    let (status, body) = send(&app, check("75001")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 7101);

    // A zone that is not available does not count
    let (_, body) = send(&app, check("06000")).await;
    assert_eq!(body["code"], 7101);

    let (status, body) = send(&app, check("06270")).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["city"], "Villeneuve-Loubet");
    assert_eq!(body["data"]["delivery_fee"], 0.0);
    assert!(body["data"]["zone_id"].is_null());

    let (_, body) = send(&app, check("06800")).await;
    assert_eq!(body["data"]["zone_name"], "Centre");
    assert_eq!(body["data"]["min_order"], 30.0);

    let (status, body) = send(&app, json_request("POST", "/api/orders", &delivery_order(&state, 1, "75001"), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 7101);

    let (status, body) = send(&app, json_request("POST", "/api/orders", &delivery_order(&state, 2, "06800"), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4007);
    assert_eq!(body["details"]["min_order"], 30.0);

    let (status, body) = send(&app, json_request("POST", "/api/orders", &delivery_order(&state, 3, "06800"), None)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["delivery_fee"], 3.5);
}

#[tokio::test]
async fn blocked_order_types_are_refused() {
    let state = state().await;
    let app = app(&state);

    put_settings(&state, json!({ "ordering_locked": false, "delivery_blocked": true, "pickup_blocked": false })).await;
    let (status, body) = send(&app, json_request("POST", "/api/orders", &delivery_order(&state, 3, "06800"), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 3004);
    let (status, body) = send(&app, json_request("POST", "/api/orders", &pickup_order(&state.config, 1), None)).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    put_settings(&state, json!({ "ordering_locked": false, "delivery_blocked": false, "pickup_blocked": true })).await;
    let (status, body) = send(&app, json_request("POST", "/api/orders", &pickup_order(&state.config, 1), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 3005);
}

#[tokio::test]
async fn closed_restaurant_refuses_orders() {
    let state = state().await;
    let app = app(&state);
    let admin = token_for(&state, 1, "admin", None);

    // Lunch service only: 19:00 is outside the hours
    sqlx::query("UPDATE restaurant_opening_hours SET open_time = '11:00', close_time = '14:00' WHERE restaurant_id = 1")
        .execute(&state.pool)
        .await
        .unwrap();
    let (status, body) = send(&app, json_request("POST", "/api/orders", &pickup_order(&state.config, 1), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["code"], 3006);

    let mut lunch = pickup_order(&state.config, 1);
    lunch["scheduled_for"] = json!(tomorrow_at(&state.config, 12, 0));
    let date = lunch["scheduled_for"].as_str().unwrap()[..10].to_string();
    let closure = json!({ "closure_date": date, "is_all_day": true, "reason": "Inventaire" });
    let (status, body) = send(
        &app,
        json_request("POST", "/api/admin/restaurants/1/closures", &closure, Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = send(&app, json_request("POST", "/api/orders", &lunch, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["code"], 3006);
}

#[tokio::test]
async fn daily_stats_count_paid_orders_only() {
    let state = state().await;
    let app = app(&state);
    let admin = token_for(&state, 1, "admin", None);

    let mut ids = Vec::new();
    for _ in 0..2 {
        let (status, body) = send(&app, json_request("POST", "/api/orders", &pickup_order(&state.config, 1), None)).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        ids.push(body["data"]["id"].as_str().unwrap().to_string());
    }
    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/admin/orders/{}/payment", ids[0]),
            &json!({ "payment_status": "paid" }),
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let today = Utc::now().with_timezone(&state.config.timezone()).format("%Y-%m-%d").to_string();
    let uri = format!("/api/admin/stats/daily?restaurant_id=1&from={today}&to={today}");
    let (status, body) = send(&app, get_request(&uri, Some(&admin))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let days = body["data"].as_array().unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0]["date"], today.as_str());
    assert_eq!(days[0]["order_count"], 1);
    assert_eq!(days[0]["revenue"], PRODUCT_PRICE);
}

#[tokio::test]
async fn bootstrap_admin_is_created_once() {
    let mut config = config();
    config.bootstrap_admin_email = Some("Patron@SushiEats.fr".into());
    config.bootstrap_admin_password = Some("motdepasse-solide".into());
    let db = sushi_server::DbService::memory().await.unwrap();
    seed(&db.pool).await;
    let state = ServerState::with_pool(config, db.pool).unwrap();

    admin::bootstrap_admin(&state).await.unwrap();
    admin::bootstrap_admin(&state).await.unwrap();
    assert_eq!(admin_user::count_admins(&state.pool).await.unwrap(), 1);

    let login = json!({ "email": "patron@sushieats.fr", "password": "motdepasse-solide" });
    let (status, body) = send(&app(&state), json_request("POST", "/api/admin/auth/login", &login, None)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["user"]["role"], "admin");
}
