//! Promotion Model (day/time promotions and promo codes)

use serde::{Deserialize, Serialize};

/// Automatic promotion scoped to weekdays, a time window and categories
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DayPromotion {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Percentage (20 = 20%) or fixed amount
    pub discount: f64,
    pub is_percentage: bool,
    /// 0=Sunday..6=Saturday
    #[cfg_attr(feature = "db", sqlx(json))]
    pub applicable_days: Vec<u8>,
    /// Category names; empty means every category
    #[cfg_attr(feature = "db", sqlx(json))]
    pub applicable_categories: Vec<String>,
    /// Product ids; empty means no product-level restriction
    #[cfg_attr(feature = "db", sqlx(json))]
    pub applicable_products: Vec<i64>,
    /// Restaurant ids; empty means every restaurant
    #[cfg_attr(feature = "db", sqlx(json))]
    pub applicable_restaurants: Vec<i64>,
    /// HH:MM
    pub start_time: Option<String>,
    /// HH:MM
    pub end_time: Option<String>,
    pub is_active: bool,
}

/// Create day promotion payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPromotionCreate {
    pub title: String,
    pub description: Option<String>,
    pub discount: f64,
    #[serde(default = "default_true")]
    pub is_percentage: bool,
    pub applicable_days: Vec<u8>,
    #[serde(default)]
    pub applicable_categories: Vec<String>,
    #[serde(default)]
    pub applicable_products: Vec<i64>,
    #[serde(default)]
    pub applicable_restaurants: Vec<i64>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// Update day promotion payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayPromotionUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub discount: Option<f64>,
    pub is_percentage: Option<bool>,
    pub applicable_days: Option<Vec<u8>>,
    pub applicable_categories: Option<Vec<String>>,
    pub applicable_products: Option<Vec<i64>>,
    pub applicable_restaurants: Option<Vec<i64>>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_active: Option<bool>,
}

/// Promo code entered at checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PromoCode {
    pub id: i64,
    /// Stored upper-case
    pub code: String,
    pub description: Option<String>,
    pub discount: f64,
    pub is_percentage: bool,
    pub min_order: Option<f64>,
    /// Unix millis
    pub start_date: Option<i64>,
    /// Unix millis
    pub end_date: Option<i64>,
    pub is_one_time_use: bool,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub applicable_categories: Vec<String>,
    pub restaurant_id: Option<i64>,
    pub is_active: bool,
}

/// Create promo code payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoCodeCreate {
    pub code: String,
    pub description: Option<String>,
    pub discount: f64,
    #[serde(default = "default_true")]
    pub is_percentage: bool,
    pub min_order: Option<f64>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    #[serde(default)]
    pub is_one_time_use: bool,
    #[serde(default)]
    pub applicable_categories: Vec<String>,
    pub restaurant_id: Option<i64>,
}

/// Update promo code payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromoCodeUpdate {
    pub description: Option<String>,
    pub discount: Option<f64>,
    pub is_percentage: Option<bool>,
    pub min_order: Option<f64>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    pub is_one_time_use: Option<bool>,
    pub applicable_categories: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

/// Promo code validation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoValidateRequest {
    pub code: String,
    pub restaurant_id: i64,
    pub subtotal: f64,
    pub email: Option<String>,
}

/// Promo code validation result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromoValidation {
    pub valid: bool,
    /// Raw discount value of the code (percentage or amount)
    pub discount: f64,
    pub is_percentage: bool,
    /// Discount applied to the submitted subtotal
    pub discount_amount: f64,
    pub message: String,
}

/// Discount preview for a single product under the active promotion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromotedPrice {
    pub product_id: i64,
    pub promotion_id: i64,
    pub title: String,
    pub original_price: f64,
    pub discount: f64,
    pub discounted_price: f64,
}

fn default_true() -> bool {
    true
}
