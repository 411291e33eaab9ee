//! Menu Model (categories and products)

use serde::{Deserialize, Serialize};

/// Category name that grants free desserts in the cart
pub const CATEGORY_PLATEAUX: &str = "plateaux";
/// Dessert category name
pub const CATEGORY_DESSERTS: &str = "desserts";

/// Menu category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub display_order: i64,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub display_order: i64,
}

/// Update category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i64>,
}

/// Menu product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub restaurant_id: i64,
    pub category_id: i64,
    /// Category name, joined for cart and promotion matching
    pub category: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub is_vegetarian: bool,
    pub is_spicy: bool,
    pub is_new: bool,
    pub is_best_seller: bool,
    pub is_gluten_free: bool,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub allergens: Vec<String>,
    pub pieces: Option<i64>,
    /// Preparation time in minutes
    pub prep_time: Option<i64>,
    pub is_active: bool,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_vegetarian: bool,
    #[serde(default)]
    pub is_spicy: bool,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_best_seller: bool,
    #[serde(default)]
    pub is_gluten_free: bool,
    #[serde(default)]
    pub allergens: Vec<String>,
    pub pieces: Option<i64>,
    pub prep_time: Option<i64>,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub category_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub is_vegetarian: Option<bool>,
    pub is_spicy: Option<bool>,
    pub is_new: Option<bool>,
    pub is_best_seller: Option<bool>,
    pub is_gluten_free: Option<bool>,
    pub allergens: Option<Vec<String>>,
    pub pieces: Option<i64>,
    pub prep_time: Option<i64>,
    pub is_active: Option<bool>,
}
