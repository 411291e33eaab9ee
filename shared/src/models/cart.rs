//! Cart Model

use serde::{Deserialize, Serialize};

/// Line in the customer's cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub product_id: i64,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    /// Category name (e.g. "plateaux", "desserts")
    pub category: String,
    pub special_instructions: Option<String>,
}

/// Cart totals as shown in the cart drawer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartSummary {
    pub items: Vec<CartItem>,
    pub total: f64,
    pub item_count: i64,
    pub plateau_count: i64,
    pub free_dessert_count: i64,
    pub remaining_free_desserts: i64,
}

/// Cart operation replayed against the server-side cart engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CartOperation {
    Add { product_id: i64, quantity: i64, special_instructions: Option<String> },
    Remove { product_id: i64 },
    UpdateQuantity { product_id: i64, quantity: i64 },
    Decrement { product_id: i64 },
    Clear,
}

/// Cart evaluation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartRequest {
    pub restaurant_id: i64,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub operations: Vec<CartOperation>,
}
