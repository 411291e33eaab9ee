//! Sales statistics

use serde::{Deserialize, Serialize};

/// Revenue for one local day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyStats {
    /// YYYY-MM-DD
    pub date: String,
    pub order_count: i64,
    pub revenue: f64,
    pub average_basket: f64,
}

/// Best-selling item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PopularProduct {
    pub product_id: Option<i64>,
    pub name: String,
    pub quantity: i64,
    pub revenue: f64,
}

/// Stats query window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsQuery {
    pub restaurant_id: i64,
    /// YYYY-MM-DD, inclusive
    pub from: String,
    /// YYYY-MM-DD, inclusive
    pub to: String,
    pub limit: Option<i64>,
}
