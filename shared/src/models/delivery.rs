//! Delivery Model

use serde::{Deserialize, Serialize};

/// Delivery zone with its own fee and minimum order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DeliveryZone {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub available: bool,
    pub min_order: f64,
    pub delivery_fee: f64,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub postal_codes: Vec<String>,
}

/// Create delivery zone payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryZoneCreate {
    pub name: String,
    #[serde(default)]
    pub min_order: f64,
    #[serde(default)]
    pub delivery_fee: f64,
    #[serde(default)]
    pub postal_codes: Vec<String>,
}

/// Update delivery zone payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryZoneUpdate {
    pub name: Option<String>,
    pub available: Option<bool>,
    pub min_order: Option<f64>,
    pub delivery_fee: Option<f64>,
    pub postal_codes: Option<Vec<String>>,
}

/// Postal code served by a restaurant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DeliveryLocation {
    pub id: i64,
    pub restaurant_id: i64,
    pub postal_code: String,
    pub city: String,
    pub is_active: bool,
}

/// Create delivery location payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryLocationCreate {
    pub postal_code: String,
    pub city: String,
}

/// Delivery eligibility for a postal code
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryEligibility {
    pub eligible: bool,
    pub postal_code: String,
    pub zone_id: Option<i64>,
    pub zone_name: Option<String>,
    pub city: Option<String>,
    pub delivery_fee: f64,
    pub min_order: f64,
}
