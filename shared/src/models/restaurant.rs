//! Restaurant Model

use serde::{Deserialize, Serialize};

/// Ordering switches stored as JSON on the restaurant row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestaurantSettings {
    pub ordering_locked: bool,
    pub delivery_blocked: bool,
    pub pickup_blocked: bool,
}

impl RestaurantSettings {
    /// Ordering is locked explicitly, or implicitly when both delivery and
    /// pickup are blocked.
    pub fn is_locked(&self) -> bool {
        self.ordering_locked || (self.delivery_blocked && self.pickup_blocked)
    }
}

/// Restaurant entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub settings: RestaurantSettings,
    pub created_at: i64,
}

/// Create restaurant payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantCreate {
    pub name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Update restaurant payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestaurantUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
}

/// Ordering status as shown on the storefront banner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderingStatus {
    pub ordering_locked: bool,
    pub delivery_blocked: bool,
    pub pickup_blocked: bool,
    pub is_locked: bool,
}

impl From<RestaurantSettings> for OrderingStatus {
    fn from(s: RestaurantSettings) -> Self {
        Self {
            ordering_locked: s.ordering_locked,
            delivery_blocked: s.delivery_blocked,
            pickup_blocked: s.pickup_blocked,
            is_locked: s.is_locked(),
        }
    }
}

/// Weekly opening hours row (0=Sunday..6=Saturday)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OpeningHours {
    pub day_of_week: i64,
    pub slot_number: i64,
    pub is_open: bool,
    /// HH:MM
    pub open_time: String,
    /// HH:MM
    pub close_time: String,
}

/// Exceptional closure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Closure {
    pub id: i64,
    pub restaurant_id: i64,
    /// YYYY-MM-DD
    pub closure_date: String,
    pub is_all_day: bool,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub reason: Option<String>,
}

/// Create closure payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosureCreate {
    pub closure_date: String,
    #[serde(default)]
    pub is_all_day: bool,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub reason: Option<String>,
}

/// Answer of the "is the restaurant open" check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenStatus {
    pub is_open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
