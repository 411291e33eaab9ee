//! Time Slot Model

use serde::{Deserialize, Serialize};

use super::OrderType;

/// Per-slot capacity override for a special event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventTimeSlot {
    /// HH:MM
    pub time: String,
    pub max_orders: Option<i64>,
}

/// Special event (e.g. Christmas eve) with its own slot capacities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SpecialEvent {
    pub id: i64,
    pub name: String,
    /// YYYY-MM-DD
    pub event_date: String,
    pub is_active: bool,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub time_slots: Vec<EventTimeSlot>,
}

/// Create special event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialEventCreate {
    pub name: String,
    pub event_date: String,
    #[serde(default)]
    pub time_slots: Vec<EventTimeSlot>,
}

/// Update special event payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecialEventUpdate {
    pub name: Option<String>,
    pub event_date: Option<String>,
    pub is_active: Option<bool>,
    pub time_slots: Option<Vec<EventTimeSlot>>,
}

/// Slot closed by an administrator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BlockedSlot {
    pub id: i64,
    pub restaurant_id: i64,
    /// YYYY-MM-DD
    pub blocked_date: String,
    /// HH:MM
    pub blocked_time: String,
    pub reason: Option<String>,
}

/// Block slot payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedSlotCreate {
    pub blocked_date: String,
    pub blocked_time: String,
    pub reason: Option<String>,
}

/// Temporary capacity hold taken before checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SlotReservation {
    pub id: i64,
    pub restaurant_id: i64,
    pub order_type: OrderType,
    /// Unix millis, truncated to the minute
    pub slot_start: i64,
    pub expires_at: i64,
    pub order_id: Option<String>,
    pub created_at: i64,
}

/// Slot verify / reserve request
///
/// Fields are optional so that a missing parameter is reported as a
/// validation error rather than a JSON rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotRequest {
    pub restaurant_id: Option<i64>,
    pub order_type: Option<OrderType>,
    pub scheduled_for: Option<chrono::DateTime<chrono::FixedOffset>>,
}

/// Slot availability answer
///
/// `current_count` and `max_allowed` are null for dine-in, which has no limit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SlotCheck {
    pub available: bool,
    pub message: String,
    pub current_count: Option<i64>,
    pub max_allowed: Option<i64>,
    #[serde(default)]
    pub blocked_by_admin: bool,
    #[serde(default)]
    pub is_event_slot: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub reserved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

/// Selectable slot in the checkout time picker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailableSlot {
    /// HH:MM, local to the restaurant
    pub time: String,
    /// Unix millis
    pub starts_at: i64,
    pub remaining: i64,
}

/// Query for the slot picker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableSlotsQuery {
    pub order_type: OrderType,
    /// YYYY-MM-DD; today when absent
    pub date: Option<String>,
}
