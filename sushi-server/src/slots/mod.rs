//! Time slot rules
//!
//! A slot is one minute of dispatch time for one restaurant and order type.
//! Capacity defaults per order type, special events may override it for a
//! given `HH:MM`, and administrators can block a slot outright. Dine-in is
//! never limited.
//!
//! Occupancy counting and the atomic hold live in
//! [`crate::db::repository::time_slot`]; this module only holds the pure rules.

pub mod hours;

use chrono::{NaiveTime, Timelike};
use shared::models::{BlockedSlot, OpeningHours, OrderType, SlotCheck, SpecialEvent};

use crate::utils::time::parse_hhmm;

/// Slot granularity
pub const SLOT_MS: i64 = 60_000;
/// Step of the checkout time picker
pub const PICKER_STEP_MINUTES: u32 = 30;
/// Last hour offered by the fallback picker
pub const FALLBACK_LAST_HOUR: u32 = 22;
/// First hour offered by the fallback picker on a future date
pub const FALLBACK_FIRST_HOUR: u32 = 11;

pub const DINE_IN_MESSAGE: &str = "No limit for dine-in orders";
pub const AVAILABLE_MESSAGE: &str = "Time slot available";
pub const RESERVED_MESSAGE: &str = "Créneau réservé avec succès";

/// Nominal per-slot limit. Dine-in carries a figure for display only.
pub fn default_limit(order_type: OrderType) -> i64 {
    match order_type {
        OrderType::Delivery => 1,
        OrderType::Pickup => 2,
        OrderType::DineIn => 10,
    }
}

/// Whether the order type is subject to slot capacity
pub fn is_limited(order_type: OrderType) -> bool {
    !matches!(order_type, OrderType::DineIn)
}

/// Resolved capacity of one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotCapacity {
    pub max_allowed: i64,
    /// An active special event exists on the slot's date
    pub is_event_slot: bool,
}

/// Capacity for a slot at local `hhmm`, taking the day's special event into
/// account
pub fn resolve_capacity(
    order_type: OrderType,
    event: Option<&SpecialEvent>,
    hhmm: &str,
) -> SlotCapacity {
    let default = default_limit(order_type);
    let Some(event) = event.filter(|e| e.is_active) else {
        return SlotCapacity {
            max_allowed: default,
            is_event_slot: false,
        };
    };

    let wanted = parse_hhmm(hhmm);
    let max_allowed = event
        .time_slots
        .iter()
        .find(|s| wanted.is_some() && parse_hhmm(&s.time) == wanted)
        .and_then(|s| s.max_orders)
        .filter(|max| *max > 0)
        .unwrap_or(default);

    SlotCapacity {
        max_allowed,
        is_event_slot: true,
    }
}

fn type_label(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::Delivery => "livraison",
        _ => "retrait",
    }
}

pub fn blocked_message(reason: Option<&str>) -> String {
    format!(
        "Ce créneau a été bloqué par l'administration. {}",
        reason.unwrap_or_default()
    )
    .trim()
    .to_string()
}

pub fn full_message(order_type: OrderType) -> String {
    format!(
        "Ce créneau de {} est complet. Veuillez choisir un autre horaire.",
        type_label(order_type)
    )
}

/// Answer for dine-in requests
pub fn dine_in_check() -> SlotCheck {
    SlotCheck {
        available: true,
        message: DINE_IN_MESSAGE.to_string(),
        ..Default::default()
    }
}

/// Verify a slot given its blocking, capacity and current occupancy
pub fn evaluate(
    order_type: OrderType,
    capacity: SlotCapacity,
    blocked: Option<&BlockedSlot>,
    current_count: i64,
) -> SlotCheck {
    if !is_limited(order_type) {
        return dine_in_check();
    }

    if let Some(block) = blocked {
        return SlotCheck {
            available: false,
            message: blocked_message(block.reason.as_deref()),
            current_count: Some(current_count),
            max_allowed: Some(capacity.max_allowed),
            blocked_by_admin: true,
            is_event_slot: capacity.is_event_slot,
            ..Default::default()
        };
    }

    if current_count >= capacity.max_allowed {
        return SlotCheck {
            available: false,
            message: full_message(order_type),
            current_count: Some(current_count),
            max_allowed: Some(capacity.max_allowed),
            is_event_slot: capacity.is_event_slot,
            ..Default::default()
        };
    }

    SlotCheck {
        available: true,
        message: AVAILABLE_MESSAGE.to_string(),
        current_count: Some(current_count),
        max_allowed: Some(capacity.max_allowed),
        is_event_slot: capacity.is_event_slot,
        ..Default::default()
    }
}

fn step_up(time: NaiveTime) -> Option<NaiveTime> {
    let minutes = time.hour() * 60 + time.minute();
    let rounded = minutes.div_ceil(PICKER_STEP_MINUTES) * PICKER_STEP_MINUTES;
    if rounded >= 24 * 60 {
        return None;
    }
    NaiveTime::from_hms_opt(rounded / 60, rounded % 60, 0)
}

/// Picker grid inside one opening window, not earlier than `earliest`
pub fn grid_within(open: NaiveTime, close: NaiveTime, earliest: Option<NaiveTime>) -> Vec<NaiveTime> {
    let from = match earliest {
        Some(e) if e > open => e,
        _ => open,
    };
    let mut out = Vec::new();
    let mut cursor = step_up(from);
    while let Some(t) = cursor {
        if t > close {
            break;
        }
        out.push(t);
        let (next, wrapped) =
            t.overflowing_add_signed(chrono::Duration::minutes(i64::from(PICKER_STEP_MINUTES)));
        cursor = (wrapped == 0).then_some(next);
    }
    out
}

/// Picker grid for a day from its open rows
pub fn picker_times(rows: &[&OpeningHours], earliest: Option<NaiveTime>) -> Vec<NaiveTime> {
    let mut out: Vec<NaiveTime> = rows
        .iter()
        .filter_map(|h| Some((parse_hhmm(&h.open_time)?, parse_hhmm(&h.close_time)?)))
        .flat_map(|(open, close)| grid_within(open, close, earliest))
        .collect();
    out.sort();
    out.dedup();
    out
}

/// Grid used when a restaurant has no stored opening hours: from the next
/// full hour (or 11:00 on a future date) to 22:00, on :00 and :30.
pub fn fallback_times(now_local: Option<NaiveTime>) -> Vec<NaiveTime> {
    let first = match now_local {
        Some(now) => now.hour() + 1,
        None => FALLBACK_FIRST_HOUR,
    };
    let mut out = Vec::new();
    for h in first..=FALLBACK_LAST_HOUR {
        if let Some(t) = NaiveTime::from_hms_opt(h, 0, 0) {
            out.push(t);
        }
        if h < FALLBACK_LAST_HOUR
            && let Some(t) = NaiveTime::from_hms_opt(h, 30, 0)
        {
            out.push(t);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::EventTimeSlot;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn christmas(slots: Vec<EventTimeSlot>) -> SpecialEvent {
        SpecialEvent {
            id: 1,
            name: "Réveillon".into(),
            event_date: "2026-12-24".into(),
            is_active: true,
            time_slots: slots,
        }
    }

    fn block(reason: Option<&str>) -> BlockedSlot {
        BlockedSlot {
            id: 1,
            restaurant_id: 1,
            blocked_date: "2026-03-10".into(),
            blocked_time: "12:00".into(),
            reason: reason.map(Into::into),
        }
    }

    #[test]
    fn default_limits() {
        assert_eq!(default_limit(OrderType::Delivery), 1);
        assert_eq!(default_limit(OrderType::Pickup), 2);
        assert!(!is_limited(OrderType::DineIn));
    }

    #[test]
    fn event_overrides_matching_slot_only() {
        let event = christmas(vec![
            EventTimeSlot {
                time: "19:00".into(),
                max_orders: Some(4),
            },
            EventTimeSlot {
                time: "19:30".into(),
                max_orders: None,
            },
        ]);
        let cap = resolve_capacity(OrderType::Delivery, Some(&event), "19:00");
        assert_eq!(cap, SlotCapacity { max_allowed: 4, is_event_slot: true });
        let cap = resolve_capacity(OrderType::Delivery, Some(&event), "19:30");
        assert_eq!(cap.max_allowed, 1);
        assert!(cap.is_event_slot);
        let cap = resolve_capacity(OrderType::Pickup, None, "19:00");
        assert_eq!(cap, SlotCapacity { max_allowed: 2, is_event_slot: false });
    }

    #[test]
    fn inactive_event_is_ignored() {
        let mut event = christmas(vec![EventTimeSlot {
            time: "19:00".into(),
            max_orders: Some(4),
        }]);
        event.is_active = false;
        assert_eq!(resolve_capacity(OrderType::Delivery, Some(&event), "19:00").max_allowed, 1);
    }

    #[test]
    fn full_and_free_slots() {
        let cap = SlotCapacity { max_allowed: 1, is_event_slot: false };
        let free = evaluate(OrderType::Delivery, cap, None, 0);
        assert!(free.available);
        assert_eq!(free.max_allowed, Some(1));

        let full = evaluate(OrderType::Delivery, cap, None, 1);
        assert!(!full.available);
        assert_eq!(
            full.message,
            "Ce créneau de livraison est complet. Veuillez choisir un autre horaire."
        );
        let full = evaluate(OrderType::Pickup, SlotCapacity { max_allowed: 2, is_event_slot: false }, None, 2);
        assert!(full.message.contains("retrait"));
    }

    #[test]
    fn blocked_slot_wins_over_capacity() {
        let cap = SlotCapacity { max_allowed: 1, is_event_slot: false };
        let check = evaluate(OrderType::Delivery, cap, Some(&block(Some("Livreur absent"))), 0);
        assert!(!check.available);
        assert!(check.blocked_by_admin);
        assert_eq!(
            check.message,
            "Ce créneau a été bloqué par l'administration. Livreur absent"
        );
        let check = evaluate(OrderType::Delivery, cap, Some(&block(None)), 0);
        assert_eq!(check.message, "Ce créneau a été bloqué par l'administration.");
    }

    #[test]
    fn dine_in_is_unlimited() {
        let cap = SlotCapacity { max_allowed: 10, is_event_slot: false };
        let check = evaluate(OrderType::DineIn, cap, Some(&block(None)), 500);
        assert!(check.available);
        assert_eq!(check.message, DINE_IN_MESSAGE);
        assert_eq!(check.max_allowed, None);
    }

    #[test]
    fn grid_respects_hours_and_lead_time() {
        let grid = grid_within(t(11, 0), t(14, 0), None);
        assert_eq!(grid.first(), Some(&t(11, 0)));
        assert_eq!(grid.last(), Some(&t(14, 0)));
        assert_eq!(grid.len(), 7);

        let grid = grid_within(t(11, 0), t(14, 0), Some(t(12, 10)));
        assert_eq!(grid, vec![t(12, 30), t(13, 0), t(13, 30), t(14, 0)]);

        assert!(grid_within(t(11, 0), t(14, 0), Some(t(15, 0))).is_empty());
        assert_eq!(grid_within(t(23, 0), t(23, 59), None), vec![t(23, 0), t(23, 30)]);
    }

    #[test]
    fn fallback_grid() {
        let grid = fallback_times(Some(t(20, 15)));
        assert_eq!(grid, vec![t(21, 0), t(21, 30), t(22, 0)]);
        assert!(fallback_times(Some(t(22, 5))).is_empty());
        let grid = fallback_times(None);
        assert_eq!(grid.first(), Some(&t(11, 0)));
        assert_eq!(grid.last(), Some(&t(22, 0)));
    }
}
