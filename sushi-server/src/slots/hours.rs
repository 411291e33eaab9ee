//! Opening hours and closures
//!
//! Without stored rows a restaurant follows the default week: closed Sunday
//! and Monday, 11:00-22:00 the other days.

use chrono::{NaiveDate, NaiveTime};
use shared::models::{Closure, OpenStatus, OpeningHours};

use crate::utils::time::{format_hhmm, parse_hhmm, time_in_window};

pub const DEFAULT_OPEN: &str = "11:00";
pub const DEFAULT_CLOSE: &str = "22:00";

/// Default week, 0 = Sunday
pub fn default_opening_hours() -> Vec<OpeningHours> {
    (0..7)
        .map(|day| OpeningHours {
            day_of_week: day,
            slot_number: 1,
            is_open: !matches!(day, 0 | 1),
            open_time: DEFAULT_OPEN.into(),
            close_time: DEFAULT_CLOSE.into(),
        })
        .collect()
}

/// Open rows for one weekday
pub fn rows_for_day(hours: &[OpeningHours], weekday: u8) -> Vec<&OpeningHours> {
    let mut rows: Vec<&OpeningHours> = hours
        .iter()
        .filter(|h| h.day_of_week == i64::from(weekday) && h.is_open)
        .collect();
    rows.sort_by_key(|h| h.slot_number);
    rows
}

/// Closure covering the given local date and time, if any
pub fn closure_at<'a>(closures: &'a [Closure], date: NaiveDate, time: NaiveTime) -> Option<&'a Closure> {
    let date = date.format("%Y-%m-%d").to_string();
    closures.iter().filter(|c| c.closure_date == date).find(|c| {
        if c.is_all_day {
            return true;
        }
        match (&c.start_time, &c.end_time) {
            (Some(start), Some(end)) => time_in_window(time, start, end),
            // A partial closure without bounds covers the whole day
            _ => true,
        }
    })
}

/// "11:00 - 22:00" or "Fermé aujourd'hui"
pub fn day_hours_label(hours: &[OpeningHours], weekday: u8) -> String {
    let rows = rows_for_day(hours, weekday);
    if rows.is_empty() {
        return "Fermé aujourd'hui".to_string();
    }
    rows.iter()
        .map(|h| format!("{} - {}", h.open_time, h.close_time))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Open/closed answer at a local date and time
pub fn open_status(
    hours: &[OpeningHours],
    closures: &[Closure],
    date: NaiveDate,
    weekday: u8,
    time: NaiveTime,
) -> OpenStatus {
    if let Some(closure) = closure_at(closures, date, time) {
        let reason = match &closure.reason {
            Some(r) if !r.trim().is_empty() => format!("Fermeture exceptionnelle : {}", r.trim()),
            _ => "Fermeture exceptionnelle".to_string(),
        };
        return OpenStatus {
            is_open: false,
            reason: Some(reason),
        };
    }

    let rows = rows_for_day(hours, weekday);
    if rows.is_empty() {
        return OpenStatus {
            is_open: false,
            reason: Some("Fermé aujourd'hui".to_string()),
        };
    }

    let open = rows
        .iter()
        .any(|h| time_in_window(time, &h.open_time, &h.close_time));
    if open {
        OpenStatus {
            is_open: true,
            reason: None,
        }
    } else {
        OpenStatus {
            is_open: false,
            reason: Some(format!(
                "Horaires d'ouverture : {} (il est {})",
                day_hours_label(hours, weekday),
                format_hhmm(time)
            )),
        }
    }
}

/// Validate a set of rows before storing them
pub fn validate_rows(rows: &[OpeningHours]) -> Result<(), String> {
    for row in rows {
        if !(0..=6).contains(&row.day_of_week) {
            return Err(format!("day_of_week {} is out of range 0..6", row.day_of_week));
        }
        let (Some(open), Some(close)) = (parse_hhmm(&row.open_time), parse_hhmm(&row.close_time))
        else {
            return Err(format!("Invalid hours for day {}", row.day_of_week));
        };
        if row.is_open && open > close {
            return Err(format!(
                "Opening time {} is after closing time {} for day {}",
                row.open_time, row.close_time, row.day_of_week
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    fn closure(date: &str, all_day: bool, start: Option<&str>, end: Option<&str>) -> Closure {
        Closure {
            id: 1,
            restaurant_id: 1,
            closure_date: date.into(),
            is_all_day: all_day,
            start_time: start.map(Into::into),
            end_time: end.map(Into::into),
            reason: Some("Inventaire".into()),
        }
    }

    #[test]
    fn default_week_closes_sunday_and_monday() {
        let hours = default_opening_hours();
        assert_eq!(hours.len(), 7);
        assert!(rows_for_day(&hours, 0).is_empty());
        assert!(rows_for_day(&hours, 1).is_empty());
        assert_eq!(rows_for_day(&hours, 2).len(), 1);
        assert_eq!(day_hours_label(&hours, 3), "11:00 - 22:00");
        assert_eq!(day_hours_label(&hours, 1), "Fermé aujourd'hui");
    }

    #[test]
    fn open_bounds_are_inclusive() {
        let hours = default_opening_hours();
        assert!(open_status(&hours, &[], d(10), 2, t(11, 0)).is_open);
        assert!(open_status(&hours, &[], d(10), 2, t(22, 0)).is_open);
        assert!(!open_status(&hours, &[], d(10), 2, t(10, 59)).is_open);
        assert!(!open_status(&hours, &[], d(9), 1, t(12, 0)).is_open);
    }

    #[test]
    fn closures_override_hours() {
        let hours = default_opening_hours();
        let all_day = [closure("2026-03-10", true, None, None)];
        let status = open_status(&hours, &all_day, d(10), 2, t(12, 0));
        assert!(!status.is_open);
        assert_eq!(status.reason.as_deref(), Some("Fermeture exceptionnelle : Inventaire"));

        let partial = [closure("2026-03-10", false, Some("12:00"), Some("14:00"))];
        assert!(!open_status(&hours, &partial, d(10), 2, t(12, 0)).is_open);
        assert!(!open_status(&hours, &partial, d(10), 2, t(14, 0)).is_open);
        assert!(open_status(&hours, &partial, d(10), 2, t(14, 1)).is_open);
        // Other day is unaffected
        assert!(open_status(&hours, &partial, d(11), 3, t(12, 0)).is_open);
    }

    #[test]
    fn split_service_days() {
        let hours = vec![
            OpeningHours {
                day_of_week: 5,
                slot_number: 1,
                is_open: true,
                open_time: "11:30".into(),
                close_time: "14:00".into(),
            },
            OpeningHours {
                day_of_week: 5,
                slot_number: 2,
                is_open: true,
                open_time: "18:30".into(),
                close_time: "22:30".into(),
            },
        ];
        assert!(open_status(&hours, &[], d(13), 5, t(19, 0)).is_open);
        assert!(!open_status(&hours, &[], d(13), 5, t(16, 0)).is_open);
        assert_eq!(day_hours_label(&hours, 5), "11:30 - 14:00, 18:30 - 22:30");
    }

    #[test]
    fn row_validation() {
        assert!(validate_rows(&default_opening_hours()).is_ok());
        let mut bad = default_opening_hours();
        bad[2].open_time = "23:00".into();
        assert!(validate_rows(&bad).is_err());
        bad[2].open_time = "noon".into();
        assert!(validate_rows(&bad).is_err());
    }
}
