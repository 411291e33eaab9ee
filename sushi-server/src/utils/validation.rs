//! Input validation helpers
//!
//! Text length limits and the small checks shared by CRUD handlers and the
//! checkout flow. SQLite TEXT has no built-in length enforcement.

use crate::utils::AppError;
use crate::utils::time;
use shared::error::ErrorCode;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: restaurant, category, product, zone, event, etc.
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, reasons, special instructions
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, postal code, promo code
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Minimum password length for back-office accounts
pub const MIN_PASSWORD_LEN: usize = 8;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            format!("{field} must not be empty"),
        )
        .with_detail("field", field));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Prices and discounts must be finite and non-negative.
pub fn validate_amount(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{field} must be a non-negative amount"),
        )
        .with_detail("field", field));
    }
    Ok(())
}

/// Minimal shape check: one `@` with something on both sides and a dot in
/// the domain.
pub fn validate_email(value: &str) -> Result<(), AppError> {
    validate_required_text(value, "email", MAX_EMAIL_LEN)?;
    let valid = match value.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(AppError::with_message(ErrorCode::InvalidFormat, "Invalid email address")
            .with_detail("field", "email"));
    }
    Ok(())
}

/// Phone numbers: digits with optional `+`, spaces, dots or dashes.
pub fn validate_phone(value: &str) -> Result<(), AppError> {
    validate_required_text(value, "phone", MAX_SHORT_TEXT_LEN)?;
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '.' | '-' | '(' | ')'));
    if !allowed || digits < 6 {
        return Err(AppError::with_message(ErrorCode::InvalidFormat, "Invalid phone number")
            .with_detail("field", "phone"));
    }
    Ok(())
}

/// `HH:MM` wall-clock time.
pub fn validate_hhmm(value: &str, field: &str) -> Result<(), AppError> {
    time::parse_hhmm(value).map(|_| ()).ok_or_else(|| {
        AppError::with_message(ErrorCode::InvalidFormat, format!("{field} must be HH:MM"))
            .with_detail("field", field)
    })
}

/// `YYYY-MM-DD` calendar date.
pub fn validate_date(value: &str, field: &str) -> Result<(), AppError> {
    time::parse_date(value).map(|_| ()).ok_or_else(|| {
        AppError::with_message(ErrorCode::InvalidFormat, format!("{field} must be YYYY-MM-DD"))
            .with_detail("field", field)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_rejects_blank_and_long() {
        assert!(validate_required_text("Sushi Shop", "name", MAX_NAME_LEN).is_ok());
        let err = validate_required_text("   ", "name", MAX_NAME_LEN).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert!(validate_required_text(&"x".repeat(201), "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn optional_text_only_checks_length() {
        assert!(validate_optional_text(&None, "note", 5).is_ok());
        assert!(validate_optional_text(&Some("abc".into()), "note", 5).is_ok());
        assert!(validate_optional_text(&Some("abcdef".into()), "note", 5).is_err());
    }

    #[test]
    fn amounts_must_be_non_negative() {
        assert!(validate_amount(0.0, "price").is_ok());
        assert!(validate_amount(12.5, "price").is_ok());
        assert_eq!(validate_amount(-0.01, "price").unwrap_err().code, ErrorCode::ValueOutOfRange);
        assert!(validate_amount(f64::NAN, "price").is_err());
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("client@example.fr").is_ok());
        assert!(validate_email("client@example").is_err());
        assert!(validate_email("@example.fr").is_err());
        assert!(validate_email("client.example.fr").is_err());
    }

    #[test]
    fn phone_shape() {
        assert!(validate_phone("+33 6 12 34 56 78").is_ok());
        assert!(validate_phone("06.12.34.56.78").is_ok());
        assert!(validate_phone("call me").is_err());
        assert!(validate_phone("123").is_err());
    }

    #[test]
    fn time_and_date_formats() {
        assert!(validate_hhmm("11:30", "start_time").is_ok());
        assert!(validate_hhmm("25:00", "start_time").is_err());
        assert!(validate_date("2026-12-24", "event_date").is_ok());
        assert!(validate_date("24/12/2026", "event_date").is_err());
    }
}
