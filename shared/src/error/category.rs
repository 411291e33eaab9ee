//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Restaurant errors (3xxx)
    Restaurant,
    /// Order errors (4xxx)
    Order,
    /// Payment errors (5xxx)
    Payment,
    /// Menu and configurator errors (6xxx)
    Menu,
    /// Time slot and delivery errors (7xxx)
    Slot,
    /// Promotion errors (8xxx)
    Promotion,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Restaurant,
            4000..5000 => Self::Order,
            5000..6000 => Self::Payment,
            6000..7000 => Self::Menu,
            7000..8000 => Self::Slot,
            8000..9000 => Self::Promotion,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Restaurant => "restaurant",
            Self::Order => "order",
            Self::Payment => "payment",
            Self::Menu => "menu",
            Self::Slot => "slot",
            Self::Promotion => "promotion",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(3003), ErrorCategory::Restaurant);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Order);
        assert_eq!(ErrorCategory::from_code(5001), ErrorCategory::Payment);
        assert_eq!(ErrorCategory::from_code(6001), ErrorCategory::Menu);
        assert_eq!(ErrorCategory::from_code(7101), ErrorCategory::Slot);
        assert_eq!(ErrorCategory::from_code(8004), ErrorCategory::Promotion);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::SlotUnavailable.category(), ErrorCategory::Slot);
        assert_eq!(
            ErrorCode::PromoCodeExpired.category(),
            ErrorCategory::Promotion
        );
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&ErrorCategory::Restaurant).unwrap();
        assert_eq!(json, "\"restaurant\"");
        let category: ErrorCategory = serde_json::from_str("\"slot\"").unwrap();
        assert_eq!(category, ErrorCategory::Slot);
    }
}
