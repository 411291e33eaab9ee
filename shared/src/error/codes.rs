//! Unified error codes for the SushiEats service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Restaurant errors (lock, opening hours)
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Menu / configurator errors
//! - 7xxx: Time slot and delivery errors
//! - 8xxx: Promotion errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so that the storefront and
/// the back-office can switch on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,
    /// Too many login attempts
    TooManyAttempts = 1008,
    /// Password too short
    PasswordTooShort = 1009,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,
    /// An admin cannot delete their own account
    CannotDeleteSelf = 2005,

    // ==================== 3xxx: Restaurant ====================
    /// Restaurant not found
    RestaurantNotFound = 3001,
    /// Restaurant is not active
    RestaurantInactive = 3002,
    /// Online ordering is locked
    OrderingLocked = 3003,
    /// Delivery orders are blocked
    DeliveryBlocked = 3004,
    /// Pickup orders are blocked
    PickupBlocked = 3005,
    /// Restaurant is closed at the requested time
    RestaurantClosed = 3006,
    /// Closure not found
    ClosureNotFound = 3007,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order is empty
    OrderEmpty = 4002,
    /// Status change is not allowed from the current status
    InvalidStatusTransition = 4003,
    /// Order has already been paid
    OrderAlreadyPaid = 4004,
    /// Customer contact information missing
    ContactInfoMissing = 4005,
    /// Delivery address missing
    DeliveryAddressMissing = 4006,
    /// Minimum order amount not reached
    MinimumOrderNotReached = 4007,
    /// Product is not available for ordering
    ProductUnavailable = 4008,

    // ==================== 5xxx: Payment ====================
    /// Payment session could not be created
    PaymentSessionFailed = 5002,
    /// Webhook signature is invalid or stale
    WebhookSignatureInvalid = 5003,

    // ==================== 6xxx: Menu ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product price is invalid
    ProductInvalidPrice = 6002,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category still has products
    CategoryHasProducts = 6102,
    /// Category name already exists
    CategoryNameExists = 6103,
    /// Configurator option not found
    ConfiguratorOptionNotFound = 6201,
    /// More creations than the box allows
    TooManyCreations = 6202,
    /// More bases than a creation allows
    TooManyBases = 6203,
    /// A box must be selected
    BoxRequired = 6204,
    /// No free dessert left for the current plateaux
    FreeDessertUnavailable = 6205,

    // ==================== 7xxx: Slot / Delivery ====================
    /// Time slot is full
    SlotUnavailable = 7001,
    /// Time slot blocked by an administrator
    SlotBlocked = 7002,
    /// Slot reservation not found
    ReservationNotFound = 7003,
    /// Slot reservation expired
    ReservationExpired = 7004,
    /// Special event not found
    SpecialEventNotFound = 7005,
    /// Postal code is outside every delivery zone
    NotInDeliveryZone = 7101,
    /// Delivery zone not found
    DeliveryZoneNotFound = 7102,
    /// Delivery zone name already exists
    DeliveryZoneNameExists = 7103,

    // ==================== 8xxx: Promotion ====================
    /// Promotion not found
    PromotionNotFound = 8001,
    /// Promo code unknown or inactive
    PromoCodeInvalid = 8002,
    /// Promo code outside its validity window
    PromoCodeExpired = 8003,
    /// One-time promo code already used
    PromoCodeAlreadyUsed = 8004,
    /// Promo code minimum amount not reached
    PromoCodeMinimumNotReached = 8005,
    /// Promo code already exists
    PromoCodeExists = 8006,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Notification delivery failed
    NotificationFailed = 9006,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::TooManyAttempts => "Too many attempts",
            ErrorCode::PasswordTooShort => "Password must be at least 8 characters",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::CannotDeleteSelf => "Cannot delete your own account",

            // Restaurant
            ErrorCode::RestaurantNotFound => "Restaurant not found",
            ErrorCode::RestaurantInactive => "Restaurant is not active",
            ErrorCode::OrderingLocked => "Online ordering is temporarily unavailable",
            ErrorCode::DeliveryBlocked => "Delivery is temporarily unavailable",
            ErrorCode::PickupBlocked => "Pickup is temporarily unavailable",
            ErrorCode::RestaurantClosed => "Restaurant is closed at the requested time",
            ErrorCode::ClosureNotFound => "Closure not found",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Order is empty",
            ErrorCode::InvalidStatusTransition => "Status change not allowed",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",
            ErrorCode::ContactInfoMissing => "Customer contact information is missing",
            ErrorCode::DeliveryAddressMissing => "Delivery address is missing",
            ErrorCode::MinimumOrderNotReached => "Minimum order amount not reached",
            ErrorCode::ProductUnavailable => "Product is not available",

            // Payment
            ErrorCode::PaymentSessionFailed => "Payment session could not be created",
            ErrorCode::WebhookSignatureInvalid => "Invalid webhook signature",

            // Menu
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInvalidPrice => "Product price must be zero or positive",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryHasProducts => "Category has associated products",
            ErrorCode::CategoryNameExists => "Category name already exists",
            ErrorCode::ConfiguratorOptionNotFound => "Configurator option not found",
            ErrorCode::TooManyCreations => "Too many creations for this box",
            ErrorCode::TooManyBases => "A creation accepts at most 2 bases",
            ErrorCode::BoxRequired => "A box must be selected",
            ErrorCode::FreeDessertUnavailable => "No free dessert available",

            // Slot / Delivery
            ErrorCode::SlotUnavailable => "Time slot is full",
            ErrorCode::SlotBlocked => "Time slot is blocked",
            ErrorCode::ReservationNotFound => "Slot reservation not found",
            ErrorCode::ReservationExpired => "Slot reservation has expired",
            ErrorCode::SpecialEventNotFound => "Special event not found",
            ErrorCode::NotInDeliveryZone => "Postal code is not in a delivery zone",
            ErrorCode::DeliveryZoneNotFound => "Delivery zone not found",
            ErrorCode::DeliveryZoneNameExists => "Delivery zone name already exists",

            // Promotion
            ErrorCode::PromotionNotFound => "Promotion not found",
            ErrorCode::PromoCodeInvalid => "Promo code is invalid",
            ErrorCode::PromoCodeExpired => "Promo code has expired",
            ErrorCode::PromoCodeAlreadyUsed => "Promo code already used",
            ErrorCode::PromoCodeMinimumNotReached => "Promo code minimum amount not reached",
            ErrorCode::PromoCodeExists => "Promo code already exists",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NotificationFailed => "Notification delivery failed",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error returned when converting an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),
            1008 => Ok(ErrorCode::TooManyAttempts),
            1009 => Ok(ErrorCode::PasswordTooShort),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),
            2005 => Ok(ErrorCode::CannotDeleteSelf),

            // Restaurant
            3001 => Ok(ErrorCode::RestaurantNotFound),
            3002 => Ok(ErrorCode::RestaurantInactive),
            3003 => Ok(ErrorCode::OrderingLocked),
            3004 => Ok(ErrorCode::DeliveryBlocked),
            3005 => Ok(ErrorCode::PickupBlocked),
            3006 => Ok(ErrorCode::RestaurantClosed),
            3007 => Ok(ErrorCode::ClosureNotFound),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderEmpty),
            4003 => Ok(ErrorCode::InvalidStatusTransition),
            4004 => Ok(ErrorCode::OrderAlreadyPaid),
            4005 => Ok(ErrorCode::ContactInfoMissing),
            4006 => Ok(ErrorCode::DeliveryAddressMissing),
            4007 => Ok(ErrorCode::MinimumOrderNotReached),
            4008 => Ok(ErrorCode::ProductUnavailable),

            // Payment
            5002 => Ok(ErrorCode::PaymentSessionFailed),
            5003 => Ok(ErrorCode::WebhookSignatureInvalid),

            // Menu
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductInvalidPrice),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6102 => Ok(ErrorCode::CategoryHasProducts),
            6103 => Ok(ErrorCode::CategoryNameExists),
            6201 => Ok(ErrorCode::ConfiguratorOptionNotFound),
            6202 => Ok(ErrorCode::TooManyCreations),
            6203 => Ok(ErrorCode::TooManyBases),
            6204 => Ok(ErrorCode::BoxRequired),
            6205 => Ok(ErrorCode::FreeDessertUnavailable),

            // Slot / Delivery
            7001 => Ok(ErrorCode::SlotUnavailable),
            7002 => Ok(ErrorCode::SlotBlocked),
            7003 => Ok(ErrorCode::ReservationNotFound),
            7004 => Ok(ErrorCode::ReservationExpired),
            7005 => Ok(ErrorCode::SpecialEventNotFound),
            7101 => Ok(ErrorCode::NotInDeliveryZone),
            7102 => Ok(ErrorCode::DeliveryZoneNotFound),
            7103 => Ok(ErrorCode::DeliveryZoneNameExists),

            // Promotion
            8001 => Ok(ErrorCode::PromotionNotFound),
            8002 => Ok(ErrorCode::PromoCodeInvalid),
            8003 => Ok(ErrorCode::PromoCodeExpired),
            8004 => Ok(ErrorCode::PromoCodeAlreadyUsed),
            8005 => Ok(ErrorCode::PromoCodeMinimumNotReached),
            8006 => Ok(ErrorCode::PromoCodeExists),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9006 => Ok(ErrorCode::NotificationFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::OrderingLocked.code(), 3003);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::WebhookSignatureInvalid.code(), 5003);
        assert_eq!(ErrorCode::CategoryHasProducts.code(), 6102);
        assert_eq!(ErrorCode::SlotUnavailable.code(), 7001);
        assert_eq!(ErrorCode::NotInDeliveryZone.code(), 7101);
        assert_eq!(ErrorCode::PromoCodeAlreadyUsed.code(), 8004);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
        assert!(!ErrorCode::SlotUnavailable.is_success());
    }

    #[test]
    fn test_try_from_roundtrip() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::TooManyAttempts,
            ErrorCode::CannotDeleteSelf,
            ErrorCode::RestaurantClosed,
            ErrorCode::ProductUnavailable,
            ErrorCode::ReservationExpired,
            ErrorCode::FreeDessertUnavailable,
            ErrorCode::DeliveryZoneNameExists,
            ErrorCode::PromoCodeExists,
            ErrorCode::NotificationFailed,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(9999), Err(InvalidErrorCode(9999)));
        assert_eq!(ErrorCode::try_from(3000), Err(InvalidErrorCode(3000)));
        assert_eq!(
            InvalidErrorCode(42).to_string(),
            "invalid error code: 42"
        );
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::SlotUnavailable).unwrap();
        assert_eq!(json, "7001");
        let code: ErrorCode = serde_json::from_str("8002").unwrap();
        assert_eq!(code, ErrorCode::PromoCodeInvalid);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::OrderNotFound), "4001");
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::SlotUnavailable.message(), "Time slot is full");
        assert_eq!(
            ErrorCode::NotInDeliveryZone.message(),
            "Postal code is not in a delivery zone"
        );
    }
}
