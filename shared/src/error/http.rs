//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::RestaurantNotFound
            | Self::ClosureNotFound
            | Self::OrderNotFound
            | Self::ProductNotFound
            | Self::CategoryNotFound
            | Self::ConfiguratorOptionNotFound
            | Self::ReservationNotFound
            | Self::SpecialEventNotFound
            | Self::DeliveryZoneNotFound
            | Self::PromotionNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::OrderAlreadyPaid
            | Self::InvalidStatusTransition
            | Self::CategoryHasProducts
            | Self::CategoryNameExists
            | Self::SlotUnavailable
            | Self::DeliveryZoneNameExists
            | Self::PromoCodeExists => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled
            | Self::WebhookSignatureInvalid => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied | Self::AdminRequired | Self::CannotDeleteSelf => {
                StatusCode::FORBIDDEN
            }

            // 429 Too Many Requests
            Self::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,

            // 410 Gone
            Self::ReservationExpired => StatusCode::GONE,

            // 502 Bad Gateway (upstream relay failures)
            Self::PaymentSessionFailed | Self::NotificationFailed => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            Self::Unknown | Self::InternalError | Self::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_family() {
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::OrderNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::DeliveryZoneNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_full_slot_is_conflict() {
        assert_eq!(ErrorCode::SlotUnavailable.http_status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_blocked_slot_and_locks_are_bad_request() {
        assert_eq!(ErrorCode::SlotBlocked.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::OrderingLocked.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::NotInDeliveryZone.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::PromoCodeExpired.http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_auth_statuses() {
        assert_eq!(
            ErrorCode::InvalidCredentials.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::PermissionDenied.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorCode::TooManyAttempts.http_status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_system_errors() {
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ErrorCode::ReservationExpired.http_status(), StatusCode::GONE);
        assert_eq!(
            ErrorCode::PaymentSessionFailed.http_status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
