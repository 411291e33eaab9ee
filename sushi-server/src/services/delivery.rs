//! Delivery eligibility

use shared::models::DeliveryEligibility;
use sqlx::SqlitePool;

use crate::db::repository::delivery;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Eligibility of a postal code for a restaurant
///
/// An active delivery location makes the code eligible; the fee and minimum
/// then come from the zone listing it, if any. Without a location, an
/// available zone listing the code is enough.
pub async fn check_eligibility(
    pool: &SqlitePool,
    restaurant_id: i64,
    postal_code: &str,
) -> AppResult<DeliveryEligibility> {
    let postal_code = postal_code.trim();
    if postal_code.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "postal_code is required",
        ));
    }

    let location = delivery::find_active_location(pool, restaurant_id, postal_code).await?;
    let zone = delivery::find_zone_for_postal_code(pool, restaurant_id, postal_code).await?;

    if location.is_none() && zone.is_none() {
        tracing::debug!(restaurant_id, postal_code, "Postal code outside delivery area");
        return Err(AppError::with_message(
            ErrorCode::NotInDeliveryZone,
            format!("Nous ne livrons pas encore le code postal {postal_code}"),
        )
        .with_detail("postal_code", postal_code));
    }

    Ok(DeliveryEligibility {
        eligible: true,
        postal_code: postal_code.to_string(),
        zone_id: zone.as_ref().map(|z| z.id),
        zone_name: zone.as_ref().map(|z| z.name.clone()),
        city: location.map(|l| l.city),
        delivery_fee: zone.as_ref().map(|z| z.delivery_fee).unwrap_or(0.0),
        min_order: zone.as_ref().map(|z| z.min_order).unwrap_or(0.0),
    })
}
