//! Promo code validation

use shared::models::{PromoCode, PromoValidation};
use shared::util::normalize_code;
use sqlx::SqlitePool;

use crate::db::repository::promo_code;
use crate::pricing::code_discount;
use crate::utils::{AppError, AppResult, ErrorCode};

pub const MSG_INVALID: &str = "Code promo invalide";
pub const MSG_EXPIRED: &str = "Code promo expiré";
pub const MSG_ALREADY_USED: &str = "Code déjà utilisé";
pub const MSG_WRONG_RESTAURANT: &str = "Code promo non valable dans ce restaurant";

/// Outcome of a code check: the storefront answer, and the code itself when
/// it is valid
#[derive(Debug, Clone)]
pub struct PromoCheck {
    pub validation: PromoValidation,
    pub code: Option<PromoCode>,
    pub rejection: Option<ErrorCode>,
}

impl PromoCheck {
    fn rejected(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            validation: PromoValidation {
                valid: false,
                discount: 0.0,
                is_percentage: false,
                discount_amount: 0.0,
                message: message.into(),
            },
            code: None,
            rejection: Some(code),
        }
    }

    /// Turn a rejected check into the matching error
    pub fn into_result(self) -> AppResult<PromoCode> {
        match (self.code, self.rejection) {
            (Some(code), None) => Ok(code),
            (_, rejection) => Err(AppError::with_message(
                rejection.unwrap_or(ErrorCode::PromoCodeInvalid),
                self.validation.message,
            )),
        }
    }
}

fn success_message(code: &PromoCode) -> String {
    if code.is_percentage {
        format!("Code promo appliqué : -{}%", code.discount)
    } else {
        format!("Code promo appliqué : -{:.2} €", code.discount)
    }
}

/// Check a code against its rules, without recording a usage
///
/// `subtotal` is the amount the discount applies to.
pub async fn validate(
    pool: &SqlitePool,
    code: &str,
    subtotal: f64,
    email: Option<&str>,
    restaurant_id: i64,
    now: i64,
) -> AppResult<PromoCheck> {
    let normalized = normalize_code(code);
    if normalized.is_empty() {
        return Ok(PromoCheck::rejected(ErrorCode::PromoCodeInvalid, MSG_INVALID));
    }

    let Some(promo) = promo_code::find_by_code(pool, &normalized).await? else {
        return Ok(PromoCheck::rejected(ErrorCode::PromoCodeInvalid, MSG_INVALID));
    };
    if !promo.is_active {
        return Ok(PromoCheck::rejected(ErrorCode::PromoCodeInvalid, MSG_INVALID));
    }

    let started = promo.start_date.is_none_or(|start| now >= start);
    let not_ended = promo.end_date.is_none_or(|end| now <= end);
    if !started || !not_ended {
        return Ok(PromoCheck::rejected(ErrorCode::PromoCodeExpired, MSG_EXPIRED));
    }

    if promo.restaurant_id.is_some_and(|id| id != restaurant_id) {
        return Ok(PromoCheck::rejected(ErrorCode::PromoCodeInvalid, MSG_WRONG_RESTAURANT));
    }

    if let Some(min) = promo.min_order
        && subtotal < min
    {
        return Ok(PromoCheck::rejected(
            ErrorCode::PromoCodeMinimumNotReached,
            format!("Montant minimum de {min:.2} € requis pour ce code"),
        ));
    }

    if promo.is_one_time_use
        && let Some(email) = email.map(str::trim).filter(|e| !e.is_empty())
        && promo_code::has_used(pool, &normalized, email).await?
    {
        return Ok(PromoCheck::rejected(ErrorCode::PromoCodeAlreadyUsed, MSG_ALREADY_USED));
    }

    Ok(PromoCheck {
        validation: PromoValidation {
            valid: true,
            discount: promo.discount,
            is_percentage: promo.is_percentage,
            discount_amount: code_discount(subtotal, promo.discount, promo.is_percentage),
            message: success_message(&promo),
        },
        code: Some(promo),
        rejection: None,
    })
}
