//! Payment sessions and the provider webhook

use shared::models::{Order, OrderStatus, PaymentSession, PaymentStatus, PaymentWebhookEvent};
use shared::util::order_reference;

use crate::core::ServerState;
use crate::db::repository::payment as payments;
use crate::payment::{self, RelaySessionRequest};
use crate::services::orders;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Open a payment session for an unpaid order
///
/// With a relay configured the session comes from the provider; otherwise a
/// local session id is issued and the order is settled by the webhook alone.
pub async fn create_session(state: &ServerState, order_id: &str) -> AppResult<PaymentSession> {
    let order = orders::get(&state.pool, order_id).await?;
    if order.payment_status == PaymentStatus::Paid {
        return Err(AppError::new(ErrorCode::OrderAlreadyPaid));
    }
    if order.status == OrderStatus::Cancelled {
        return Err(AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            "Order is cancelled",
        ));
    }

    let (session_id, checkout_url) = match state.config.payment_relay_url.as_deref() {
        Some(url) => {
            let request = RelaySessionRequest {
                order_id: &order.id,
                reference: order_reference(&order.id),
                amount: payment::to_cents(order.total),
                currency: "eur",
                customer_email: &order.client_email,
            };
            let session = payment::create_relay_session(&state.http, url, &request)
                .await
                .map_err(|e| {
                    tracing::error!(order_id = %order.id, error = %e, "Payment relay session failed");
                    AppError::new(ErrorCode::PaymentSessionFailed)
                })?;
            (session.id, session.url)
        }
        None => (payment::local_session_id(), None),
    };

    let record = payments::create(
        &state.pool,
        &order.id,
        order.total,
        Some(&session_id),
        checkout_url.as_deref(),
    )
    .await?;

    tracing::info!(
        order_id = %order.id,
        payment_id = record.id,
        amount = record.amount,
        "Payment session created"
    );
    Ok(PaymentSession {
        payment_id: record.id,
        order_id: order.id,
        amount: record.amount,
        session_id,
        checkout_url,
    })
}

/// Verify and apply a provider webhook
///
/// Returns the updated order, or `None` for event types that are ignored.
pub async fn handle_webhook(
    state: &ServerState,
    body: &[u8],
    signature: Option<&str>,
) -> AppResult<Option<Order>> {
    let now_secs = shared::util::now_millis() / 1000;
    let verified = match signature {
        Some(header) => {
            payment::verify_webhook_signature(body, header, &state.config.payment_webhook_secret, now_secs)
        }
        None => Err("Missing signature header"),
    };
    if let Err(reason) = verified {
        security_log!("WARN", "payment_webhook_rejected", reason = reason);
        return Err(AppError::new(ErrorCode::WebhookSignatureInvalid));
    }

    let event: PaymentWebhookEvent = serde_json::from_slice(body)
        .map_err(|e| AppError::invalid_request(format!("Invalid webhook body: {e}")))?;

    match event.event_type.as_str() {
        payment::EVENT_SUCCEEDED => {
            payments::settle_pending(&state.pool, &event.order_id, PaymentStatus::Paid).await?;
            let mut order = orders::update_payment(state, &event.order_id, PaymentStatus::Paid).await?;
            if order.status == OrderStatus::Pending {
                order = orders::update_status(state, &event.order_id, OrderStatus::Confirmed).await?;
            }
            Ok(Some(order))
        }
        payment::EVENT_FAILED => {
            payments::settle_pending(&state.pool, &event.order_id, PaymentStatus::Failed).await?;
            let order = orders::update_payment(state, &event.order_id, PaymentStatus::Failed).await?;
            Ok(Some(order))
        }
        other => {
            tracing::debug!(event_type = other, "Ignoring payment webhook event");
            Ok(None)
        }
    }
}
