//! Checkout pricing and the order lifecycle
//!
//! Prices are always resolved server-side: menu products from the database,
//! configurator creations from their option ids. The client only sends ids
//! and quantities.

use std::collections::HashMap;

use shared::models::{
    CartItem, DeliveryEligibility, NotificationDraft, Order, OrderCreate, OrderItem, OrderItemInput,
    OrderListQuery, OrderPage, OrderQuote, OrderStatus, OrderType, PaymentStatus, Product, PromoCode,
    QuotedItem, Restaurant,
};
use shared::util::{new_order_id, now_millis, snowflake_id};
use sqlx::SqlitePool;

use crate::cart::{self, Cart};
use crate::core::ServerState;
use crate::db::repository::order::OrderFilter;
use crate::db::repository::{RepoResult, notification, order, product, promo_code, promotion, time_slot};
use crate::notify::templates;
use crate::pricing::{self, CheckoutInput, code_discount};
use crate::services::{configurator, delivery, promo, restaurant as restaurants, slots};
use crate::utils::time::{day_bounds, local_hhmm, minute_start, parse_date, to_local};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, validate_amount, validate_email, validate_optional_text,
    validate_phone, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

const DEFAULT_PER_PAGE: i64 = 20;
const MAX_PER_PAGE: i64 = 100;
const MAX_DELAY_MINUTES: i64 = 240;

/// A fully priced checkout
#[derive(Debug, Clone)]
struct PricedCheckout {
    quote: OrderQuote,
    /// Valid promo code, only when the checkout is strict
    promo: Option<PromoCode>,
}

fn ensure_quantity(quantity: i64) -> AppResult<()> {
    if quantity <= 0 {
        return Err(AppError::with_message(ErrorCode::ValueOutOfRange, "Quantity must be positive"));
    }
    Ok(())
}

async fn load_products(
    pool: &SqlitePool,
    restaurant_id: i64,
    items: &[OrderItemInput],
) -> AppResult<HashMap<i64, Product>> {
    let ids: Vec<i64> = items
        .iter()
        .filter_map(|item| match item {
            OrderItemInput::Product { product_id, .. } => Some(*product_id),
            _ => None,
        })
        .collect();
    let products = product::find_by_ids(pool, restaurant_id, &ids).await?;
    Ok(products.into_iter().map(|p| (p.id, p)).collect())
}

/// Replay the menu lines through the cart engine so the free dessert rule
/// holds at checkout too
fn check_free_desserts(lines: &[QuotedItem]) -> AppResult<()> {
    let mut items: Vec<CartItem> = lines
        .iter()
        .filter_map(|line| {
            Some(CartItem {
                product_id: line.product_id?,
                name: line.name.clone(),
                price: line.unit_price,
                quantity: line.quantity,
                category: line.category.clone()?,
                special_instructions: None,
            })
        })
        .collect();
    // Plateaux first, so desserts see every unlocked slot
    items.sort_by_key(cart::is_free_dessert);

    let mut cart = Cart::new(false);
    for item in items {
        cart.add(item)?;
    }
    Ok(())
}

/// Priced lines of a checkout, automatic promotions applied
async fn price_items(state: &ServerState, req: &OrderCreate, now: i64) -> AppResult<Vec<QuotedItem>> {
    let products = load_products(&state.pool, req.restaurant_id, &req.items).await?;
    let promotions = promotion::find_enabled(&state.pool).await?;
    let local_now = to_local(now, state.config.timezone()).ok_or_else(|| AppError::internal("Clock out of range"))?;
    let active = pricing::active_promotions(&promotions, Some(req.restaurant_id), &local_now);

    let mut lines = Vec::with_capacity(req.items.len());
    for input in &req.items {
        let line = match input {
            OrderItemInput::Product {
                product_id,
                quantity,
                special_instructions,
            } => {
                ensure_quantity(*quantity)?;
                let product = products.get(product_id).ok_or_else(|| {
                    AppError::with_message(
                        ErrorCode::ProductUnavailable,
                        format!("Product {product_id} is not available"),
                    )
                    .with_detail("product_id", *product_id)
                })?;
                let promotion = pricing::promotion_for_product(&active, product.id, &product.category);
                let unit_discount = promotion
                    .map(|p| pricing::round2(pricing::discount_amount(product.price, p)))
                    .unwrap_or(0.0);
                QuotedItem {
                    product_id: Some(product.id),
                    name: product.name.clone(),
                    category: Some(product.category.clone()),
                    quantity: *quantity,
                    unit_price: product.price,
                    unit_discount,
                    line_total: pricing::line_total(product.price, unit_discount, *quantity),
                    promotion: promotion.map(|p| p.title.clone()),
                    special_instructions: special_instructions.clone(),
                }
            }
            OrderItemInput::Sushi {
                request,
                quantity,
                special_instructions,
            } => {
                ensure_quantity(*quantity)?;
                let (box_option, creations) = configurator::resolve_sushi(&state.pool, request).await?;
                let quote = pricing::sushi_quote(Some(&box_option), &creations)?;
                QuotedItem {
                    product_id: None,
                    name: format!("{} ({})", box_option.name, configurator::describe_sushi(&creations)),
                    category: None,
                    quantity: *quantity,
                    unit_price: quote.total,
                    unit_discount: 0.0,
                    line_total: pricing::line_total(quote.total, 0.0, *quantity),
                    promotion: None,
                    special_instructions: special_instructions.clone(),
                }
            }
            OrderItemInput::Poke {
                request,
                quantity,
                special_instructions,
            } => {
                ensure_quantity(*quantity)?;
                let creation =
                    configurator::resolve_poke(&state.pool, request, state.config.poke_base_price).await?;
                let quote = pricing::poke_quote(&creation);
                QuotedItem {
                    product_id: None,
                    name: format!("Poke bowl ({})", configurator::describe_poke(&creation)),
                    category: None,
                    quantity: *quantity,
                    unit_price: quote.total,
                    unit_discount: 0.0,
                    line_total: pricing::line_total(quote.total, 0.0, *quantity),
                    promotion: None,
                    special_instructions: special_instructions.clone(),
                }
            }
        };
        lines.push(line);
    }

    check_free_desserts(&lines)?;
    Ok(lines)
}

/// Amount a promo code applies to: the whole subtotal, or only the lines of
/// its categories
fn promo_base(lines: &[QuotedItem], categories: &[String], subtotal: f64) -> f64 {
    if categories.is_empty() {
        return subtotal;
    }
    pricing::sum_lines(
        lines
            .iter()
            .filter(|l| l.category.as_ref().is_some_and(|c| categories.contains(c)))
            .map(|l| l.line_total),
    )
}

/// Price a checkout
///
/// A strict checkout (order creation) fails on an invalid promo code; a
/// quote reports the rejection in `promo_message` and applies no discount.
async fn price_checkout(
    state: &ServerState,
    req: &OrderCreate,
    eligibility: Option<&DeliveryEligibility>,
    strict: bool,
    now: i64,
) -> AppResult<PricedCheckout> {
    validate_amount(req.tip, "tip")?;

    let lines = price_items(state, req, now).await?;
    let subtotal = pricing::sum_lines(lines.iter().map(|l| l.line_total));
    let delivery_fee = match req.order_type {
        OrderType::Delivery => eligibility.map(|e| e.delivery_fee).unwrap_or(0.0),
        _ => 0.0,
    };

    let mut discount = 0.0;
    let mut promo_code = None;
    let mut promo_message = None;
    let mut accepted = None;

    if let Some(code) = req.promo_code.as_deref().filter(|c| !c.trim().is_empty()) {
        let email = Some(req.client_email.as_str());
        let check = promo::validate(&state.pool, code, subtotal, email, req.restaurant_id, now).await?;
        promo_message = Some(check.validation.message.clone());

        if let Some(valid) = check.code.as_ref().filter(|_| check.validation.valid) {
            // Category-scoped codes only discount the matching lines
            let base = promo_base(&lines, &valid.applicable_categories, subtotal);
            discount = code_discount(base, valid.discount, valid.is_percentage);
            promo_code = Some(valid.code.clone());
            accepted = check.code;
        } else if strict {
            check.into_result()?;
        }
    }

    let totals = pricing::compute_totals(
        CheckoutInput {
            subtotal,
            delivery_fee,
            tip: req.tip,
            discount,
        },
        state.config.tax_rate,
        state.config.tax_mode,
    );

    Ok(PricedCheckout {
        quote: OrderQuote {
            items: lines,
            subtotal: totals.subtotal,
            tax: totals.tax,
            tax_label: pricing::tax_label(state.config.tax_rate, state.config.tax_mode),
            delivery_fee: totals.delivery_fee,
            tip: totals.tip,
            discount: totals.discount,
            total: totals.total,
            promo_code,
            promo_message,
        },
        promo: accepted,
    })
}

/// Price a checkout without persisting anything
pub async fn quote(state: &ServerState, req: &OrderCreate) -> AppResult<OrderQuote> {
    restaurants::load_active(&state.pool, req.restaurant_id).await?;
    if req.items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }

    let eligibility = match (&req.order_type, &req.delivery_address) {
        (OrderType::Delivery, Some(address)) if !address.postal_code.trim().is_empty() => {
            Some(delivery::check_eligibility(&state.pool, req.restaurant_id, &address.postal_code).await?)
        }
        _ => None,
    };

    let priced = price_checkout(state, req, eligibility.as_ref(), false, now_millis()).await?;
    Ok(priced.quote)
}

fn check_ordering_allowed(restaurant: &Restaurant, order_type: OrderType) -> AppResult<()> {
    if restaurant.settings.ordering_locked {
        return Err(AppError::new(ErrorCode::OrderingLocked));
    }
    match order_type {
        OrderType::Delivery if restaurant.settings.delivery_blocked => Err(AppError::new(ErrorCode::DeliveryBlocked)),
        OrderType::Pickup if restaurant.settings.pickup_blocked => Err(AppError::new(ErrorCode::PickupBlocked)),
        _ => Ok(()),
    }
}

fn check_contact(req: &OrderCreate) -> AppResult<()> {
    let missing: Vec<&str> = [
        ("client_name", &req.client_name),
        ("client_email", &req.client_email),
        ("client_phone", &req.client_phone),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
    .collect();
    if !missing.is_empty() {
        return Err(AppError::new(ErrorCode::ContactInfoMissing).with_detail("fields", missing));
    }

    validate_required_text(&req.client_name, "client_name", MAX_NAME_LEN)?;
    validate_email(req.client_email.trim())?;
    validate_phone(req.client_phone.trim())?;
    validate_optional_text(&req.customer_notes, "customer_notes", MAX_NOTE_LEN)?;
    Ok(())
}

/// Address and eligibility of a delivery order
async fn check_delivery(state: &ServerState, req: &OrderCreate) -> AppResult<Option<DeliveryEligibility>> {
    if req.order_type != OrderType::Delivery {
        return Ok(None);
    }
    let address = req
        .delivery_address
        .as_ref()
        .filter(|a| {
            !a.street.trim().is_empty() && !a.city.trim().is_empty() && !a.postal_code.trim().is_empty()
        })
        .ok_or_else(|| AppError::new(ErrorCode::DeliveryAddressMissing))?;
    validate_required_text(&address.street, "delivery_address.street", MAX_ADDRESS_LEN)?;
    validate_optional_text(&address.instructions, "delivery_address.instructions", MAX_NOTE_LEN)?;

    let eligibility = delivery::check_eligibility(&state.pool, req.restaurant_id, &address.postal_code).await?;
    Ok(Some(eligibility))
}

fn build_order(req: &OrderCreate, quote: &OrderQuote, scheduled_for: i64, tz: chrono::FixedOffset, now: i64) -> Order {
    let id = new_order_id();
    let items = quote
        .items
        .iter()
        .map(|line| OrderItem {
            id: snowflake_id(),
            order_id: id.clone(),
            product_id: line.product_id,
            name: line.name.clone(),
            quantity: line.quantity,
            price: pricing::line_total(line.unit_price, line.unit_discount, 1),
            special_instructions: line.special_instructions.clone(),
        })
        .collect();
    let address = req.delivery_address.as_ref().filter(|_| req.order_type == OrderType::Delivery);

    Order {
        id,
        restaurant_id: req.restaurant_id,
        user_id: req.user_id.clone(),
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Pending,
        payment_method: req.payment_method,
        order_type: req.order_type,
        subtotal: quote.subtotal,
        tax: quote.tax,
        delivery_fee: quote.delivery_fee,
        tip: quote.tip,
        discount: quote.discount,
        total: quote.total,
        promo_code: quote.promo_code.clone(),
        scheduled_for,
        client_name: req.client_name.trim().to_string(),
        client_email: req.client_email.trim().to_lowercase(),
        client_phone: req.client_phone.trim().to_string(),
        delivery_street: address.map(|a| a.street.trim().to_string()),
        delivery_city: address.map(|a| a.city.trim().to_string()),
        delivery_postal_code: address.map(|a| a.postal_code.trim().to_string()),
        delivery_instructions: address.and_then(|a| a.instructions.clone()),
        customer_notes: req.customer_notes.clone(),
        allergies: req.allergies.clone(),
        contact_preference: req.contact_preference.clone(),
        pickup_time: (req.order_type == OrderType::Pickup).then(|| local_hhmm(scheduled_for, tz)),
        items,
        created_at: now,
        updated_at: now,
    }
}

enum Persisted {
    Stored,
    HoldLost,
    PromoAlreadyUsed,
}

/// Order, hold binding, promo usage and confirmation in one transaction
async fn persist(
    pool: &SqlitePool,
    order: &Order,
    hold_id: Option<i64>,
    one_time_code: Option<&str>,
    drafts: &[NotificationDraft],
) -> RepoResult<Persisted> {
    let mut tx = pool.begin().await?;

    order::insert(&mut *tx, order).await?;

    if let Some(id) = hold_id
        && !time_slot::bind_reservation(&mut *tx, id, &order.id).await?
    {
        return Ok(Persisted::HoldLost);
    }

    if let Some(code) = one_time_code
        && !promo_code::record_usage(&mut *tx, code, &order.client_email).await?
    {
        return Ok(Persisted::PromoAlreadyUsed);
    }

    for draft in drafts {
        notification::enqueue(&mut *tx, draft).await?;
    }

    tx.commit().await?;
    Ok(Persisted::Stored)
}

/// Validate, price and persist a new order
pub async fn create(state: &ServerState, req: OrderCreate) -> AppResult<Order> {
    let now = now_millis();
    let tz = state.config.timezone();

    let restaurant = restaurants::load_active(&state.pool, req.restaurant_id).await?;
    check_ordering_allowed(&restaurant, req.order_type)?;
    if req.items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    check_contact(&req)?;
    let eligibility = check_delivery(state, &req).await?;

    let priced = price_checkout(state, &req, eligibility.as_ref(), true, now).await?;
    if let Some(zone) = &eligibility
        && priced.quote.subtotal < zone.min_order
    {
        return Err(AppError::with_message(
            ErrorCode::MinimumOrderNotReached,
            format!("Minimum de commande de {:.2} € pour la livraison", zone.min_order),
        )
        .with_detail("min_order", zone.min_order)
        .with_detail("subtotal", priced.quote.subtotal));
    }

    let scheduled_for = req.scheduled_for.timestamp_millis();
    if scheduled_for < minute_start(now) {
        return Err(AppError::validation("scheduled_for is in the past"));
    }
    let open = restaurants::open_status_at(state, req.restaurant_id, scheduled_for).await?;
    if !open.is_open {
        let message = open.reason.unwrap_or_else(|| "Restaurant fermé à cet horaire".to_string());
        return Err(AppError::with_message(ErrorCode::RestaurantClosed, message));
    }

    let target = slots::SlotTarget::new(req.restaurant_id, req.order_type, scheduled_for, tz)?;
    let (hold_id, newly_taken) = slots::secure_for_order(state, &target, req.reservation_id).await?;

    let order = build_order(&req, &priced.quote, target.slot_start, tz, now);
    let drafts = templates::confirmation_drafts(&order);
    let one_time_code = priced
        .promo
        .as_ref()
        .filter(|p| p.is_one_time_use)
        .map(|p| p.code.as_str());

    let outcome = persist(&state.pool, &order, hold_id, one_time_code, &drafts).await;
    let failure = match outcome {
        Ok(Persisted::Stored) => None,
        Ok(Persisted::HoldLost) => Some(AppError::new(ErrorCode::ReservationNotFound)),
        Ok(Persisted::PromoAlreadyUsed) => Some(AppError::with_message(
            ErrorCode::PromoCodeAlreadyUsed,
            promo::MSG_ALREADY_USED,
        )),
        Err(e) => Some(e.into()),
    };
    if let Some(err) = failure {
        if newly_taken && let Some(id) = hold_id {
            if let Err(e) = time_slot::release(&state.pool, id).await {
                tracing::warn!(reservation_id = id, error = %e, "Failed to release slot hold");
            }
        }
        return Err(err);
    }

    tracing::info!(
        order_id = %order.id,
        restaurant_id = order.restaurant_id,
        order_type = %order.order_type,
        total = order.total,
        "Order created"
    );
    state.broadcast_sync("order", "created", &order.id, Some(&order));
    Ok(order)
}

pub async fn get(pool: &SqlitePool, id: &str) -> AppResult<Order> {
    order::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found")))
}

/// Admin order list, one page at a time
pub async fn list(state: &ServerState, query: &OrderListQuery) -> AppResult<OrderPage> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);

    let window = match query.date.as_deref() {
        Some(date) => {
            let day = parse_date(date).ok_or_else(|| AppError::validation(format!("Invalid date: {date}")))?;
            Some(day_bounds(day, state.config.timezone()).ok_or_else(|| AppError::validation("Date out of range"))?)
        }
        None => None,
    };

    let filter = OrderFilter {
        restaurant_id: query.restaurant_id,
        status: query.status,
        window,
        limit: per_page,
        offset: (page - 1) * per_page,
    };
    let (orders, total) = order::list(&state.pool, &filter).await?;
    Ok(OrderPage {
        orders,
        total,
        page,
        per_page,
    })
}

/// Whether `from -> to` is allowed
///
/// Terminal states are final; any other state may move anywhere, which
/// covers cancelling from any open state.
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    !from.is_terminal() && from != to
}

async fn enqueue_all(pool: &SqlitePool, drafts: &[NotificationDraft]) -> AppResult<Vec<i64>> {
    let mut ids = Vec::with_capacity(drafts.len());
    for draft in drafts {
        ids.push(notification::enqueue(pool, draft).await?);
    }
    Ok(ids)
}

pub async fn update_status(state: &ServerState, id: &str, status: OrderStatus) -> AppResult<Order> {
    let current = get(&state.pool, id).await?;
    if !can_transition(current.status, status) {
        return Err(AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            format!("Cannot change order status from {} to {}", current.status, status),
        )
        .with_detail("from", current.status.as_str())
        .with_detail("to", status.as_str()));
    }

    order::update_status(&state.pool, id, status, now_millis()).await?;
    let updated = get(&state.pool, id).await?;

    let queued = enqueue_all(&state.pool, &templates::status_drafts(&updated, status)).await?;
    tracing::info!(
        order_id = %id,
        from = %current.status,
        to = %status,
        notifications = queued.len(),
        "Order status changed"
    );
    state.broadcast_sync("order", "updated", id, Some(&updated));
    Ok(updated)
}

pub async fn update_payment(state: &ServerState, id: &str, payment_status: PaymentStatus) -> AppResult<Order> {
    let current = get(&state.pool, id).await?;
    if current.payment_status == payment_status {
        return Ok(current);
    }
    order::update_payment_status(&state.pool, id, payment_status, now_millis()).await?;
    let updated = get(&state.pool, id).await?;

    tracing::info!(
        order_id = %id,
        from = current.payment_status.as_str(),
        to = payment_status.as_str(),
        "Order payment status changed"
    );
    state.broadcast_sync("order", "updated", id, Some(&updated));
    Ok(updated)
}

/// Queue a delay notice for the customer; returns the queued notification ids
pub async fn notify_delay(
    state: &ServerState,
    id: &str,
    delay_minutes: i64,
    reason: Option<&str>,
) -> AppResult<Vec<i64>> {
    if !(1..=MAX_DELAY_MINUTES).contains(&delay_minutes) {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("delay_minutes must be between 1 and {MAX_DELAY_MINUTES}"),
        ));
    }
    let reason = reason.map(str::trim).filter(|r| !r.is_empty());
    let current = get(&state.pool, id).await?;

    let drafts = templates::delay_drafts(&current, delay_minutes, reason);
    if drafts.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::NotificationFailed,
            "Order has no reachable contact",
        ));
    }
    let ids = enqueue_all(&state.pool, &drafts).await?;
    tracing::info!(order_id = %id, delay_minutes, notifications = ids.len(), "Delay notice queued");
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(category: Option<&str>, total: f64) -> QuotedItem {
        QuotedItem {
            product_id: Some(1),
            name: "x".into(),
            category: category.map(String::from),
            quantity: 1,
            unit_price: total,
            unit_discount: 0.0,
            line_total: total,
            promotion: None,
            special_instructions: None,
        }
    }

    #[test]
    fn terminal_states_are_final() {
        assert!(!can_transition(OrderStatus::Cancelled, OrderStatus::Pending));
        assert!(!can_transition(OrderStatus::Completed, OrderStatus::Cancelled));
        assert!(can_transition(OrderStatus::Preparing, OrderStatus::Cancelled));
        assert!(can_transition(OrderStatus::Pending, OrderStatus::Confirmed));
        assert!(!can_transition(OrderStatus::Ready, OrderStatus::Ready));
    }

    #[test]
    fn promo_base_scopes_to_categories() {
        let lines = vec![line(Some("plateaux"), 20.0), line(Some("boissons"), 3.5), line(None, 15.9)];
        assert_eq!(promo_base(&lines, &[], 39.4), 39.4);
        assert_eq!(promo_base(&lines, &["plateaux".to_string()], 39.4), 20.0);
        assert_eq!(promo_base(&lines, &["desserts".to_string()], 39.4), 0.0);
    }

    #[test]
    fn free_dessert_needs_a_plateau_on_the_order() {
        let mut dessert = line(Some("desserts"), 0.0);
        dessert.product_id = Some(9);
        let err = check_free_desserts(std::slice::from_ref(&dessert)).unwrap_err();
        assert_eq!(err.code, ErrorCode::FreeDessertUnavailable);

        // Order of submission does not matter
        let mut plateau = line(Some("plateaux"), 25.0);
        plateau.product_id = Some(3);
        assert!(check_free_desserts(&[dessert, plateau]).is_ok());
    }
}
