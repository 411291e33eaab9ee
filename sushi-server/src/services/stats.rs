//! Sales statistics and the order CSV export

use chrono::FixedOffset;
use shared::models::{DailyStats, Order, OrderType, PaymentStatus, PopularProduct, StatsQuery};

use crate::core::ServerState;
use crate::db::repository::{order, stats};
use crate::utils::time::{day_bounds, parse_date, to_local};
use crate::utils::{AppError, AppResult};

const DEFAULT_POPULAR_LIMIT: i64 = 10;
const MAX_POPULAR_LIMIT: i64 = 50;
const NOT_AVAILABLE: &str = "N/A";

/// `[from, to)` millis covering two inclusive local dates
pub fn window(from: &str, to: &str, tz: FixedOffset) -> AppResult<(i64, i64)> {
    let parse = |value: &str| parse_date(value).ok_or_else(|| AppError::validation(format!("Invalid date: {value}")));
    let (from_day, to_day) = (parse(from)?, parse(to)?);
    if to_day < from_day {
        return Err(AppError::validation("'to' must not be before 'from'"));
    }
    let start = day_bounds(from_day, tz).ok_or_else(|| AppError::validation("Date out of range"))?.0;
    let end = day_bounds(to_day, tz).ok_or_else(|| AppError::validation("Date out of range"))?.1;
    Ok((start, end))
}

pub async fn daily(state: &ServerState, query: &StatsQuery) -> AppResult<Vec<DailyStats>> {
    let tz = state.config.timezone();
    let (from, to) = window(&query.from, &query.to, tz)?;
    let offset_ms = i64::from(tz.local_minus_utc()) * 1000;
    Ok(stats::daily_stats(&state.pool, query.restaurant_id, from, to, offset_ms).await?)
}

pub async fn popular(state: &ServerState, query: &StatsQuery) -> AppResult<Vec<PopularProduct>> {
    let (from, to) = window(&query.from, &query.to, state.config.timezone())?;
    let limit = query.limit.unwrap_or(DEFAULT_POPULAR_LIMIT).clamp(1, MAX_POPULAR_LIMIT);
    Ok(stats::popular_products(&state.pool, query.restaurant_id, from, to, limit).await?)
}

fn order_type_label(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::Delivery => "Livraison",
        OrderType::Pickup => "Retrait",
        OrderType::DineIn => "Sur place",
    }
}

fn payment_status_label(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Paid => "Payé",
        PaymentStatus::Pending => "En attente",
        PaymentStatus::Failed => "Échec",
        PaymentStatus::Refunded => "Remboursé",
    }
}

fn format_datetime(millis: i64, tz: FixedOffset) -> String {
    to_local(millis, tz)
        .map(|dt| dt.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn or_na(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

const CSV_HEADER: [&str; 24] = [
    "ID Commande",
    "Date de création",
    "Date de livraison/retrait",
    "Nom du client",
    "Téléphone",
    "Email",
    "Type de commande",
    "Statut",
    "Statut de paiement",
    "Sous-total (€)",
    "Taxes (€)",
    "Frais de livraison (€)",
    "Pourboire (€)",
    "Remise (€)",
    "Code promo",
    "Total (€)",
    "Méthode de paiement",
    "Instructions de livraison",
    "Notes client",
    "Allergies",
    "Adresse de livraison",
    "Ville",
    "Code postal",
    "Articles commandés",
];

fn csv_row(order: &Order, tz: FixedOffset) -> Vec<String> {
    let items = order
        .items
        .iter()
        .map(|i| format!("{}x {} ({:.2}€)", i.quantity, i.name, i.price))
        .collect::<Vec<_>>()
        .join("; ");
    let allergies = if order.allergies.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        order.allergies.join(", ")
    };
    let payment_method = match order.payment_method {
        shared::models::PaymentMethod::Online => "En ligne",
        shared::models::PaymentMethod::OnSite => "Sur place",
    };

    vec![
        order.id.clone(),
        format_datetime(order.created_at, tz),
        format_datetime(order.scheduled_for, tz),
        order.client_name.clone(),
        order.client_phone.clone(),
        order.client_email.clone(),
        order_type_label(order.order_type).to_string(),
        order.status.label().to_string(),
        payment_status_label(order.payment_status).to_string(),
        format!("{:.2}", order.subtotal),
        format!("{:.2}", order.tax),
        format!("{:.2}", order.delivery_fee),
        format!("{:.2}", order.tip),
        format!("{:.2}", order.discount),
        or_na(order.promo_code.as_deref()),
        format!("{:.2}", order.total),
        payment_method.to_string(),
        or_na(order.delivery_instructions.as_deref()),
        or_na(order.customer_notes.as_deref()),
        allergies,
        or_na(order.delivery_street.as_deref()),
        or_na(order.delivery_city.as_deref()),
        or_na(order.delivery_postal_code.as_deref()),
        items,
    ]
}

/// Render orders as CSV (comma separated, quoted where needed)
pub fn render_csv(orders: &[Order], tz: FixedOffset) -> AppResult<String> {
    let csv_err = |e: csv::Error| AppError::internal(format!("CSV export failed: {e}"));

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(csv_err)?;
    for order in orders {
        writer.write_record(csv_row(order, tz)).map_err(csv_err)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::internal(format!("CSV export failed: {}", e.error())))?;
    String::from_utf8(bytes).map_err(|e| AppError::internal(format!("CSV export failed: {e}")))
}

/// Orders created between two inclusive local dates, as CSV
pub async fn export_orders_csv(state: &ServerState, restaurant_id: i64, from: &str, to: &str) -> AppResult<String> {
    let tz = state.config.timezone();
    let (start, end) = window(from, to, tz)?;

    let mut orders = order::find_created_between(&state.pool, restaurant_id, start, end).await?;
    for o in &mut orders {
        o.items = order::find_items(&state.pool, &o.id).await?;
    }
    tracing::info!(restaurant_id, count = orders.len(), "Orders exported");
    render_csv(&orders, tz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::templates::tests::sample_order;

    fn paris() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    #[test]
    fn window_covers_both_days() {
        let (from, to) = window("2026-03-02", "2026-03-03", paris()).unwrap();
        assert_eq!(to - from, 2 * 24 * 3600 * 1000);
        assert!(window("2026-03-03", "2026-03-02", paris()).is_err());
        assert!(window("03/02/2026", "2026-03-02", paris()).is_err());
    }

    #[test]
    fn csv_quotes_fields_and_fills_missing_values() {
        let mut order = sample_order();
        order.customer_notes = Some("Sonner, puis \"attendre\"".into());
        order.promo_code = None;

        let csv = render_csv(&[order], paris()).unwrap();
        let mut lines = csv.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("ID Commande,Date de création"));
        assert!(header.ends_with("Articles commandés"));

        let row = lines.next().unwrap();
        assert!(row.contains("\"Sonner, puis \"\"attendre\"\"\""));
        assert!(row.contains(",N/A,"));
    }

    #[test]
    fn labels_are_french() {
        assert_eq!(order_type_label(OrderType::DineIn), "Sur place");
        assert_eq!(payment_status_label(PaymentStatus::Failed), "Échec");
    }
}
