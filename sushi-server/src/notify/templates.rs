//! Customer message templates (fr)

use shared::models::{NotificationChannel, NotificationDraft, Order, OrderStatus, OrderType};
use shared::util::order_reference;

pub const BRAND: &str = "SushiEats";

pub fn status_subject(order: &Order, status: OrderStatus) -> String {
    format!(
        "{BRAND} - Commande #{} : {}",
        order_reference(&order.id),
        status.label()
    )
}

pub fn delay_subject(order: &Order) -> String {
    format!("{BRAND} - Retard commande #{}", order_reference(&order.id))
}

pub fn confirmation_subject(order: &Order) -> String {
    format!(
        "{BRAND} - Confirmation de commande #{}",
        order_reference(&order.id)
    )
}

fn greeting(order: &Order) -> String {
    let name = order.client_name.trim();
    if name.is_empty() {
        "Bonjour cher client,".to_string()
    } else {
        format!("Bonjour {name},")
    }
}

/// One sentence describing what the new status means for the customer
fn status_detail(status: OrderStatus) -> Option<&'static str> {
    match status {
        OrderStatus::Confirmed => {
            Some("Nous avons bien reçu votre commande et nous commençons à la préparer.")
        }
        OrderStatus::Preparing => Some("Votre commande est actuellement en préparation par notre équipe."),
        OrderStatus::Ready => Some("Votre commande est prête à être retirée dans notre restaurant."),
        OrderStatus::OutForDelivery => Some("Votre commande est en route vers l'adresse indiquée."),
        OrderStatus::Delivered => Some("Votre commande a été livrée. Bon appétit !"),
        OrderStatus::Completed => {
            Some("Nous espérons que vous avez apprécié votre repas. À bientôt !")
        }
        OrderStatus::Cancelled => Some("Votre commande a été annulée. Contactez-nous pour toute question."),
        OrderStatus::Pending => None,
    }
}

pub fn status_content(order: &Order, status: OrderStatus) -> String {
    let mut lines = vec![
        greeting(order),
        format!(
            "Votre commande #{} est maintenant : {}.",
            order_reference(&order.id),
            status.label()
        ),
    ];
    if let Some(detail) = status_detail(status) {
        lines.push(detail.to_string());
    }
    lines.push(format!("Merci d'avoir choisi {BRAND}."));
    lines.join("\n")
}

pub fn delay_content(order: &Order, delay_minutes: i64, reason: Option<&str>) -> String {
    let what = match order.order_type {
        OrderType::Delivery => "La livraison",
        _ => "Le retrait",
    };
    let mut lines = vec![
        greeting(order),
        format!(
            "Votre commande #{} subira un retard d'environ {delay_minutes} minutes.",
            order_reference(&order.id)
        ),
    ];
    if let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) {
        lines.push(format!("Raison du retard : {reason}"));
    }
    lines.push(format!(
        "{what} de votre commande est désormais prévu avec un délai supplémentaire."
    ));
    lines.push("Nous vous prions de nous excuser pour ce contretemps.".to_string());
    lines.join("\n")
}

pub fn confirmation_content(order: &Order) -> String {
    let mut lines = vec![
        greeting(order),
        format!(
            "Nous avons bien reçu votre commande #{}.",
            order_reference(&order.id)
        ),
    ];
    for item in &order.items {
        lines.push(format!("- {} x{} : {:.2} €", item.name, item.quantity, item.price));
    }
    lines.push(format!("Total : {:.2} €", order.total));
    lines.join("\n")
}

/// French mobile number in international form: `06 12 34 56 78` → `+33612345678`
pub fn format_phone_fr(phone: &str) -> String {
    let cleaned: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();
    if cleaned.starts_with('+') {
        cleaned
    } else if let Some(rest) = cleaned.strip_prefix('0') {
        format!("+33{rest}")
    } else {
        format!("+33{cleaned}")
    }
}

fn wants_sms(order: &Order) -> bool {
    matches!(order.contact_preference.as_deref(), Some("sms" | "phone" | "both"))
}

/// Drafts for every channel the customer can be reached on. Email is used
/// whenever an address is known; SMS only when the customer asked for it.
pub fn drafts_for(
    order: &Order,
    subject: &str,
    content: &str,
    status_update: Option<OrderStatus>,
) -> Vec<NotificationDraft> {
    let status_update = status_update.map(|s| s.as_str().to_string());
    let mut drafts = Vec::new();

    if !order.client_email.trim().is_empty() {
        drafts.push(NotificationDraft {
            order_id: order.id.clone(),
            channel: NotificationChannel::Email,
            recipient: order.client_email.trim().to_string(),
            subject: subject.to_string(),
            content: content.to_string(),
            status_update: status_update.clone(),
        });
    }

    if wants_sms(order) && !order.client_phone.trim().is_empty() {
        drafts.push(NotificationDraft {
            order_id: order.id.clone(),
            channel: NotificationChannel::Sms,
            recipient: format_phone_fr(&order.client_phone),
            subject: subject.to_string(),
            content: subject.to_string(),
            status_update,
        });
    }

    drafts
}

pub fn status_drafts(order: &Order, status: OrderStatus) -> Vec<NotificationDraft> {
    drafts_for(
        order,
        &status_subject(order, status),
        &status_content(order, status),
        Some(status),
    )
}

pub fn delay_drafts(order: &Order, delay_minutes: i64, reason: Option<&str>) -> Vec<NotificationDraft> {
    drafts_for(
        order,
        &delay_subject(order),
        &delay_content(order, delay_minutes, reason),
        None,
    )
}

pub fn confirmation_drafts(order: &Order) -> Vec<NotificationDraft> {
    drafts_for(order, &confirmation_subject(order), &confirmation_content(order), None)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use shared::models::{OrderItem, PaymentMethod, PaymentStatus};

    pub(crate) fn sample_order() -> Order {
        Order {
            id: "3f2a9c1b-1111-2222-3333-444455556666".into(),
            restaurant_id: 1,
            user_id: None,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: PaymentMethod::Online,
            order_type: OrderType::Delivery,
            subtotal: 30.0,
            tax: 2.73,
            delivery_fee: 3.0,
            tip: 0.0,
            discount: 0.0,
            total: 33.0,
            promo_code: None,
            scheduled_for: 0,
            client_name: "Camille".into(),
            client_email: "camille@example.fr".into(),
            client_phone: "06 12 34 56 78".into(),
            delivery_street: Some("1 rue des Lices".into()),
            delivery_city: Some("Châteaurenard".into()),
            delivery_postal_code: Some("13160".into()),
            delivery_instructions: None,
            customer_notes: None,
            allergies: vec![],
            contact_preference: None,
            pickup_time: None,
            items: vec![OrderItem {
                id: 1,
                order_id: "3f2a9c1b-1111-2222-3333-444455556666".into(),
                product_id: Some(10),
                name: "California saumon".into(),
                quantity: 2,
                price: 15.0,
                special_instructions: None,
            }],
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn subjects_use_the_short_reference() {
        let order = sample_order();
        assert_eq!(
            status_subject(&order, OrderStatus::Ready),
            "SushiEats - Commande #3F2A9C1B : Prête à être récupérée"
        );
        assert_eq!(delay_subject(&order), "SushiEats - Retard commande #3F2A9C1B");
    }

    #[test]
    fn delay_content_mentions_minutes_and_reason() {
        let order = sample_order();
        let content = delay_content(&order, 20, Some("  Affluence  "));
        assert!(content.contains("environ 20 minutes"));
        assert!(content.contains("Raison du retard : Affluence"));
        assert!(content.contains("La livraison"));

        let without = delay_content(&order, 15, Some(" "));
        assert!(!without.contains("Raison"));
    }

    #[test]
    fn email_only_unless_sms_requested() {
        let mut order = sample_order();
        let drafts = status_drafts(&order, OrderStatus::Confirmed);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].channel, NotificationChannel::Email);
        assert_eq!(drafts[0].status_update.as_deref(), Some("confirmed"));

        order.contact_preference = Some("sms".into());
        let drafts = status_drafts(&order, OrderStatus::Confirmed);
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[1].recipient, "+33612345678");

        order.client_email.clear();
        order.client_phone.clear();
        assert!(status_drafts(&order, OrderStatus::Confirmed).is_empty());
    }

    #[test]
    fn phone_numbers() {
        assert_eq!(format_phone_fr("06-12-34-56-78"), "+33612345678");
        assert_eq!(format_phone_fr("+44 7700 900123"), "+447700900123");
        assert_eq!(format_phone_fr("612345678"), "+33612345678");
    }

    #[test]
    fn confirmation_lists_items() {
        let content = confirmation_content(&sample_order());
        assert!(content.contains("- California saumon x2 : 15.00 €"));
        assert!(content.contains("Total : 33.00 €"));
    }
}
