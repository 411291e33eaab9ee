//! Order Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "kebab-case"))]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::OutForDelivery => "out-for-delivery",
            Self::Delivered => "delivered",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// No further change is allowed once terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Customer-facing label (fr)
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "En attente",
            Self::Confirmed => "Confirmée",
            Self::Preparing => "En préparation",
            Self::Ready => "Prête à être récupérée",
            Self::OutForDelivery => "En cours de livraison",
            Self::Delivered => "Livrée",
            Self::Completed => "Terminée",
            Self::Cancelled => "Annulée",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

/// How the customer receives the order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "kebab-case"))]
pub enum OrderType {
    Delivery,
    Pickup,
    DineIn,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delivery => "delivery",
            Self::Pickup => "pickup",
            Self::DineIn => "dine-in",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment method chosen at checkout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum PaymentMethod {
    /// Online card payment through the payment relay
    Online,
    /// Paid at the counter or to the rider
    OnSite,
}

/// Persisted order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub restaurant_id: i64,
    pub user_id: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub order_type: OrderType,
    pub subtotal: f64,
    pub tax: f64,
    pub delivery_fee: f64,
    pub tip: f64,
    pub discount: f64,
    pub total: f64,
    pub promo_code: Option<String>,
    /// Unix millis of the requested slot
    pub scheduled_for: i64,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub delivery_street: Option<String>,
    pub delivery_city: Option<String>,
    pub delivery_postal_code: Option<String>,
    pub delivery_instructions: Option<String>,
    pub customer_notes: Option<String>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub allergies: Vec<String>,
    pub contact_preference: Option<String>,
    pub pickup_time: Option<String>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Persisted order line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: String,
    /// None for configurator creations
    pub product_id: Option<i64>,
    pub name: String,
    pub quantity: i64,
    /// Unit price after automatic promotions
    pub price: f64,
    pub special_instructions: Option<String>,
}

/// Line submitted at checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderItemInput {
    Product {
        product_id: i64,
        quantity: i64,
        special_instructions: Option<String>,
    },
    Sushi {
        #[serde(flatten)]
        request: super::SushiQuoteRequest,
        quantity: i64,
        special_instructions: Option<String>,
    },
    Poke {
        #[serde(flatten)]
        request: super::PokeQuoteRequest,
        quantity: i64,
        special_instructions: Option<String>,
    },
}

/// Delivery address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub instructions: Option<String>,
}

/// Checkout request, used both for quotes and for order creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub restaurant_id: i64,
    pub order_type: OrderType,
    #[serde(default = "default_payment_method")]
    pub payment_method: PaymentMethod,
    pub items: Vec<OrderItemInput>,
    /// RFC 3339 instant of the requested slot
    pub scheduled_for: chrono::DateTime<chrono::FixedOffset>,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_email: String,
    #[serde(default)]
    pub client_phone: String,
    pub delivery_address: Option<DeliveryAddress>,
    pub promo_code: Option<String>,
    #[serde(default)]
    pub tip: f64,
    pub customer_notes: Option<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    pub contact_preference: Option<String>,
    pub user_id: Option<String>,
    /// Hold obtained from the slot reservation endpoint
    pub reservation_id: Option<i64>,
}

fn default_payment_method() -> PaymentMethod {
    PaymentMethod::Online
}

/// Priced line of a checkout quote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuotedItem {
    pub product_id: Option<i64>,
    pub name: String,
    pub category: Option<String>,
    pub quantity: i64,
    pub unit_price: f64,
    /// Unit discount from an automatic promotion
    pub unit_discount: f64,
    pub line_total: f64,
    pub promotion: Option<String>,
    pub special_instructions: Option<String>,
}

/// Checkout quote: every amount the storefront shows before payment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderQuote {
    pub items: Vec<QuotedItem>,
    pub subtotal: f64,
    /// Tax amount; included in the subtotal unless tax mode is exclusive
    pub tax: f64,
    pub tax_label: String,
    pub delivery_fee: f64,
    pub tip: f64,
    pub discount: f64,
    pub total: f64,
    pub promo_code: Option<String>,
    pub promo_message: Option<String>,
}

/// Status change request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

/// Payment status change request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusUpdate {
    pub payment_status: PaymentStatus,
}

/// Delay notice sent to the customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDelayNotice {
    pub delay_minutes: i64,
    pub delay_reason: Option<String>,
}

/// Admin order list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderListQuery {
    pub restaurant_id: Option<i64>,
    pub status: Option<OrderStatus>,
    /// YYYY-MM-DD, local to the restaurant
    pub date: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Paginated order list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}
