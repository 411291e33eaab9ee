//! Cart Engine
//!
//! Server-side replay of the storefront cart. Lines are keyed by product id;
//! adding a product already in the cart merges the quantities. Prices always
//! come from the menu, never from the client.
//!
//! A "plateaux" line unlocks one free dessert per plateau (a "desserts"
//! product priced 0).

use std::collections::HashMap;

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    CATEGORY_DESSERTS, CATEGORY_PLATEAUX, CartItem, CartOperation, CartSummary, Product,
};
use thiserror::Error;

use crate::pricing::{to_decimal, to_f64};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("Ordering is currently locked")]
    OrderingLocked,

    #[error("No free dessert left: add a plateau first")]
    FreeDessertUnavailable,

    #[error("Quantity must be positive")]
    InvalidQuantity,

    #[error("Product {0} not found")]
    ProductNotFound(i64),
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        let code = match &err {
            CartError::OrderingLocked => ErrorCode::OrderingLocked,
            CartError::FreeDessertUnavailable => ErrorCode::FreeDessertUnavailable,
            CartError::InvalidQuantity => ErrorCode::ValueOutOfRange,
            CartError::ProductNotFound(_) => ErrorCode::ProductNotFound,
        };
        AppError::with_message(code, err.to_string())
    }
}

/// A dessert priced 0 is a free dessert
pub fn is_free_dessert(item: &CartItem) -> bool {
    item.category == CATEGORY_DESSERTS && item.price == 0.0
}

/// Cart line for a menu product
pub fn item_from_product(product: &Product, quantity: i64, special_instructions: Option<String>) -> CartItem {
    CartItem {
        product_id: product.id,
        name: product.name.clone(),
        price: product.price,
        quantity,
        category: product.category.clone(),
        special_instructions,
    }
}

#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartItem>,
    ordering_locked: bool,
}

impl Cart {
    pub fn new(ordering_locked: bool) -> Self {
        Self {
            items: Vec::new(),
            ordering_locked,
        }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    /// Add a line, merging with an existing line for the same product
    pub fn add(&mut self, item: CartItem) -> Result<(), CartError> {
        if self.ordering_locked {
            return Err(CartError::OrderingLocked);
        }
        if item.quantity <= 0 {
            return Err(CartError::InvalidQuantity);
        }
        if is_free_dessert(&item) && self.remaining_free_desserts() < item.quantity {
            return Err(CartError::FreeDessertUnavailable);
        }

        match self.items.iter_mut().find(|i| i.product_id == item.product_id) {
            Some(existing) => {
                existing.quantity += item.quantity;
                if item.special_instructions.is_some() {
                    existing.special_instructions = item.special_instructions;
                }
            }
            None => self.items.push(item),
        }
        Ok(())
    }

    pub fn remove(&mut self, product_id: i64) {
        self.items.retain(|i| i.product_id != product_id);
    }

    /// Set a line quantity; zero or less removes the line
    pub fn update_quantity(&mut self, product_id: i64, quantity: i64) {
        if quantity <= 0 {
            self.remove(product_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = quantity;
        }
    }

    /// Decrease a line by one, never below 1
    pub fn decrement(&mut self, product_id: i64) {
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = (item.quantity - 1).max(1);
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replay one storefront operation. `Add` looks the product up in
    /// `products` so the menu price is used.
    pub fn apply(
        &mut self,
        op: CartOperation,
        products: &HashMap<i64, Product>,
    ) -> Result<(), CartError> {
        match op {
            CartOperation::Add {
                product_id,
                quantity,
                special_instructions,
            } => {
                let product = products
                    .get(&product_id)
                    .ok_or(CartError::ProductNotFound(product_id))?;
                self.add(item_from_product(product, quantity, special_instructions))
            }
            CartOperation::Remove { product_id } => {
                self.remove(product_id);
                Ok(())
            }
            CartOperation::UpdateQuantity {
                product_id,
                quantity,
            } => {
                self.update_quantity(product_id, quantity);
                Ok(())
            }
            CartOperation::Decrement { product_id } => {
                self.decrement(product_id);
                Ok(())
            }
            CartOperation::Clear => {
                self.clear();
                Ok(())
            }
        }
    }

    pub fn total(&self) -> f64 {
        let total: Decimal = self
            .items
            .iter()
            .map(|i| to_decimal(i.price) * Decimal::from(i.quantity))
            .sum();
        to_f64(total)
    }

    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn plateau_count(&self) -> i64 {
        self.items
            .iter()
            .filter(|i| i.category == CATEGORY_PLATEAUX)
            .map(|i| i.quantity)
            .sum()
    }

    pub fn free_dessert_count(&self) -> i64 {
        self.items
            .iter()
            .filter(|i| is_free_dessert(i))
            .map(|i| i.quantity)
            .sum()
    }

    pub fn remaining_free_desserts(&self) -> i64 {
        (self.plateau_count() - self.free_dessert_count()).max(0)
    }

    pub fn summary(&self) -> CartSummary {
        CartSummary {
            items: self.items.clone(),
            total: self.total(),
            item_count: self.item_count(),
            plateau_count: self.plateau_count(),
            free_dessert_count: self.free_dessert_count(),
            remaining_free_desserts: self.remaining_free_desserts(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, price: f64, qty: i64, category: &str) -> CartItem {
        CartItem {
            product_id: id,
            name: format!("p{id}"),
            price,
            quantity: qty,
            category: category.into(),
            special_instructions: None,
        }
    }

    fn product(id: i64, price: f64, category: &str) -> Product {
        Product {
            id,
            restaurant_id: 1,
            category_id: 1,
            category: category.into(),
            name: format!("p{id}"),
            description: None,
            price,
            image_url: None,
            is_vegetarian: false,
            is_spicy: false,
            is_new: false,
            is_best_seller: false,
            is_gluten_free: false,
            allergens: vec![],
            pieces: None,
            prep_time: None,
            is_active: true,
        }
    }

    #[test]
    fn add_merges_quantities() {
        let mut cart = Cart::new(false);
        cart.add(item(1, 12.9, 1, "sushis")).unwrap();
        cart.add(item(1, 12.9, 2, "sushis")).unwrap();
        cart.add(item(2, 4.5, 1, "boissons")).unwrap();
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.total(), 43.2);
    }

    #[test]
    fn locked_cart_refuses_additions() {
        let mut cart = Cart::new(true);
        assert_eq!(cart.add(item(1, 5.0, 1, "x")), Err(CartError::OrderingLocked));
        assert_eq!(
            AppError::from(CartError::OrderingLocked).code,
            ErrorCode::OrderingLocked
        );
    }

    #[test]
    fn quantity_updates() {
        let mut cart = Cart::new(false);
        cart.add(item(1, 5.0, 3, "x")).unwrap();
        cart.decrement(1);
        cart.decrement(1);
        cart.decrement(1);
        assert_eq!(cart.items()[0].quantity, 1);
        cart.update_quantity(1, 4);
        assert_eq!(cart.items()[0].quantity, 4);
        cart.update_quantity(1, 0);
        assert!(cart.items().is_empty());
    }

    #[test]
    fn free_desserts_follow_plateaux() {
        let mut cart = Cart::new(false);
        assert_eq!(
            cart.add(item(9, 0.0, 1, CATEGORY_DESSERTS)),
            Err(CartError::FreeDessertUnavailable)
        );

        cart.add(item(1, 39.9, 2, CATEGORY_PLATEAUX)).unwrap();
        assert_eq!(cart.plateau_count(), 2);
        assert_eq!(cart.remaining_free_desserts(), 2);

        cart.add(item(9, 0.0, 1, CATEGORY_DESSERTS)).unwrap();
        // Paid desserts do not consume the allowance
        cart.add(item(10, 6.0, 1, CATEGORY_DESSERTS)).unwrap();
        assert_eq!(cart.free_dessert_count(), 1);
        assert_eq!(cart.remaining_free_desserts(), 1);

        cart.remove(1);
        assert_eq!(cart.remaining_free_desserts(), 0);
    }

    #[test]
    fn operations_use_menu_prices() {
        let products: HashMap<i64, Product> =
            [(1, product(1, 12.9, "sushis"))].into_iter().collect();
        let mut cart = Cart::new(false);
        cart.apply(
            CartOperation::Add {
                product_id: 1,
                quantity: 2,
                special_instructions: Some("sans wasabi".into()),
            },
            &products,
        )
        .unwrap();
        assert_eq!(cart.total(), 25.8);
        assert_eq!(
            cart.apply(
                CartOperation::Add {
                    product_id: 2,
                    quantity: 1,
                    special_instructions: None
                },
                &products
            ),
            Err(CartError::ProductNotFound(2))
        );
        cart.apply(CartOperation::Clear, &products).unwrap();
        assert_eq!(cart.summary().item_count, 0);
    }
}
