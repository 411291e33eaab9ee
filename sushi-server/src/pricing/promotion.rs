//! Day/time Promotion Matcher
//!
//! A promotion applies when it is active, today is one of its weekdays, the
//! local time is inside its window (inclusive) and the restaurant is in
//! scope. Empty scope lists mean "everything".

use chrono::{DateTime, FixedOffset, NaiveTime, Timelike};
use rust_decimal::Decimal;
use shared::models::{DayPromotion, Product, PromotedPrice};

use super::{to_decimal, to_f64};
use crate::utils::time::{time_in_window, weekday_index};

/// Check if a promotion is running at `now` for the given restaurant
pub fn is_promotion_active(
    promo: &DayPromotion,
    restaurant_id: Option<i64>,
    now: &DateTime<FixedOffset>,
) -> bool {
    if !promo.is_active {
        return false;
    }

    if !promo.applicable_days.contains(&weekday_index(now)) {
        return false;
    }

    // Window only applies when both ends are set
    if let (Some(start), Some(end)) = (&promo.start_time, &promo.end_time) {
        let current = NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(NaiveTime::MIN);
        if !time_in_window(current, start, end) {
            return false;
        }
    }

    match restaurant_id {
        Some(id) => {
            promo.applicable_restaurants.is_empty() || promo.applicable_restaurants.contains(&id)
        }
        None => true,
    }
}

/// Promotions running at `now`, in their stored order
pub fn active_promotions<'a>(
    promotions: &'a [DayPromotion],
    restaurant_id: Option<i64>,
    now: &DateTime<FixedOffset>,
) -> Vec<&'a DayPromotion> {
    promotions
        .iter()
        .filter(|p| is_promotion_active(p, restaurant_id, now))
        .collect()
}

/// First active promotion covering a category
pub fn promotion_for_category<'a>(
    active: &[&'a DayPromotion],
    category: &str,
) -> Option<&'a DayPromotion> {
    active.iter().copied().find(|p| {
        p.applicable_categories.is_empty() || p.applicable_categories.iter().any(|c| c == category)
    })
}

/// First active promotion covering a product, by id or by category
pub fn promotion_for_product<'a>(
    active: &[&'a DayPromotion],
    product_id: i64,
    category: &str,
) -> Option<&'a DayPromotion> {
    active.iter().copied().find(|p| {
        if p.applicable_products.contains(&product_id) {
            return true;
        }
        let category_match = p.applicable_categories.iter().any(|c| c == category);
        let unscoped = p.applicable_categories.is_empty() && p.applicable_products.is_empty();
        category_match || unscoped
    })
}

fn discount_decimal(price: Decimal, promo: &DayPromotion) -> Decimal {
    let value = to_decimal(promo.discount);
    if promo.is_percentage {
        price * value / Decimal::ONE_HUNDRED
    } else {
        value.min(price)
    }
}

/// Discount granted on `price`: a percentage of it, or a fixed amount capped
/// at the price
pub fn discount_amount(price: f64, promo: &DayPromotion) -> f64 {
    to_f64(discount_decimal(to_decimal(price), promo))
}

/// Price after the promotion discount
pub fn discounted_price(price: f64, promo: &DayPromotion) -> f64 {
    let price = to_decimal(price);
    to_f64(price - super::round_money(discount_decimal(price, promo)))
}

/// Storefront preview of a product under a promotion
pub fn promoted_price(product: &Product, promo: &DayPromotion) -> PromotedPrice {
    PromotedPrice {
        product_id: product.id,
        promotion_id: promo.id,
        title: promo.title.clone(),
        original_price: product.price,
        discount: discount_amount(product.price, promo),
        discounted_price: discounted_price(product.price, promo),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn lunch_box() -> DayPromotion {
        DayPromotion {
            id: 1,
            title: "Box du Midi à -20%".into(),
            description: None,
            discount: 20.0,
            is_percentage: true,
            applicable_days: vec![2, 3, 4, 5],
            applicable_categories: vec!["box_du_midi".into()],
            applicable_products: vec![],
            applicable_restaurants: vec![],
            start_time: Some("11:30".into()),
            end_time: Some("14:30".into()),
            is_active: true,
        }
    }

    /// 2026-03-10 is a Tuesday
    fn at(day: u32, h: u32, m: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2026, 3, day, h, m, 0)
            .unwrap()
    }

    #[test]
    fn lunch_window_is_inclusive() {
        let promo = lunch_box();
        assert!(is_promotion_active(&promo, None, &at(10, 11, 30)));
        assert!(is_promotion_active(&promo, None, &at(10, 14, 30)));
        assert!(!is_promotion_active(&promo, None, &at(10, 11, 29)));
        assert!(!is_promotion_active(&promo, None, &at(10, 14, 31)));
    }

    #[test]
    fn weekday_must_match() {
        let promo = lunch_box();
        // Monday 9th and Sunday 15th
        assert!(!is_promotion_active(&promo, None, &at(9, 12, 0)));
        assert!(!is_promotion_active(&promo, None, &at(15, 12, 0)));
        // Friday 13th
        assert!(is_promotion_active(&promo, None, &at(13, 12, 0)));
    }

    #[test]
    fn no_window_means_all_day() {
        let mut promo = lunch_box();
        promo.start_time = None;
        assert!(is_promotion_active(&promo, None, &at(10, 20, 0)));
    }

    #[test]
    fn inactive_and_out_of_scope_restaurants() {
        let mut promo = lunch_box();
        promo.applicable_restaurants = vec![7];
        assert!(is_promotion_active(&promo, Some(7), &at(10, 12, 0)));
        assert!(!is_promotion_active(&promo, Some(8), &at(10, 12, 0)));
        promo.is_active = false;
        assert!(!is_promotion_active(&promo, Some(7), &at(10, 12, 0)));
    }

    #[test]
    fn category_lookup_returns_first_match() {
        let mut global = lunch_box();
        global.id = 2;
        global.applicable_categories = vec![];
        let promos = vec![lunch_box(), global];
        let active = active_promotions(&promos, None, &at(10, 12, 0));
        assert_eq!(active.len(), 2);
        assert_eq!(promotion_for_category(&active, "box_du_midi").unwrap().id, 1);
        assert_eq!(promotion_for_category(&active, "desserts").unwrap().id, 2);
    }

    #[test]
    fn product_lookup_matches_ids_or_categories() {
        let mut by_product = lunch_box();
        by_product.applicable_categories = vec![];
        by_product.applicable_products = vec![42];
        let promos = vec![by_product];
        let active = active_promotions(&promos, None, &at(10, 12, 0));
        assert!(promotion_for_product(&active, 42, "sushis").is_some());
        assert!(promotion_for_product(&active, 43, "sushis").is_none());
    }

    #[test]
    fn discounts() {
        let pct = lunch_box();
        assert_eq!(discount_amount(12.90, &pct), 2.58);
        assert_eq!(discounted_price(12.90, &pct), 10.32);

        let mut fixed = lunch_box();
        fixed.is_percentage = false;
        fixed.discount = 5.0;
        assert_eq!(discount_amount(12.0, &fixed), 5.0);
        assert_eq!(discount_amount(3.0, &fixed), 3.0);
        assert_eq!(discounted_price(3.0, &fixed), 0.0);
    }
}
