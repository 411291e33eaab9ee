//! Checkout Calculator
//!
//! `total = subtotal + tax + delivery_fee - discount + tip`, where the tax
//! term is zero when menu prices already include TVA.

use rust_decimal::Decimal;

use super::{TaxMode, round_money, to_decimal, to_f64};

/// Amounts feeding the checkout formula
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckoutInput {
    /// Sum of line totals, automatic promotions already applied
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub tip: f64,
    /// Promo code discount on the subtotal
    pub discount: f64,
}

/// Resolved checkout amounts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckoutTotals {
    pub subtotal: f64,
    /// TVA amount, informative in inclusive mode
    pub tax: f64,
    /// Tax term of the total formula (0 in inclusive mode)
    pub tax_added: f64,
    pub delivery_fee: f64,
    pub tip: f64,
    pub discount: f64,
    pub total: f64,
}

/// Unit price after an automatic promotion, times quantity
pub fn line_total(unit_price: f64, unit_discount: f64, quantity: i64) -> f64 {
    let unit = (to_decimal(unit_price) - to_decimal(unit_discount)).max(Decimal::ZERO);
    to_f64(unit * Decimal::from(quantity))
}

/// Sum of already rounded line totals
pub fn sum_lines(lines: impl IntoIterator<Item = f64>) -> f64 {
    to_f64(lines.into_iter().map(to_decimal).sum())
}

/// Promo code discount: a percentage of the subtotal or a fixed amount capped
/// at the subtotal
pub fn code_discount(subtotal: f64, discount: f64, is_percentage: bool) -> f64 {
    let subtotal = to_decimal(subtotal);
    let value = to_decimal(discount);
    let amount = if is_percentage {
        subtotal * value / Decimal::ONE_HUNDRED
    } else {
        value
    };
    to_f64(amount.min(subtotal).max(Decimal::ZERO))
}

/// TVA carried by `subtotal` under the given mode
pub fn tax_amount(subtotal: f64, rate: f64, mode: TaxMode) -> f64 {
    let subtotal = to_decimal(subtotal);
    let rate = to_decimal(rate);
    let tax = match mode {
        TaxMode::Inclusive => subtotal * rate / (Decimal::ONE + rate),
        TaxMode::Exclusive => subtotal * rate,
    };
    to_f64(tax)
}

/// Label shown next to the tax amount
pub fn tax_label(rate: f64, mode: TaxMode) -> String {
    let pct = to_decimal(rate) * Decimal::ONE_HUNDRED;
    let pct = pct.round_dp(2).normalize();
    match mode {
        TaxMode::Inclusive => format!("TVA {pct}% incluse"),
        TaxMode::Exclusive => format!("TVA {pct}%"),
    }
}

/// Apply the checkout formula
pub fn compute_totals(input: CheckoutInput, tax_rate: f64, mode: TaxMode) -> CheckoutTotals {
    let subtotal = round_money(to_decimal(input.subtotal));
    let delivery_fee = round_money(to_decimal(input.delivery_fee).max(Decimal::ZERO));
    let tip = round_money(to_decimal(input.tip).max(Decimal::ZERO));
    let discount = round_money(to_decimal(input.discount).max(Decimal::ZERO).min(subtotal));

    let tax = round_money(to_decimal(tax_amount(input.subtotal, tax_rate, mode)));
    let tax_added = match mode {
        TaxMode::Inclusive => Decimal::ZERO,
        TaxMode::Exclusive => tax,
    };

    let total = (subtotal + tax_added + delivery_fee - discount + tip).max(Decimal::ZERO);

    CheckoutTotals {
        subtotal: to_f64(subtotal),
        tax: to_f64(tax),
        tax_added: to_f64(tax_added),
        delivery_fee: to_f64(delivery_fee),
        tip: to_f64(tip),
        discount: to_f64(discount),
        total: to_f64(total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::round2;

    #[test]
    fn lines_apply_unit_discount() {
        assert_eq!(line_total(12.9, 2.58, 2), 20.64);
        assert_eq!(line_total(3.0, 5.0, 1), 0.0);
        assert_eq!(sum_lines([20.64, 5.5, 0.1, 0.2]), 26.44);
    }

    #[test]
    fn inclusive_tax_is_shown_not_added() {
        let totals = compute_totals(
            CheckoutInput {
                subtotal: 55.0,
                delivery_fee: 3.0,
                tip: 2.0,
                discount: 5.0,
            },
            0.10,
            TaxMode::Inclusive,
        );
        assert_eq!(totals.tax, 5.0);
        assert_eq!(totals.tax_added, 0.0);
        assert_eq!(totals.total, 55.0);
    }

    #[test]
    fn exclusive_tax_is_added() {
        let totals = compute_totals(
            CheckoutInput {
                subtotal: 50.0,
                delivery_fee: 3.0,
                tip: 0.0,
                discount: 0.0,
            },
            0.10,
            TaxMode::Exclusive,
        );
        assert_eq!(totals.tax, 5.0);
        assert_eq!(totals.total, 58.0);
    }

    #[test]
    fn total_formula_holds() {
        let input = CheckoutInput {
            subtotal: 37.8,
            delivery_fee: 2.5,
            tip: 1.2,
            discount: 3.78,
        };
        for mode in [TaxMode::Inclusive, TaxMode::Exclusive] {
            let t = compute_totals(input, 0.10, mode);
            let expected = round2(t.subtotal + t.tax_added + t.delivery_fee - t.discount + t.tip);
            assert_eq!(t.total, expected);
        }
    }

    #[test]
    fn discount_is_capped_and_total_never_negative() {
        let totals = compute_totals(
            CheckoutInput {
                subtotal: 10.0,
                delivery_fee: 0.0,
                tip: 0.0,
                discount: 25.0,
            },
            0.10,
            TaxMode::Inclusive,
        );
        assert_eq!(totals.discount, 10.0);
        assert_eq!(totals.total, 0.0);
    }

    #[test]
    fn promo_code_discounts() {
        assert_eq!(code_discount(40.0, 10.0, true), 4.0);
        assert_eq!(code_discount(40.0, 5.0, false), 5.0);
        assert_eq!(code_discount(3.0, 5.0, false), 3.0);
    }

    #[test]
    fn tax_labels() {
        assert_eq!(tax_label(0.10, TaxMode::Inclusive), "TVA 10% incluse");
        assert_eq!(tax_label(0.055, TaxMode::Exclusive), "TVA 5.5%");
    }
}
