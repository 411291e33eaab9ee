//! Configurator Pricing
//!
//! Additive pricing for the build-your-own sushi box and poke bowl. Every
//! extra becomes one breakdown line so the storefront can show the receipt.

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{BoxOption, ConfiguratorQuote, PokeCreation, QuoteLine, SushiCreation};
use thiserror::Error;

use super::{to_decimal, to_f64};

/// A creation may hold at most this many bases
pub const MAX_SUSHI_BASES: usize = 2;
/// Poke ingredients included before the per-ingredient surcharge
pub const POKE_INCLUDED_INGREDIENTS: usize = 5;

/// 0.50 surcharge for an extra sushi base, garniture or topping
const SUSHI_EXTRA: Decimal = Decimal::from_parts(50, 0, 0, false, 2);
/// 0.50 per poke ingredient beyond the included count
const POKE_INGREDIENT_EXTRA: Decimal = Decimal::from_parts(50, 0, 0, false, 2);
/// 1.00 per extra poke protein or sauce
const POKE_PROTEIN_EXTRA: Decimal = Decimal::ONE;
const POKE_SAUCE_EXTRA: Decimal = Decimal::ONE;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfiguratorError {
    #[error("Creation {creation} has {count} bases, at most {MAX_SUSHI_BASES} are allowed")]
    TooManyBases { creation: usize, count: usize },

    #[error("This box holds {max} creations, {count} submitted")]
    TooManyCreations { max: i64, count: usize },
}

impl From<ConfiguratorError> for AppError {
    fn from(err: ConfiguratorError) -> Self {
        let code = match err {
            ConfiguratorError::TooManyBases { .. } => ErrorCode::TooManyBases,
            ConfiguratorError::TooManyCreations { .. } => ErrorCode::TooManyCreations,
        };
        AppError::with_message(code, err.to_string())
    }
}

struct Breakdown {
    lines: Vec<QuoteLine>,
    extras: Decimal,
}

impl Breakdown {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            extras: Decimal::ZERO,
        }
    }

    fn add(&mut self, label: String, amount: Decimal) {
        if amount.is_zero() {
            return;
        }
        self.extras += amount;
        self.lines.push(QuoteLine {
            label,
            amount: to_f64(amount),
        });
    }

    fn into_quote(self, base_price: Decimal) -> ConfiguratorQuote {
        ConfiguratorQuote {
            base_price: to_f64(base_price),
            extras: to_f64(self.extras),
            total: to_f64(base_price + self.extras),
            breakdown: self.lines,
        }
    }
}

/// Charge for items beyond `free`, at `unit` each
fn beyond(count: usize, free: usize, unit: Decimal) -> (usize, Decimal) {
    let extra = count.saturating_sub(free);
    (extra, unit * Decimal::from(extra))
}

fn add_sushi_creation(out: &mut Breakdown, index: usize, creation: &SushiCreation) {
    let n = index + 1;

    if let Some(enrobage) = &creation.enrobage
        && !enrobage.included
    {
        out.add(
            format!("Création {n} : enrobage {}", enrobage.name),
            to_decimal(enrobage.price),
        );
    }

    // Second base is a flat 0.50, the cap is checked by the caller
    if creation.bases.len() > 1 {
        out.add(format!("Création {n} : base supplémentaire"), SUSHI_EXTRA);
    }

    let (extra, amount) = beyond(creation.garnitures.len(), 1, SUSHI_EXTRA);
    out.add(format!("Création {n} : garnitures supplémentaires x{extra}"), amount);

    let (extra, amount) = beyond(creation.toppings.len(), 1, SUSHI_EXTRA);
    out.add(format!("Création {n} : toppings supplémentaires x{extra}"), amount);
}

/// Extra cost of a single sushi creation
pub fn sushi_creation_extra(creation: &SushiCreation) -> f64 {
    let mut out = Breakdown::new();
    add_sushi_creation(&mut out, 0, creation);
    to_f64(out.extras)
}

/// Quote a sushi box
///
/// Without a box the total is 0. Bases and the number of creations are
/// checked against their limits.
pub fn sushi_quote(
    box_option: Option<&BoxOption>,
    creations: &[SushiCreation],
) -> Result<ConfiguratorQuote, ConfiguratorError> {
    for (i, creation) in creations.iter().enumerate() {
        if creation.bases.len() > MAX_SUSHI_BASES {
            return Err(ConfiguratorError::TooManyBases {
                creation: i + 1,
                count: creation.bases.len(),
            });
        }
    }

    let Some(box_option) = box_option else {
        return Ok(Breakdown::new().into_quote(Decimal::ZERO));
    };

    if creations.len() as i64 > box_option.creations {
        return Err(ConfiguratorError::TooManyCreations {
            max: box_option.creations,
            count: creations.len(),
        });
    }

    let mut out = Breakdown::new();
    for (i, creation) in creations.iter().enumerate() {
        add_sushi_creation(&mut out, i, creation);
    }
    Ok(out.into_quote(to_decimal(box_option.price)))
}

/// Total price of a sushi box, 0 without a box
pub fn sushi_total(
    box_option: Option<&BoxOption>,
    creations: &[SushiCreation],
) -> Result<f64, ConfiguratorError> {
    sushi_quote(box_option, creations).map(|q| q.total)
}

/// Quote a poke bowl
pub fn poke_quote(creation: &PokeCreation) -> ConfiguratorQuote {
    let mut out = Breakdown::new();

    let (extra, amount) = beyond(
        creation.ingredients.len(),
        POKE_INCLUDED_INGREDIENTS,
        POKE_INGREDIENT_EXTRA,
    );
    out.add(format!("Ingrédients supplémentaires x{extra}"), amount);
    for ingredient in creation.ingredients.iter().filter(|i| !i.included) {
        out.add(ingredient.name.clone(), to_decimal(ingredient.price));
    }

    let (extra, amount) = beyond(creation.proteins.len(), 1, POKE_PROTEIN_EXTRA);
    out.add(format!("Protéines supplémentaires x{extra}"), amount);
    for protein in creation.proteins.iter().filter(|p| !p.included) {
        out.add(protein.name.clone(), to_decimal(protein.price));
    }

    let (extra, amount) = beyond(creation.sauces.len(), 1, POKE_SAUCE_EXTRA);
    out.add(format!("Sauces supplémentaires x{extra}"), amount);
    for sauce in creation.sauces.iter().filter(|s| !s.included) {
        out.add(sauce.name.clone(), to_decimal(sauce.price));
    }

    out.into_quote(to_decimal(creation.base_price))
}

/// Total price of a poke bowl
pub fn poke_total(creation: &PokeCreation) -> f64 {
    poke_quote(creation).total
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{PokeIngredient, PokeIngredientType, SushiOption, SushiOptionCategory};

    fn opt(name: &str, price: f64, included: bool, category: SushiOptionCategory) -> SushiOption {
        SushiOption {
            id: 0,
            name: name.into(),
            price,
            included,
            category,
        }
    }

    fn many(n: usize, category: SushiOptionCategory) -> Vec<SushiOption> {
        (0..n).map(|i| opt(&format!("o{i}"), 0.0, true, category)).collect()
    }

    fn box18() -> BoxOption {
        BoxOption {
            id: 2,
            name: "Box 18 pièces".into(),
            description: None,
            pieces: 18,
            creations: 3,
            price: 22.0,
        }
    }

    fn ing(name: &str, price: f64, included: bool, t: PokeIngredientType) -> PokeIngredient {
        PokeIngredient {
            id: 0,
            name: name.into(),
            price,
            included,
            ingredient_type: t,
        }
    }

    #[test]
    fn no_box_means_zero() {
        let creation = SushiCreation {
            garnitures: many(3, SushiOptionCategory::Garniture),
            ..Default::default()
        };
        assert_eq!(sushi_total(None, &[creation]).unwrap(), 0.0);
    }

    #[test]
    fn plain_creation_costs_the_box_price() {
        let creation = SushiCreation {
            enrobage: Some(opt("Nori", 0.0, true, SushiOptionCategory::Enrobage)),
            bases: many(1, SushiOptionCategory::Base),
            garnitures: many(1, SushiOptionCategory::Garniture),
            toppings: many(1, SushiOptionCategory::Topping),
            sauce: None,
        };
        let quote = sushi_quote(Some(&box18()), &[creation]).unwrap();
        assert_eq!(quote.total, 22.0);
        assert!(quote.breakdown.is_empty());
    }

    #[test]
    fn sushi_extras_add_up() {
        // Saumon enrobage 1.50 + second base 0.50 + 2 extra garnitures 1.00
        // + 1 extra topping 0.50
        let creation = SushiCreation {
            enrobage: Some(opt("Saumon", 1.5, false, SushiOptionCategory::Enrobage)),
            bases: many(2, SushiOptionCategory::Base),
            garnitures: many(3, SushiOptionCategory::Garniture),
            toppings: many(2, SushiOptionCategory::Topping),
            sauce: None,
        };
        assert_eq!(sushi_creation_extra(&creation), 3.5);

        let quote = sushi_quote(Some(&box18()), &[creation.clone(), creation]).unwrap();
        assert_eq!(quote.extras, 7.0);
        assert_eq!(quote.total, 29.0);
        assert_eq!(quote.breakdown.len(), 8);
    }

    #[test]
    fn included_enrobage_is_free_even_with_a_price() {
        let creation = SushiCreation {
            enrobage: Some(opt("Nori", 2.0, true, SushiOptionCategory::Enrobage)),
            ..Default::default()
        };
        assert_eq!(sushi_creation_extra(&creation), 0.0);
    }

    #[test]
    fn base_and_creation_limits() {
        let creation = SushiCreation {
            bases: many(3, SushiOptionCategory::Base),
            ..Default::default()
        };
        assert_eq!(
            sushi_quote(Some(&box18()), &[creation]).unwrap_err(),
            ConfiguratorError::TooManyBases {
                creation: 1,
                count: 3
            }
        );

        let four = vec![SushiCreation::default(); 4];
        let err = sushi_quote(Some(&box18()), &four).unwrap_err();
        assert_eq!(err, ConfiguratorError::TooManyCreations { max: 3, count: 4 });
        assert_eq!(AppError::from(err).code, ErrorCode::TooManyCreations);
    }

    #[test]
    fn poke_base_price_only() {
        let creation = PokeCreation {
            base_price: 15.9,
            ingredients: (0..5)
                .map(|i| ing(&format!("i{i}"), 0.0, true, PokeIngredientType::Ingredient))
                .collect(),
            proteins: vec![ing("Saumon", 0.0, true, PokeIngredientType::Protein)],
            sauces: vec![ing("Soja", 0.0, true, PokeIngredientType::Sauce)],
        };
        assert_eq!(poke_total(&creation), 15.9);
    }

    #[test]
    fn poke_extras_add_up() {
        // 7 ingredients: 2 x 0.50, Wakame premium 1.00
        // 2 proteins: 1.00, Crevettes premium 2.00
        // 2 sauces: 1.00, Truffe premium 1.50
        let mut ingredients: Vec<_> = (0..6)
            .map(|i| ing(&format!("i{i}"), 0.0, true, PokeIngredientType::Ingredient))
            .collect();
        ingredients.push(ing("Wakame", 1.0, false, PokeIngredientType::Ingredient));
        let creation = PokeCreation {
            base_price: 15.9,
            ingredients,
            proteins: vec![
                ing("Saumon", 0.0, true, PokeIngredientType::Protein),
                ing("Crevettes tempura", 2.0, false, PokeIngredientType::Protein),
            ],
            sauces: vec![
                ing("Soja", 0.0, true, PokeIngredientType::Sauce),
                ing("Sauce truffe", 1.5, false, PokeIngredientType::Sauce),
            ],
        };
        let quote = poke_quote(&creation);
        assert_eq!(quote.extras, 7.5);
        assert_eq!(quote.total, 23.4);
        assert!(quote.breakdown.iter().any(|l| l.label == "Wakame" && l.amount == 1.0));
    }

    #[test]
    fn premium_ingredient_is_charged_below_the_threshold() {
        let creation = PokeCreation {
            base_price: 15.9,
            ingredients: vec![ing("Wakame", 1.0, false, PokeIngredientType::Ingredient)],
            ..Default::default()
        };
        assert_eq!(poke_total(&creation), 16.9);
    }
}
