//! Resolve configurator requests (option ids) into priced creations

use std::collections::HashMap;

use shared::models::{
    BoxOption, ConfiguratorQuote, PokeCreation, PokeIngredient, PokeIngredientType, PokeQuoteRequest,
    SushiCreation, SushiOption, SushiOptionCategory, SushiQuoteRequest,
};
use sqlx::SqlitePool;

use crate::db::repository::configurator;
use crate::pricing;
use crate::utils::{AppError, AppResult, ErrorCode};

fn option_not_found(id: i64, step: &str) -> AppError {
    AppError::with_message(
        ErrorCode::ConfiguratorOptionNotFound,
        format!("Option {id} is not a valid {step}"),
    )
}

fn pick_sushi(
    options: &HashMap<i64, SushiOption>,
    id: i64,
    category: SushiOptionCategory,
    step: &str,
) -> AppResult<SushiOption> {
    options
        .get(&id)
        .filter(|o| o.category == category)
        .cloned()
        .ok_or_else(|| option_not_found(id, step))
}

/// Box and creations behind a sushi request
pub async fn resolve_sushi(
    pool: &SqlitePool,
    request: &SushiQuoteRequest,
) -> AppResult<(BoxOption, Vec<SushiCreation>)> {
    let box_option = configurator::find_box(pool, request.box_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BoxRequired))?;

    let ids: Vec<i64> = request
        .creations
        .iter()
        .flat_map(|c| {
            c.enrobage
                .into_iter()
                .chain(c.bases.iter().copied())
                .chain(c.garnitures.iter().copied())
                .chain(c.toppings.iter().copied())
                .chain(c.sauce)
        })
        .collect();
    let options: HashMap<i64, SushiOption> = configurator::find_sushi_options_by_ids(pool, &ids)
        .await?
        .into_iter()
        .map(|o| (o.id, o))
        .collect();

    let mut creations = Vec::with_capacity(request.creations.len());
    for input in &request.creations {
        let pick_all = |ids: &[i64], category: SushiOptionCategory, step: &str| -> AppResult<Vec<SushiOption>> {
            ids.iter().map(|id| pick_sushi(&options, *id, category, step)).collect()
        };
        creations.push(SushiCreation {
            enrobage: input
                .enrobage
                .map(|id| pick_sushi(&options, id, SushiOptionCategory::Enrobage, "enrobage"))
                .transpose()?,
            bases: pick_all(&input.bases, SushiOptionCategory::Base, "base")?,
            garnitures: pick_all(&input.garnitures, SushiOptionCategory::Garniture, "garniture")?,
            toppings: pick_all(&input.toppings, SushiOptionCategory::Topping, "topping")?,
            sauce: input
                .sauce
                .map(|id| pick_sushi(&options, id, SushiOptionCategory::Sauce, "sauce"))
                .transpose()?,
        });
    }

    Ok((box_option, creations))
}

pub async fn quote_sushi(pool: &SqlitePool, request: &SushiQuoteRequest) -> AppResult<ConfiguratorQuote> {
    let (box_option, creations) = resolve_sushi(pool, request).await?;
    Ok(pricing::sushi_quote(Some(&box_option), &creations)?)
}

/// Poke bowl behind a request; a base that is not included adds its price
/// to the bowl's base price
pub async fn resolve_poke(
    pool: &SqlitePool,
    request: &PokeQuoteRequest,
    base_price: f64,
) -> AppResult<PokeCreation> {
    let ids: Vec<i64> = request
        .base_id
        .into_iter()
        .chain(request.ingredients.iter().copied())
        .chain(request.proteins.iter().copied())
        .chain(request.sauces.iter().copied())
        .collect();
    let found: HashMap<i64, PokeIngredient> = configurator::find_poke_ingredients_by_ids(pool, &ids)
        .await?
        .into_iter()
        .map(|i| (i.id, i))
        .collect();

    let pick = |id: i64, kind: PokeIngredientType, step: &str| -> AppResult<PokeIngredient> {
        found
            .get(&id)
            .filter(|i| i.ingredient_type == kind)
            .cloned()
            .ok_or_else(|| option_not_found(id, step))
    };

    let mut base = pricing::to_decimal(base_price);
    if let Some(id) = request.base_id {
        let chosen = pick(id, PokeIngredientType::Base, "base")?;
        if !chosen.included {
            base += pricing::to_decimal(chosen.price);
        }
    }

    let pick_all = |ids: &[i64], kind: PokeIngredientType, step: &str| -> AppResult<Vec<PokeIngredient>> {
        ids.iter().map(|id| pick(*id, kind, step)).collect()
    };

    Ok(PokeCreation {
        base_price: pricing::to_f64(base),
        ingredients: pick_all(&request.ingredients, PokeIngredientType::Ingredient, "ingredient")?,
        proteins: pick_all(&request.proteins, PokeIngredientType::Protein, "protein")?,
        sauces: pick_all(&request.sauces, PokeIngredientType::Sauce, "sauce")?,
    })
}

pub async fn quote_poke(
    pool: &SqlitePool,
    request: &PokeQuoteRequest,
    base_price: f64,
) -> AppResult<ConfiguratorQuote> {
    let creation = resolve_poke(pool, request, base_price).await?;
    Ok(pricing::poke_quote(&creation))
}

/// Short description of a sushi box for the order line
pub fn describe_sushi(creations: &[SushiCreation]) -> String {
    creations
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let names: Vec<&str> = c
                .enrobage
                .iter()
                .chain(&c.bases)
                .chain(&c.garnitures)
                .chain(&c.toppings)
                .chain(c.sauce.iter())
                .map(|o| o.name.as_str())
                .collect();
            format!("Création {} : {}", i + 1, names.join(", "))
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Short description of a poke bowl for the order line
pub fn describe_poke(creation: &PokeCreation) -> String {
    creation
        .ingredients
        .iter()
        .chain(&creation.proteins)
        .chain(&creation.sauces)
        .map(|i| i.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
