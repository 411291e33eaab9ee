//! Configurator Model (build-your-own sushi box and poke bowl)

use serde::{Deserialize, Serialize};

/// Step of the sushi builder an option belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum SushiOptionCategory {
    Enrobage,
    Base,
    Garniture,
    Topping,
    Sauce,
}

/// Selectable sushi ingredient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SushiOption {
    pub id: i64,
    pub name: String,
    pub price: f64,
    /// Included in the box price (no surcharge)
    pub included: bool,
    pub category: SushiOptionCategory,
}

/// Box format: number of pieces and how many creations it holds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BoxOption {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub pieces: i64,
    pub creations: i64,
    pub price: f64,
}

/// One resolved sushi creation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SushiCreation {
    pub enrobage: Option<SushiOption>,
    #[serde(default)]
    pub bases: Vec<SushiOption>,
    #[serde(default)]
    pub garnitures: Vec<SushiOption>,
    #[serde(default)]
    pub toppings: Vec<SushiOption>,
    pub sauce: Option<SushiOption>,
}

/// Creation as submitted by the client (option ids only)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SushiCreationInput {
    pub enrobage: Option<i64>,
    #[serde(default)]
    pub bases: Vec<i64>,
    #[serde(default)]
    pub garnitures: Vec<i64>,
    #[serde(default)]
    pub toppings: Vec<i64>,
    pub sauce: Option<i64>,
}

/// Sushi quote request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SushiQuoteRequest {
    pub box_id: i64,
    pub creations: Vec<SushiCreationInput>,
}

/// Step of the poke builder an ingredient belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum PokeIngredientType {
    Base,
    Ingredient,
    Protein,
    Sauce,
}

/// Selectable poke ingredient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PokeIngredient {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub included: bool,
    pub ingredient_type: PokeIngredientType,
}

/// One resolved poke bowl
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PokeCreation {
    pub base_price: f64,
    #[serde(default)]
    pub ingredients: Vec<PokeIngredient>,
    #[serde(default)]
    pub proteins: Vec<PokeIngredient>,
    #[serde(default)]
    pub sauces: Vec<PokeIngredient>,
}

/// Poke quote request (ingredient ids grouped by step)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PokeQuoteRequest {
    pub base_id: Option<i64>,
    #[serde(default)]
    pub ingredients: Vec<i64>,
    #[serde(default)]
    pub proteins: Vec<i64>,
    #[serde(default)]
    pub sauces: Vec<i64>,
}

/// One priced line of a configurator quote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteLine {
    pub label: String,
    pub amount: f64,
}

/// Configurator quote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfiguratorQuote {
    pub base_price: f64,
    pub extras: f64,
    pub total: f64,
    pub breakdown: Vec<QuoteLine>,
}
