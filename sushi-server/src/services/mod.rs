//! Business services
//!
//! Handlers stay thin: they extract, check permissions and call into these
//! functions, which own validation, pricing and persistence.

pub mod admin;
pub mod configurator;
pub mod delivery;
pub mod orders;
pub mod payments;
pub mod promo;
pub mod restaurant;
pub mod slots;
pub mod stats;
