//! Data models
//!
//! Shared between the server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! Catalogue ids are snowflake `i64`; order ids are UUID strings.

pub mod admin;
pub mod cart;
pub mod configurator;
pub mod delivery;
pub mod menu;
pub mod notification;
pub mod order;
pub mod payment;
pub mod promotion;
pub mod restaurant;
pub mod slot;
pub mod stats;

// Re-exports
pub use admin::*;
pub use cart::*;
pub use configurator::*;
pub use delivery::*;
pub use menu::*;
pub use notification::*;
pub use order::*;
pub use payment::*;
pub use promotion::*;
pub use restaurant::*;
pub use slot::*;
pub use stats::*;
