//! Repository Module
//!
//! CRUD operations over the SQLite tables. Every repository is a set of free
//! async functions taking a `&SqlitePool` (or any executor when the call has
//! to join a caller's transaction).

// Restaurants
pub mod closure;
pub mod opening_hours;
pub mod restaurant;

// Menu
pub mod category;
pub mod configurator;
pub mod product;

// Promotions
pub mod promo_code;
pub mod promotion;

// Delivery and slots
pub mod delivery;
pub mod time_slot;

// Orders
pub mod notification;
pub mod order;
pub mod payment;
pub mod stats;

// Back-office
pub mod admin_user;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.message().to_string())
            }
            sqlx::Error::RowNotFound => RepoError::NotFound("Row not found".into()),
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Repository database error");
                AppError::database("Database error")
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// `?, ?, ?` for an `IN (...)` clause of `n` values
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
