//! Admin User Model

use serde::{Deserialize, Serialize};

/// Back-office role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum AdminRole {
    Admin,
    Manager,
    Staff,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Staff => "staff",
        }
    }
}

/// Back-office user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AdminUser {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: AdminRole,
    /// Restricts a manager or staff member to one restaurant
    pub restaurant_id: Option<i64>,
    pub is_active: bool,
    pub created_at: i64,
}

/// Create admin user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserCreate {
    pub email: String,
    pub display_name: String,
    pub password: String,
    pub role: AdminRole,
    pub restaurant_id: Option<i64>,
}

/// Update admin user payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminUserUpdate {
    pub display_name: Option<String>,
    pub password: Option<String>,
    pub role: Option<AdminRole>,
    pub restaurant_id: Option<i64>,
    pub is_active: Option<bool>,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: i64,
    pub user: AdminUser,
}
