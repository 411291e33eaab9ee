//! Admin User Repository

use super::{RepoError, RepoResult};
use shared::models::{AdminRole, AdminUser, AdminUserUpdate};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, email, display_name, password_hash, role, restaurant_id, is_active, created_at";

/// Validated fields of a new back-office user
#[derive(Debug, Clone)]
pub struct NewAdminUser {
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: AdminRole,
    pub restaurant_id: Option<i64>,
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<AdminUser>> {
    let sql = format!("SELECT {COLUMNS} FROM admin_users ORDER BY email");
    let users = sqlx::query_as::<_, AdminUser>(&sql).fetch_all(pool).await?;
    Ok(users)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<AdminUser>> {
    let sql = format!("SELECT {COLUMNS} FROM admin_users WHERE id = ?");
    let user = sqlx::query_as::<_, AdminUser>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<AdminUser>> {
    let sql = format!("SELECT {COLUMNS} FROM admin_users WHERE email = ?");
    let user = sqlx::query_as::<_, AdminUser>(&sql)
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn count_admins(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_users WHERE role = 'admin'")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// An existing email is a `Duplicate`
pub async fn create(pool: &SqlitePool, data: NewAdminUser) -> RepoResult<AdminUser> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO admin_users (id, email, display_name, password_hash, role, restaurant_id, is_active, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, 1, ?)",
    )
    .bind(id)
    .bind(data.email.trim().to_lowercase())
    .bind(&data.display_name)
    .bind(&data.password_hash)
    .bind(data.role)
    .bind(data.restaurant_id)
    .bind(shared::util::now_millis())
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create admin user".into()))
}

/// Partial update; the password arrives already hashed
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: AdminUserUpdate,
    password_hash: Option<String>,
) -> RepoResult<AdminUser> {
    let rows = sqlx::query(
        "UPDATE admin_users SET display_name = COALESCE(?1, display_name), password_hash = COALESCE(?2, password_hash), \
         role = COALESCE(?3, role), restaurant_id = COALESCE(?4, restaurant_id), is_active = COALESCE(?5, is_active) \
         WHERE id = ?6",
    )
    .bind(data.display_name)
    .bind(password_hash)
    .bind(data.role)
    .bind(data.restaurant_id)
    .bind(data.is_active)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Admin user {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Admin user {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM admin_users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
