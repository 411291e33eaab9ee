//! Back-office accounts: login, bootstrap and user management

use std::time::Duration;

use shared::models::{AdminRole, AdminUser, AdminUserCreate, AdminUserUpdate, LoginRequest, LoginResponse};

use crate::auth::permissions::get_default_permissions;
use crate::auth::rate_limit::{LOGIN_PER_EMAIL_PER_HOUR, too_many_attempts};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::{CurrentUser, TokenSubject};
use crate::core::ServerState;
use crate::db::repository::RepoError;
use crate::db::repository::admin_user::{self, NewAdminUser};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_PASSWORD_LEN, MIN_PASSWORD_LEN, validate_email, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Fixed delay before answering a login, found or not
const AUTH_FIXED_DELAY_MS: u64 = 200;

fn check_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::with_message(
            ErrorCode::PasswordTooShort,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password is too long (max {MAX_PASSWORD_LEN})"
        )));
    }
    Ok(())
}

/// Authenticate a back-office user and issue a token
pub async fn login(state: &ServerState, req: LoginRequest) -> AppResult<LoginResponse> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::with_message(ErrorCode::RequiredField, "email and password are required"));
    }

    if !state
        .rate_limiter
        .check("login_email", &email, LOGIN_PER_EMAIL_PER_HOUR, 3600)
        .await
    {
        security_log!("WARN", "login_email_rate_limited", email = email.as_str());
        return Err(too_many_attempts());
    }

    let user = admin_user::find_by_email(&state.pool, &email).await?;

    // Same delay whether the account exists or not
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let user = match user {
        Some(u) if verify_password(&req.password, &u.password_hash) => u,
        Some(_) => {
            security_log!("WARN", "login_failed", email = email.as_str(), reason = "invalid_credentials");
            return Err(AppError::invalid_credentials());
        }
        None => {
            security_log!("WARN", "login_failed", email = email.as_str(), reason = "user_not_found");
            return Err(AppError::invalid_credentials());
        }
    };
    if !user.is_active {
        security_log!("WARN", "login_disabled_account", email = email.as_str());
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    let permissions = get_default_permissions(user.role.as_str());
    let user_id = user.id.to_string();
    let (token, expires_at) = state
        .jwt
        .generate_token(TokenSubject {
            user_id: &user_id,
            email: &user.email,
            role: user.role.as_str(),
            permissions: &permissions,
            restaurant_id: user.restaurant_id,
        })
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(user_id = %user_id, email = %user.email, role = user.role.as_str(), "Admin logged in");
    Ok(LoginResponse {
        token,
        expires_at,
        user,
    })
}

pub async fn current_user(state: &ServerState, user: &CurrentUser) -> AppResult<AdminUser> {
    let id: i64 = user.id.parse().map_err(|_| AppError::invalid_token("Invalid subject"))?;
    admin_user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::invalid_token("Unknown user"))
}

/// Create the first admin from the environment when none exists yet
pub async fn bootstrap_admin(state: &ServerState) -> AppResult<()> {
    let (Some(email), Some(password)) = (
        state.config.bootstrap_admin_email.as_deref(),
        state.config.bootstrap_admin_password.as_deref(),
    ) else {
        return Ok(());
    };
    if admin_user::count_admins(&state.pool).await? > 0 {
        return Ok(());
    }

    let user = create_user(
        state,
        AdminUserCreate {
            email: email.to_string(),
            display_name: "Administrateur".to_string(),
            password: password.to_string(),
            role: AdminRole::Admin,
            restaurant_id: None,
        },
    )
    .await?;
    tracing::info!(email = %user.email, "Bootstrap admin created");
    Ok(())
}

pub async fn create_user(state: &ServerState, data: AdminUserCreate) -> AppResult<AdminUser> {
    validate_email(&data.email)?;
    validate_required_text(&data.display_name, "display_name", MAX_NAME_LEN)?;
    check_password(&data.password)?;

    let new_user = NewAdminUser {
        email: data.email.trim().to_lowercase(),
        display_name: data.display_name.trim().to_string(),
        password_hash: hash_password(&data.password)?,
        role: data.role,
        restaurant_id: data.restaurant_id,
    };
    let user = admin_user::create(&state.pool, new_user).await.map_err(|e| match e {
        RepoError::Duplicate(_) => AppError::with_message(ErrorCode::AlreadyExists, "Email already in use"),
        other => other.into(),
    })?;

    state.broadcast_sync("admin_user", "created", &user.id.to_string(), Some(&user));
    Ok(user)
}

pub async fn update_user(state: &ServerState, id: i64, data: AdminUserUpdate) -> AppResult<AdminUser> {
    if let Some(name) = &data.display_name {
        validate_required_text(name, "display_name", MAX_NAME_LEN)?;
    }
    let password_hash = match data.password.as_deref() {
        Some(password) => {
            check_password(password)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    let user = admin_user::update(&state.pool, id, data, password_hash).await?;
    state.broadcast_sync("admin_user", "updated", &id.to_string(), Some(&user));
    Ok(user)
}

pub async fn delete_user(state: &ServerState, id: i64, current: &CurrentUser) -> AppResult<bool> {
    if current.id == id.to_string() {
        return Err(AppError::new(ErrorCode::CannotDeleteSelf));
    }
    let deleted = admin_user::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::not_found(format!("Admin user {id}")));
    }
    security_log!("INFO", "admin_user_deleted", user_id = id, by = current.id.as_str());
    state.broadcast_sync::<()>("admin_user", "deleted", &id.to_string(), None);
    Ok(true)
}
