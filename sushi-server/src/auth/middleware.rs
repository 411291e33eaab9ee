//! 认证中间件
//!
//! 为后台 JWT 认证和授权提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::utils::AppError;

/// `/api/admin` 下无需 bearer token 的路由。实时推送通过 `token` 查询参数认证。
const PUBLIC_ADMIN_ROUTES: &[&str] = &["/api/admin/auth/login", "/api/admin/ws"];

/// 认证中间件 - 后台接口要求登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT, 成功后将
/// [`CurrentUser`] 注入请求扩展。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - `/api/admin/` 以外的路径 (门店前台接口)
/// - 登录接口和实时推送 WebSocket
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let path = req.uri().path();
    if !path.starts_with("/api/admin/") || PUBLIC_ADMIN_ROUTES.contains(&path) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::not_authenticated());
        }
    };

    match state.jwt.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::from(claims);
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// 权限检查中间件 - 要求特定权限
///
/// 支持通配符 `"orders:*"` 和超级权限 `"all"`。
///
/// ```ignore
/// Router::new()
///     .route("/{id}/status", put(handler::update_status))
///     .layer(middleware::from_fn(require_permission("orders:update")));
/// ```
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or_else(AppError::not_authenticated)?;

            if !user.has_permission(permission) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = user.id.clone(),
                    email = user.email.clone(),
                    required_permission = permission
                );
                return Err(AppError::forbidden(format!(
                    "Permission denied: {}",
                    permission
                )));
            }

            Ok(next.run(req).await)
        })
    }
}
