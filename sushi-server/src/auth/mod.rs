//! 认证授权模块
//!
//! - [`JwtService`] - JWT 令牌服务
//! - [`CurrentUser`] - 当前用户上下文
//! - [`require_auth`] - 认证中间件
//! - [`require_permission`] - 权限检查中间件
//! - [`RateLimiter`] - 登录限流

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod permissions;
pub mod rate_limit;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService, TokenSubject};
pub use middleware::{require_auth, require_permission};
pub use rate_limit::RateLimiter;
