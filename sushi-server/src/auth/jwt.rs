//! JWT 令牌服务
//!
//! 后台令牌的生成、验证和解析 (HS256)。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::Config;

/// JWT 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// JWT 密钥
    pub secret: String,
    /// 令牌过期时间 (分钟)
    pub expiration_minutes: i64,
    /// 令牌签发者
    pub issuer: String,
    /// 令牌受众
    pub audience: String,
}

impl JwtConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expiration_minutes: config.jwt_expiration_minutes,
            issuer: "sushi-server".to_string(),
            audience: "sushi-admin".to_string(),
        }
    }
}

/// 存储在令牌中的 JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID (Subject)
    pub sub: String,
    pub email: String,
    /// 角色名称
    pub role: String,
    /// 权限列表 (逗号分隔)
    pub permissions: String,
    /// 门店限定 (manager / staff)
    #[serde(default)]
    pub restaurant_id: Option<i64>,
    /// 令牌类型
    pub token_type: String,
    /// 过期时间戳 (秒)
    pub exp: i64,
    /// 签发时间戳 (秒)
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),
}

/// 签发新 token 时携带的身份信息
#[derive(Debug, Clone, Copy)]
pub struct TokenSubject<'a> {
    pub user_id: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub permissions: &'a [String],
    pub restaurant_id: Option<i64>,
}

/// JWT 令牌服务
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("expiration_minutes", &self.config.expiration_minutes)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 为用户生成新令牌, 返回令牌和过期时间 (Unix 毫秒)
    pub fn generate_token(&self, subject: TokenSubject<'_>) -> Result<(String, i64), JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: subject.user_id.to_string(),
            email: subject.email.to_string(),
            role: subject.role.to_string(),
            permissions: subject.permissions.join(","),
            restaurant_id: subject.restaurant_id,
            token_type: "access".to_string(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))?;
        Ok((token, expiration.timestamp_millis()))
    }

    /// 验证并解码令牌
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

/// 当前用户上下文 (从 JWT Claims 解析)
///
/// 由认证中间件注入请求扩展
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub restaurant_id: Option<i64>,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        let permissions = if claims.permissions.is_empty() {
            vec![]
        } else {
            claims
                .permissions
                .split(',')
                .map(|s| s.to_string())
                .collect()
        };

        Self {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
            permissions,
            restaurant_id: claims.restaurant_id,
        }
    }
}

impl CurrentUser {
    /// 管理员角色拥有所有权限
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    /// 检查是否拥有指定权限
    ///
    /// 支持通配符匹配：
    /// - `"orders:*"` 匹配 `"orders:read"`, `"orders:update"` 等
    /// - `"all"` 表示拥有所有权限
    pub fn has_permission(&self, permission: &str) -> bool {
        if self.is_admin() {
            return true;
        }

        if self.permissions.iter().any(|p| p == "all") {
            return true;
        }

        self.permissions.iter().any(|p| {
            if p == permission {
                return true;
            }
            match p.strip_suffix(":*") {
                Some(prefix) => permission
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with(':')),
                None => false,
            }
        })
    }

    /// 检查是否拥有任一指定权限
    pub fn has_any_permission(&self, permissions: &[&str]) -> bool {
        if self.is_admin() {
            return true;
        }
        permissions.iter().any(|p| self.has_permission(p))
    }

    /// 用户能否操作指定门店
    pub fn can_access_restaurant(&self, restaurant_id: i64) -> bool {
        self.is_admin() || self.restaurant_id.is_none_or(|id| id == restaurant_id)
    }
}
