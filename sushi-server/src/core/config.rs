//! 服务器配置

use chrono::{FixedOffset, Offset, Utc};

use crate::pricing::TaxMode;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | DATABASE_PATH | data/sushi.db | SQLite 文件路径 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | JWT_SECRET | (dev default) | 后台 JWT 密钥, 生产环境必填 |
/// | JWT_EXPIRATION_MINUTES | 1440 | 令牌有效期 |
/// | RESTAURANT_UTC_OFFSET_MINUTES | 60 | 餐厅时区 (UTC 偏移) |
/// | TAX_RATE | 0.10 | TVA |
/// | TAX_MODE | inclusive | inclusive / exclusive |
/// | SLOT_HOLD_MINUTES | 10 | 时段预留有效期 |
/// | SLOT_LEAD_MINUTES | 30 | 当天最早可选时段的提前量 |
/// | POKE_BASE_PRICE | 15.90 | Poke 基础价格 |
/// | PAYMENT_WEBHOOK_SECRET | (dev default) | 支付回调签名密钥 |
/// | PAYMENT_RELAY_URL | - | 支付会话中转服务 |
/// | NOTIFY_RELAY_URL | - | 通知中转服务 |
/// | NOTIFY_INTERVAL_SECS | 15 | 通知发件箱轮询间隔 |
/// | BOOTSTRAP_ADMIN_EMAIL / BOOTSTRAP_ADMIN_PASSWORD | - | 首个管理员 |
/// | LOG_LEVEL / LOG_DIR / LOG_JSON | info / - / false | 日志 |
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub jwt_secret: String,
    pub jwt_expiration_minutes: i64,
    pub utc_offset_minutes: i32,
    pub tax_rate: f64,
    pub tax_mode: TaxMode,
    pub slot_hold_minutes: i64,
    pub slot_lead_minutes: i64,
    pub poke_base_price: f64,
    pub payment_webhook_secret: String,
    pub payment_relay_url: Option<String>,
    pub notify_relay_url: Option<String>,
    pub notify_interval_secs: u64,
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
}

impl Config {
    /// 必需的密钥环境变量: 非开发环境下必须设置且非空。
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn env_opt(name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|s| !s.trim().is_empty())
    }

    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let tax_mode = match std::env::var("TAX_MODE").as_deref() {
            Ok("exclusive") => TaxMode::Exclusive,
            Ok("inclusive") | Err(_) => TaxMode::Inclusive,
            Ok(other) => {
                return Err(format!("TAX_MODE must be inclusive or exclusive, got {other}").into());
            }
        };

        let jwt_secret = Self::require_secret("JWT_SECRET", &environment)?;
        if environment == "production" && jwt_secret.len() < 32 {
            return Err("JWT_SECRET must be at least 32 characters long".into());
        }

        Ok(Self {
            database_path: std::env::var("DATABASE_PATH").unwrap_or_else(|_| "data/sushi.db".into()),
            http_port: Self::env_or("HTTP_PORT", 3000),
            environment: environment.clone(),
            jwt_secret,
            jwt_expiration_minutes: Self::env_or("JWT_EXPIRATION_MINUTES", 1440),
            utc_offset_minutes: Self::env_or("RESTAURANT_UTC_OFFSET_MINUTES", 60),
            tax_rate: Self::env_or("TAX_RATE", 0.10),
            tax_mode,
            slot_hold_minutes: Self::env_or("SLOT_HOLD_MINUTES", 10),
            slot_lead_minutes: Self::env_or("SLOT_LEAD_MINUTES", 30),
            poke_base_price: Self::env_or("POKE_BASE_PRICE", 15.90),
            payment_webhook_secret: Self::require_secret("PAYMENT_WEBHOOK_SECRET", &environment)?,
            payment_relay_url: Self::env_opt("PAYMENT_RELAY_URL"),
            notify_relay_url: Self::env_opt("NOTIFY_RELAY_URL"),
            notify_interval_secs: Self::env_or("NOTIFY_INTERVAL_SECS", 15),
            bootstrap_admin_email: Self::env_opt("BOOTSTRAP_ADMIN_EMAIL"),
            bootstrap_admin_password: Self::env_opt("BOOTSTRAP_ADMIN_PASSWORD"),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: Self::env_opt("LOG_DIR"),
            log_json: Self::env_or("LOG_JSON", false),
        })
    }

    /// 开发配置, 使用给定的数据库路径。
    ///
    /// 常用于测试场景, 不读取环境变量.
    pub fn with_overrides(database_path: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            http_port: 0,
            environment: "development".into(),
            jwt_secret: "test-secret-key-with-at-least-32-chars!".into(),
            jwt_expiration_minutes: 60,
            utc_offset_minutes: 60,
            tax_rate: 0.10,
            tax_mode: TaxMode::Inclusive,
            slot_hold_minutes: 10,
            slot_lead_minutes: 30,
            poke_base_price: 15.90,
            payment_webhook_secret: "whsec_test".into(),
            payment_relay_url: None,
            notify_relay_url: None,
            notify_interval_secs: 15,
            bootstrap_admin_email: None,
            bootstrap_admin_password: None,
            log_level: "debug".into(),
            log_dir: None,
            log_json: false,
        }
    }

    /// 门店本地时钟偏移
    pub fn timezone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_use_development_defaults() {
        let config = Config::with_overrides("sqlite::memory:");
        assert!(!config.is_production());
        assert_eq!(config.tax_mode, TaxMode::Inclusive);
        assert_eq!(config.timezone().local_minus_utc(), 3600);
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        let mut config = Config::with_overrides("x");
        config.utc_offset_minutes = 100_000;
        assert_eq!(config.timezone().local_minus_utc(), 0);
    }
}
