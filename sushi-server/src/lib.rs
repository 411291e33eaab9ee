//! SushiEats Server - 寿司外卖点餐后端
//!
//! # 架构概述
//!
//! - **门店** (`slots`, `api/restaurants`): 营业时间、闭店日、下单开关
//! - **菜单与配置器** (`pricing`, `api/menu`, `api/configurator`)
//! - **购物车** (`cart`): 服务端重新定价的购物车状态机
//! - **促销** (`pricing/promotion`): 自动促销 + 优惠码
//! - **时段** (`slots`): 容量计算与预留
//! - **订单** (`services/orders`): 下单、状态流转、支付
//! - **通知** (`notify`): 事务性 outbox + 后台投递
//! - **后台** (`auth`, `live`, `api/admin`): JWT 认证、实时推送、统计
//!
//! # 模块结构
//!
//! ```text
//! sushi-server/src/
//! ├── core/          # 配置、状态、启动
//! ├── auth/          # JWT、Argon2、权限、登录限流
//! ├── db/            # SQLite 连接池与 repository
//! ├── services/      # 业务流程
//! ├── api/           # HTTP 路由和处理器
//! ├── routes/        # 路由组装与中间件
//! ├── notify/        # 通知 outbox
//! └── utils/         # 日志、时间、校验
//! ```

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub mod api;
pub mod auth;
pub mod cart;
pub mod core;
pub mod db;
pub mod live;
pub mod notify;
pub mod payment;
pub mod pricing;
pub mod routes;
pub mod services;
pub mod slots;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use db::DbService;
pub use live::LiveHub;
pub use routes::build_app;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// 重新导出日志函数
pub use utils::logger::init_logger;
