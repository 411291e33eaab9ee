//! API 路由模块
//!
//! # 结构
//!
//! 每个子模块提供 `router()`, 由 [`crate::routes::build_router`] 合并:
//!
//! - 门店前台接口 (`/api/...`) 无需认证
//! - 后台接口 (`/api/admin/...`) 由 `require_auth` 保护, 再按权限分组
//!
//! | 模块 | 前缀 |
//! |------|------|
//! | health | /api/health |
//! | restaurants | /api/restaurants, /api/admin/restaurants |
//! | menu | /api/restaurants/{id}/categories, /api/products, /api/admin/... |
//! | configurator | /api/configurator |
//! | cart | /api/cart |
//! | promotions | /api/promotions, /api/admin/promotions |
//! | promo_codes | /api/promo-codes, /api/admin/promo-codes |
//! | delivery | /api/delivery, /api/admin/delivery-zones |
//! | slots | /api/slots, /api/admin/special-events |
//! | orders | /api/orders, /api/admin/orders |
//! | payments | /api/payments |
//! | admin | /api/admin/auth, /api/admin/users, /api/admin/notifications |
//! | stats | /api/admin/stats |
//! | live | /api/admin/ws |

pub mod admin;
pub mod cart;
pub mod configurator;
pub mod delivery;
pub mod health;
pub mod live;
pub mod menu;
pub mod orders;
pub mod payments;
pub mod promo_codes;
pub mod promotions;
pub mod restaurants;
pub mod slots;
pub mod stats;

use crate::auth::CurrentUser;
use crate::utils::{AppError, AppResult};

/// 绑定门店的账号只能管理该门店
pub(crate) fn ensure_restaurant_access(user: &CurrentUser, restaurant_id: i64) -> AppResult<()> {
    if user.can_access_restaurant(restaurant_id) {
        return Ok(());
    }
    Err(AppError::forbidden(format!(
        "No access to restaurant {restaurant_id}"
    )))
}
