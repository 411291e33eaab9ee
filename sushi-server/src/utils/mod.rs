//! 工具模块 - 通用工具函数和类型
//!
//! - [`AppError`] / [`ApiResponse`] (来自 shared::error)
//! - 日志、时间、输入校验

pub mod logger;
pub mod time;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// 将数据包装为成功响应
pub fn ok<T>(data: T) -> axum::Json<ApiResponse<T>> {
    axum::Json(ApiResponse::success(data))
}
