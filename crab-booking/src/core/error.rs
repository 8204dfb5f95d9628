//! 服务器启动与运行错误
//!
//! 请求级错误走 [`shared::error::AppError`]，这里只覆盖进程生命周期。

use crate::auth::JwtError;
use crate::booking::{BookingError, StorageError};
use crate::notify::NotifyError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("JWT 配置错误: {0}")]
    Jwt(#[from] JwtError),

    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),

    #[error("初始化失败: {0}")]
    Booking(#[from] BookingError),

    #[error("通知服务初始化失败: {0}")]
    Notify(#[from] NotifyError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("内部服务器错误")]
    Internal(#[from] anyhow::Error),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
