//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型
//! - [`ok`] / [`ok_with_message`] - 响应辅助函数
//! - 日志初始化

pub mod error;
pub mod logger;

pub use error::{AppError, AppResult, ok, ok_with_message};
