//! 统一错误处理
//!
//! 提供应用级错误类型和响应辅助：
//! - [`AppError`] - 应用错误枚举
//! - [`ok`] / [`ok_with_message`] - 成功响应辅助函数
//!
//! # 失败分类
//!
//! | 分类 | HTTP 状态码 |
//! |------|------------|
//! | 缺少参数 / 非法状态 (如重复结账) | 400 |
//! | 未登录 / 令牌过期 / 令牌已吊销 / 凭证错误 | 401 |
//! | 账号停用 | 403 |
//! | 桌台/订单不存在 | 404 |
//! | 存储或签名等意外失败 | 500 (不向调用方暴露内部细节) |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::ApiResponse;
use tracing::error;

/// 应用错误枚举
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 认证错误 (401) ==========
    #[error("Access token is required")]
    Unauthorized,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has been invalidated")]
    TokenRevoked,

    /// 凭证错误 (401)，登录专用，统一消息防止账号枚举
    #[error("{0}")]
    InvalidCredentials(String),

    // ========== 权限错误 (403) ==========
    #[error("{0}")]
    Forbidden(String),

    // ========== 业务逻辑错误 (4xx) ==========
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    // ========== 系统错误 (500) ==========
    /// 认证路径上的意外失败 (500)，对外只说 "Authentication failed"
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// 应用级 Result，HTTP 处理器和业务逻辑统一使用
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// 登录凭证错误，统一消息防止账号枚举
    pub fn invalid_credentials() -> Self {
        Self::InvalidCredentials("Invalid email or password".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // Authentication errors (401)
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::TokenExpired => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::TokenRevoked => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::InvalidCredentials(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),

            // Authorization errors (403)
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),

            // Not found (404)
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),

            // Validation (400)
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),

            // Authentication path failures (500)
            AppError::AuthenticationFailed(msg) => {
                error!(target: "auth", error = %msg, "Authentication path failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Authentication failed".to_string(),
                )
            }

            // Database errors (500)
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }

            // Internal errors (500)
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ApiResponse::<()>::error(message));
        (status, body).into_response()
    }
}

impl From<crate::db::repository::RepoError> for AppError {
    fn from(e: crate::db::repository::RepoError) -> Self {
        use crate::db::repository::RepoError;
        match e {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Validation(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok(data))
}

/// Create a successful response with custom message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok_with_message(data, message))
}
