//! API Response types
//!
//! Standardized API response structure for the whole system.

use serde::{Deserialize, Serialize};

/// Unified API response structure
///
/// All API responses follow this format:
/// ```json
/// {
///     "status": "success",
///     "message": "Bill settled successfully",
///     "data": { ... }
/// }
/// ```
///
/// Errors carry `status: "error"` and no `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// "success" or "error"
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Response data (absent on errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn ok(data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: "Success".to_string(),
            data: Some(data),
        }
    }

    /// Create a successful response with custom message
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }

    /// Create an error response
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }

    /// 是否成功响应
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}
