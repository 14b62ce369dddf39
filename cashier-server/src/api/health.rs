//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /health | GET | 存活检查 | 无 |

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

/// 健康检查响应
#[derive(Serialize)]
pub struct HealthResponse {
    /// 状态 (OK)
    status: &'static str,
    /// 版本号
    version: &'static str,
}

/// 存活检查，不触达数据库
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        version: env!("CARGO_PKG_VERSION"),
    })
}
