//! 前端日志上报
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/logs/frontend | POST | 客户端日志批量上报 | 无 |
//!
//! 上报永不失败：无法解析的条目直接跳过。

use axum::{Json, Router, routing::post};
use serde::Deserialize;

use crate::core::ServerState;
use crate::utils::ok_with_message;
use shared::ApiResponse;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/logs/frontend", post(ingest))
}

/// 单条客户端日志
#[derive(Debug, Deserialize)]
pub struct FrontendLogEntry {
    #[serde(default)]
    pub level: String,
    pub message: String,
    #[serde(default)]
    pub context: Option<serde_json::Value>,
}

/// 客户端日志批量上报
///
/// 接受裸数组或 `{"logs": [...]}` 包装，两种形式都在线上出现过。
pub async fn ingest(Json(body): Json<serde_json::Value>) -> Json<ApiResponse<()>> {
    let entries = match &body {
        serde_json::Value::Array(items) => items.as_slice(),
        serde_json::Value::Object(map) => map
            .get("logs")
            .and_then(|v| v.as_array())
            .map(|v| v.as_slice())
            .unwrap_or(&[]),
        _ => &[],
    };

    let mut accepted = 0usize;
    for item in entries {
        let Ok(entry) = serde_json::from_value::<FrontendLogEntry>(item.clone()) else {
            continue;
        };
        accepted += 1;

        let context = entry
            .context
            .map(|c| c.to_string())
            .unwrap_or_default();

        match entry.level.to_lowercase().as_str() {
            "error" => {
                tracing::error!(target: "frontend", context = %context, "{}", entry.message)
            }
            "warn" | "warning" => {
                tracing::warn!(target: "frontend", context = %context, "{}", entry.message)
            }
            "debug" => {
                tracing::debug!(target: "frontend", context = %context, "{}", entry.message)
            }
            _ => tracing::info!(target: "frontend", context = %context, "{}", entry.message),
        }
    }

    tracing::debug!(accepted, total = entries.len(), "Frontend log batch ingested");
    ok_with_message((), "Logs received")
}
