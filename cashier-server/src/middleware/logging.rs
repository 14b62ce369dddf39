//! 请求日志中间件
//!
//! 每个请求完成后记录一条日志，4xx/5xx 用 WARN，其余用 INFO

use axum::{
    extract::{MatchedPath, Request},
    http::Method,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, warn};

/// 进入 handler 前采集的请求元信息
struct RequestMeta {
    request_id: String,
    method: Method,
    path: String,
    user: Option<String>,
}

impl RequestMeta {
    fn capture(req: &Request) -> Self {
        let request_id = req
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        // 优先用路由模板 (如 /api/table/order)，未匹配时退回原始路径
        let path = req
            .extensions()
            .get::<MatchedPath>()
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| req.uri().path().to_string());

        let user = req
            .extensions()
            .get::<crate::auth::CurrentUser>()
            .map(|u| format!("{}({})", u.name, u.id));

        Self {
            request_id,
            method: req.method().clone(),
            path,
            user,
        }
    }
}

/// 请求日志中间件
///
/// 记录请求 ID (x-request-id)、方法和路径、认证用户 (如果存在)、
/// 状态码和延迟 (毫秒)。
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let meta = RequestMeta::capture(&req);

    let response = next.run(req).await;

    let status = response.status();
    let latency_ms = started.elapsed().as_millis();

    if status.is_client_error() || status.is_server_error() {
        warn!(
            request_id = %meta.request_id,
            method = %meta.method,
            path = %meta.path,
            status = %status.as_u16(),
            latency_ms = %latency_ms,
            user = ?meta.user,
            "Request completed with error"
        );
    } else {
        info!(
            request_id = %meta.request_id,
            method = %meta.method,
            path = %meta.path,
            status = %status.as_u16(),
            latency_ms = %latency_ms,
            user = ?meta.user,
            "Request completed"
        );
    }

    response
}
