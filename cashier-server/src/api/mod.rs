//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`staff`] - 员工登录/登出
//! - [`table`] - 桌台列表、订单查询、结账
//! - [`logs`] - 前端日志上报

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::require_auth;
use crate::core::ServerState;
use crate::middleware;

pub mod health;
pub mod logs;
pub mod staff;
pub mod table;

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Auth API - login public, logout authenticated
        .merge(staff::router())
        // Table API - authentication required
        .merge(table::router())
        // Health API - public route
        .merge(health::router())
        // Frontend log ingestion - public route
        .merge(logs::router())
}

/// Build a fully configured application with all middleware and state
///
/// This is used by both the HTTP server and the integration tests
pub fn build_app(state: ServerState) -> Router {
    build_router()
        // ========== Tower HTTP Middleware ==========
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Compression - Gzip compress responses
        .layer(CompressionLayer::new())
        // Request logging - runs after auth, sees CurrentUser when present
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        // ========== Application Middleware ==========
        // Request ID - Generate unique ID for each request
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        // JWT 认证中间件 - 最外层，require_auth 内部会跳过公共路由
        // 使用 from_fn_with_state 以便中间件可以访问 ServerState
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
        .with_state(state)
}
