//! 认证中间件
//!
//! 为 JWT 认证提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::AppError;
use crate::auth::{BearerToken, CurrentUser, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// 认证中间件 - 要求员工登录
///
/// 从 `Authorization: Bearer <token>` 头提取 JWT，先查吊销表再验证签名。
/// 验证成功后将 [`CurrentUser`] 和原始令牌注入请求扩展。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径 (`/health` 等，让它们正常返回)
/// - `POST /api/staff/login` (登录接口)
/// - `POST /api/logs/frontend` (前端日志回传，登录前也要能写)
///
/// # 错误处理
///
/// | 情况 | 响应 |
/// |------|------|
/// | 无 Authorization 头 | 401 "Access token is required" |
/// | 令牌在吊销表中 | 401 "Token has been invalidated" |
/// | 令牌过期 | 401 "Token has expired" |
/// | 签名无效 / 格式错误 | 401 "Invalid token" |
/// | 吊销表查询等意外失败 | 500 "Authentication failed" |
///
/// 意外失败统一折叠成 500 是有意为之：认证路径上的未知错误不应
/// 被误判成凭证问题。
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    // 允许 CORS 预检的 OPTIONS 请求 (跳过认证)
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // 非 API 路由跳过认证
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    // 公共 API 路由跳过认证
    let is_public_api_route = path == "/api/staff/login" || path == "/api/logs/frontend";
    if is_public_api_route {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => match JwtService::extract_from_header(header) {
            Some(token) => token.to_string(),
            None => return Err(AppError::Unauthorized),
        },
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::Unauthorized);
        }
    };

    // 吊销检查在签名验证之前：已吊销的令牌即便签名合法也拒绝
    let revoked = state
        .revocation
        .is_revoked(&token)
        .await
        .map_err(|e| AppError::AuthenticationFailed(e.to_string()))?;
    if revoked {
        security_log!("WARN", "auth_revoked", uri = format!("{:?}", req.uri()));
        return Err(AppError::TokenRevoked);
    }

    // 验证令牌
    match state.jwt_service.validate_token(&token) {
        Ok(claims) => {
            let user = CurrentUser::from(claims);
            req.extensions_mut().insert(user);
            req.extensions_mut().insert(BearerToken(token));
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::TokenExpired),
                _ => Err(AppError::InvalidToken),
            }
        }
    }
}
