//! 认证授权模块
//!
//! 提供 JWT 认证、令牌吊销和中间件：
//! - [`JwtService`] - JWT 令牌服务
//! - [`CurrentUser`] - 当前员工上下文
//! - [`RevocationService`] - 令牌吊销表 + 后台清扫
//! - [`require_auth`] - 认证中间件

pub mod jwt;
pub mod middleware;
pub mod revocation;

pub use jwt::{BearerToken, Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
pub use revocation::RevocationService;
