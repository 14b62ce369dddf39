//! Staff API 模块
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/staff/login | POST | 员工登录 | 无 |
//! | /api/staff/logout | GET | 员工登出 (吊销令牌) | 需要 |

pub mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/staff", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/login", post(handler::login))
        .route("/logout", get(handler::logout))
}
