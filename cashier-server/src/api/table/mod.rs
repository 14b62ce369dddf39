//! Dining Table API 模块
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/table | GET | 桌台列表 (含派生状态) | 需要 |
//! | /api/table/order | GET | 桌台当前订单 | 需要 |
//! | /api/table/settle | PATCH | 结账并释放桌台 | 需要 |

pub mod handler;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/table", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/order", get(handler::order))
        .route("/settle", patch(handler::settle))
}
